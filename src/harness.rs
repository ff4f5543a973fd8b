// SPDX-License-Identifier: Apache-2.0

//! Drives a core through the start/done handshake and reads the histogram
//! back through the external read port.

use serde::Serialize;

use crate::atlas_error::AtlasError;
use crate::config::{AtlasConfig, SubsetSize};
use crate::controller::{steps_per_run, AtlasCore, CoreInputs, CoreState};
use crate::histogram::{Histogram, BIN_COUNT};
use crate::nibble_utils::{hex_to_nibbles_le, pack_nibbles_le, NibbleArray};
use crate::reference::reference_histogram;

/// Extra steps allowed beyond the exact run length before giving up.
const STEP_SLACK: u64 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub histogram: Histogram,
    /// Steps from the start pulse until `done` was observed.
    pub steps: u64,
    pub subsets: u64,
    pub events: u64,
}

pub struct Harness {
    core: AtlasCore,
    max_steps: u64,
}

impl Harness {
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        let max_steps = default_step_budget(config.n_nibbles, config.k);
        let core = AtlasCore::new(config)?;
        Ok(Harness { core, max_steps })
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn core(&self) -> &AtlasCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut AtlasCore {
        &mut self.core
    }

    /// Runs one full handshake on `nibbles` and returns the histogram as
    /// read through the external port.
    ///
    /// A core left mid-run by an earlier timeout is reset first, since a
    /// busy core ignores `start`.
    pub fn run(&mut self, nibbles: &NibbleArray) -> Result<RunReport, AtlasError> {
        if self.core.state() != CoreState::Idle {
            log::debug!("resetting core left in {:?}", self.core.state());
            self.core.reset();
        }
        self.core.set_data_in(&pack_nibbles_le(nibbles))?;

        // One-step start pulse.
        self.core.step(CoreInputs {
            start: true,
            rd_addr: 0,
        });
        let mut steps = 1;
        while !self.core.outputs().done {
            if steps >= self.max_steps {
                return Err(AtlasError::Timeout { steps });
            }
            self.core.step(CoreInputs::default());
            steps += 1;
        }

        let mut histogram = Histogram::default();
        for addr in 0..BIN_COUNT {
            let out = self.core.step(CoreInputs {
                start: false,
                rd_addr: addr as u8,
            });
            histogram.0[addr] = out.rd_data;
        }
        debug_assert_eq!(histogram, self.core.histogram());

        let config = self.core.config();
        Ok(RunReport {
            histogram,
            steps,
            subsets: config.subset_count(),
            events: config.total_events(),
        })
    }

    /// Like [`Harness::run`], but also checks the result against the
    /// brute-force reference.
    pub fn run_checked(&mut self, nibbles: &NibbleArray) -> Result<RunReport, AtlasError> {
        let report = self.run(nibbles)?;
        let expected = reference_histogram(nibbles, self.core.config().k);
        if report.histogram != expected {
            log::error!(
                "mismatch for {}: expected {} got {}",
                nibbles,
                expected,
                report.histogram
            );
            return Err(AtlasError::ReferenceMismatch {
                expected,
                actual: report.histogram,
            });
        }
        Ok(report)
    }
}

pub fn default_step_budget(n: usize, k: SubsetSize) -> u64 {
    steps_per_run(n, k) + STEP_SLACK
}

/// Decodes `hex`, sizes a core to it, and runs it with reference checking.
pub fn run_hex(hex: &str, k: SubsetSize) -> Result<RunReport, AtlasError> {
    let nibbles = hex_to_nibbles_le(hex)?;
    let mut harness = Harness::new(AtlasConfig::new(nibbles.len(), k))?;
    harness.run_checked(&nibbles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_run_hex_a1f3() {
        let _ = env_logger::builder().is_test(true).try_init();
        let report = run_hex("A1F3", SubsetSize::Two).unwrap();
        assert_eq!(report.histogram.total(), 60);
        assert_eq!(report.subsets, 6);
        assert_eq!(report.events, 60);
        assert_eq!(report.steps, steps_per_run(4, SubsetSize::Two));
    }

    #[test]
    fn test_timeout_when_budget_too_small() {
        let nibbles = hex_to_nibbles_le("A1F3").unwrap();
        let mut harness = Harness::new(AtlasConfig::new(4, SubsetSize::Two))
            .unwrap()
            .with_max_steps(10);
        assert_eq!(
            harness.run(&nibbles),
            Err(AtlasError::Timeout { steps: 10 })
        );
    }

    #[test]
    fn test_run_after_timeout_uses_new_data() {
        let _ = env_logger::builder().is_test(true).try_init();
        let stale = hex_to_nibbles_le("FFFF").unwrap();
        let fresh = hex_to_nibbles_le("0123").unwrap();
        let mut harness = Harness::new(AtlasConfig::new(4, SubsetSize::Two))
            .unwrap()
            .with_max_steps(200);
        assert_eq!(
            harness.run(&stale),
            Err(AtlasError::Timeout { steps: 200 })
        );
        assert_ne!(harness.core().state(), CoreState::Idle);

        let mut harness = harness.with_max_steps(1000);
        let report = harness.run(&fresh).unwrap();
        assert_eq!(
            report.histogram,
            reference_histogram(&fresh, SubsetSize::Two)
        );
        assert_eq!(report.steps, steps_per_run(4, SubsetSize::Two));
    }

    #[test]
    fn test_reused_harness_restarts_cleanly() {
        let nibbles = hex_to_nibbles_le("9C07E").unwrap();
        let mut harness = Harness::new(AtlasConfig::new(5, SubsetSize::Three)).unwrap();
        let first = harness.run_checked(&nibbles).unwrap();
        let second = harness.run_checked(&nibbles).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mismatch_is_reported_with_undersized_counters() {
        // 32 choose 2 pairs of zeros put 496 * 5 events in bin 0, which a
        // 4-bit counter cannot hold.
        let nibbles = NibbleArray::new(vec![0; 32]).unwrap();
        let mut config = AtlasConfig::new(32, SubsetSize::Two);
        config.count_width = 4;
        let mut harness = Harness::new(config).unwrap();
        match harness.run_checked(&nibbles) {
            Err(AtlasError::ReferenceMismatch { expected, actual }) => {
                assert_eq!(expected[0], 2480);
                assert_eq!(actual[0], 2480 % 16);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
