// SPDX-License-Identifier: Apache-2.0

//! Sixteen-bin counter store with a synchronous read port.
//!
//! Port operations are staged during a step and applied by [`commit`] at the
//! step boundary, in the order clear, write, read. A read presented in step
//! `t` is therefore observable through [`read_data`] in step `t + 1`, and it
//! observes any write committed in step `t`.
//!
//! [`commit`]: HistogramStore::commit
//! [`read_data`]: HistogramStore::read_data

use serde::Serialize;

use crate::config::{OverflowPolicy, Trace};

pub const BIN_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Histogram(pub [u64; BIN_COUNT]);

impl Histogram {
    pub fn bins(&self) -> &[u64; BIN_COUNT] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn bump(&mut self, bin: u8) {
        self.0[bin as usize] += 1;
    }
}

impl std::ops::Index<usize> for Histogram {
    type Output = u64;
    fn index(&self, index: usize) -> &u64 {
        &self.0[index]
    }
}

impl std::fmt::Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, count) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", count)?;
        }
        write!(f, "]")
    }
}

/// Value presented by the read port, tagged with the address it was read
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatchedRead {
    pub addr: u8,
    pub value: u64,
}

/// One committed port access, as recorded under [`Trace::Accesses`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Clear,
    Read { addr: u8, value: u64 },
    Write { addr: u8, value: u64 },
}

pub struct HistogramStore {
    counters: [u64; BIN_COUNT],
    count_width: u32,
    overflow: OverflowPolicy,
    pending_clear: bool,
    pending_write: Option<(u8, u64)>,
    pending_read: Option<u8>,
    read_latch: LatchedRead,
    trace: Option<Vec<Access>>,
}

impl HistogramStore {
    pub fn new(count_width: u32, overflow: OverflowPolicy, trace: Trace) -> Self {
        HistogramStore {
            counters: [0; BIN_COUNT],
            count_width,
            overflow,
            pending_clear: false,
            pending_write: None,
            pending_read: None,
            read_latch: LatchedRead::default(),
            trace: match trace {
                Trace::None => None,
                Trace::Accesses => Some(Vec::new()),
            },
        }
    }

    /// Largest value a counter can hold.
    pub fn max_count(&self) -> u64 {
        if self.count_width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.count_width) - 1
        }
    }

    /// Stages zeroing of all sixteen counters.
    pub fn clear(&mut self) {
        self.pending_clear = true;
    }

    /// Presents `addr` on the read port; the value is latched at commit.
    pub fn read(&mut self, addr: u8) {
        debug_assert!(self.pending_read.is_none(), "two reads in one step");
        self.pending_read = Some(addr & 0xF);
    }

    /// Stages a write of `base.value + 1` to `base.addr`.
    ///
    /// Taking the latched read as the base is what keeps the update a
    /// read-then-write pair rather than a blind read-modify-write.
    pub fn increment(&mut self, base: LatchedRead) {
        debug_assert!(self.pending_write.is_none(), "two writes in one step");
        let value = match self.overflow {
            OverflowPolicy::Wrap => base.value.wrapping_add(1) & self.max_count(),
            OverflowPolicy::Saturate => base.value.saturating_add(1).min(self.max_count()),
        };
        self.pending_write = Some((base.addr, value));
    }

    /// Output of the read port as of the last commit.
    pub fn read_data(&self) -> LatchedRead {
        self.read_latch
    }

    /// Applies staged operations at the step boundary.
    pub fn commit(&mut self) {
        if std::mem::take(&mut self.pending_clear) {
            self.counters = [0; BIN_COUNT];
            self.record(Access::Clear);
        }
        if let Some((addr, value)) = self.pending_write.take() {
            self.counters[addr as usize] = value;
            self.record(Access::Write { addr, value });
        }
        if let Some(addr) = self.pending_read.take() {
            let value = self.counters[addr as usize];
            self.read_latch = LatchedRead { addr, value };
            self.record(Access::Read { addr, value });
        }
    }

    /// Drops staged operations and zeroes the read latch; counters keep their
    /// contents, as a memory does across a controller reset.
    pub fn reset_ports(&mut self) {
        self.pending_clear = false;
        self.pending_write = None;
        self.pending_read = None;
        self.read_latch = LatchedRead::default();
    }

    /// Zero-latency view of all counters.
    pub fn snapshot(&self) -> Histogram {
        Histogram(self.counters)
    }

    /// Accesses recorded so far; empty unless tracing was requested.
    pub fn accesses(&self) -> &[Access] {
        self.trace.as_deref().unwrap_or(&[])
    }

    fn record(&mut self, access: Access) {
        if let Some(trace) = self.trace.as_mut() {
            trace.push(access);
        }
    }
}
