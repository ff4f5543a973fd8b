// SPDX-License-Identifier: Apache-2.0

//! Cycle-stepped controller that sweeps every K-subset of the input nibbles
//! through every operator combination and accumulates result bins.
//!
//! Each call to [`AtlasCore::step`] performs exactly one state transition.
//! The transition itself is the pure function [`transition`]; the core then
//! commits the new registers and the requested histogram port operation
//! together, so nothing is observable mid-step.

use bitvec::vec::BitVec;

use crate::atlas_error::AtlasError;
use crate::config::{AtlasConfig, SubsetSize};
use crate::histogram::{Access, Histogram, HistogramStore, LatchedRead};
use crate::nibble_utils::{unpack_nibbles_le, NibbleArray, BITS_PER_NIBBLE};
use crate::operators::{self, BoolOp, OP_COUNT};
use crate::selector::{self, Selection};
use crate::subset_enum::{binomial, gosper_successor, initial_mask, terminal_mask};

const LAST_OP: u8 = (OP_COUNT - 1) as u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreState {
    Idle,
    Clear,
    InitEnum,
    Select,
    Compute,
    HistRead,
    HistWrite,
    Advance,
    NextSubset,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreInputs {
    pub start: bool,
    /// External histogram read address; only drives the port in IDLE/DONE.
    pub rd_addr: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoreOutputs {
    pub busy: bool,
    pub done: bool,
    pub rd_data: u64,
}

/// Everything the controller carries from one step to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub state: CoreState,
    pub mask: u32,
    pub op1: u8,
    pub op2: u8,
    pub selection: Selection,
    /// Result bin of the current operator combination.
    pub bin: u8,
    pub busy: bool,
    pub done: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            state: CoreState::Idle,
            mask: 0,
            op1: 0,
            op2: 0,
            selection: Selection::default(),
            bin: 0,
            busy: false,
            done: false,
        }
    }
}

/// Histogram port operation requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Idle,
    Clear,
    Read(u8),
    Increment(LatchedRead),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: Registers,
    pub port: PortOp,
    /// Capture the pending input nibbles as this run's data.
    pub latch_data: bool,
}

/// Fixed per-core parameters the transition function needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub n: usize,
    pub k: SubsetSize,
}

impl Geometry {
    pub fn has_subsets(&self) -> bool {
        self.n >= self.k.get()
    }

    pub fn terminal_mask(&self) -> u32 {
        terminal_mask(self.n, self.k)
    }
}

/// Computes the next registers and port operation from the current
/// registers, inputs, run data, and read-port output.
pub fn transition(
    geometry: &Geometry,
    regs: &Registers,
    inputs: &CoreInputs,
    data: &NibbleArray,
    rd: LatchedRead,
) -> Transition {
    let mut next = *regs;
    let mut port = PortOp::Idle;
    let mut latch_data = false;

    match regs.state {
        CoreState::Idle => {
            next.busy = false;
            next.done = false;
            port = PortOp::Read(inputs.rd_addr);
            if inputs.start {
                next.busy = true;
                latch_data = true;
                next.state = CoreState::Clear;
            }
        }
        CoreState::Clear => {
            port = PortOp::Clear;
            next.state = CoreState::InitEnum;
        }
        CoreState::InitEnum => {
            next.mask = initial_mask(geometry.k);
            next.op1 = 0;
            next.op2 = 0;
            if geometry.has_subsets() {
                next.state = CoreState::Select;
            } else {
                next.busy = false;
                next.done = true;
                next.state = CoreState::Done;
            }
        }
        CoreState::Select => {
            next.selection = selector::select(regs.mask, data);
            next.state = CoreState::Compute;
        }
        CoreState::Compute => {
            next.bin = operators::evaluate(
                &regs.selection,
                BoolOp::decode(regs.op1),
                BoolOp::decode(regs.op2),
            );
            next.state = CoreState::HistRead;
        }
        CoreState::HistRead => {
            port = PortOp::Read(regs.bin);
            next.state = CoreState::HistWrite;
        }
        CoreState::HistWrite => {
            debug_assert_eq!(rd.addr, regs.bin, "read port not holding the pending bin");
            port = PortOp::Increment(rd);
            next.state = CoreState::Advance;
        }
        CoreState::Advance => match geometry.k {
            SubsetSize::Two => {
                if regs.op1 == LAST_OP {
                    next.state = CoreState::NextSubset;
                } else {
                    next.op1 = regs.op1 + 1;
                    next.state = CoreState::Compute;
                }
            }
            SubsetSize::Three => {
                if regs.op2 == LAST_OP {
                    if regs.op1 == LAST_OP {
                        next.state = CoreState::NextSubset;
                    } else {
                        next.op1 = regs.op1 + 1;
                        next.op2 = 0;
                        next.state = CoreState::Compute;
                    }
                } else {
                    next.op2 = regs.op2 + 1;
                    next.state = CoreState::Compute;
                }
            }
        },
        CoreState::NextSubset => {
            if regs.mask == geometry.terminal_mask() {
                next.busy = false;
                next.done = true;
                next.state = CoreState::Done;
            } else {
                next.mask = gosper_successor(regs.mask, geometry.n);
                next.op1 = 0;
                next.op2 = 0;
                next.state = CoreState::Select;
            }
        }
        CoreState::Done => {
            port = PortOp::Read(inputs.rd_addr);
            if !inputs.start {
                next.done = false;
                next.state = CoreState::Idle;
            }
        }
    }

    Transition {
        next,
        port,
        latch_data,
    }
}

/// Number of steps from the IDLE step that samples `start` until the core
/// is in DONE.
pub fn steps_per_run(n: usize, k: SubsetSize) -> u64 {
    // IDLE, CLEAR, INIT_ENUM; then per subset SELECT and NEXT_SUBSET around
    // four steps per operator combination.
    3 + binomial(n, k.get()) * (2 + 4 * k.ops_per_subset())
}

pub struct AtlasCore {
    config: AtlasConfig,
    geometry: Geometry,
    regs: Registers,
    store: HistogramStore,
    data_in: NibbleArray,
    run_data: NibbleArray,
    cycle: u64,
}

impl AtlasCore {
    pub fn new(config: AtlasConfig) -> Result<Self, AtlasError> {
        config.validate()?;
        if !config.count_width_is_sufficient() {
            log::warn!(
                "count width {} cannot hold {} events for n={} k={}; overflow policy is {}",
                config.count_width,
                config.total_events(),
                config.n_nibbles,
                config.k,
                config.overflow
            );
        }
        let zeros = NibbleArray::new(vec![0; config.n_nibbles])?;
        Ok(AtlasCore {
            geometry: Geometry {
                n: config.n_nibbles,
                k: config.k,
            },
            regs: Registers::default(),
            store: HistogramStore::new(config.count_width, config.overflow, config.trace),
            data_in: zeros.clone(),
            run_data: zeros,
            cycle: 0,
            config,
        })
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    /// Drives the packed `data_in` port; must be exactly `4 * N` bits.
    pub fn set_data_in(&mut self, bits: &BitVec) -> Result<(), AtlasError> {
        let expected = self.config.n_nibbles * BITS_PER_NIBBLE;
        if bits.len() != expected {
            return Err(AtlasError::DataWidthMismatch {
                expected,
                actual: bits.len(),
            });
        }
        self.data_in = unpack_nibbles_le(bits, self.config.n_nibbles)?;
        Ok(())
    }

    /// Drives `data_in` from an already-decoded array of exactly N nibbles.
    pub fn set_nibbles(&mut self, nibbles: NibbleArray) -> Result<(), AtlasError> {
        if nibbles.len() != self.config.n_nibbles {
            return Err(AtlasError::DataWidthMismatch {
                expected: self.config.n_nibbles * BITS_PER_NIBBLE,
                actual: nibbles.len() * BITS_PER_NIBBLE,
            });
        }
        self.data_in = nibbles;
        Ok(())
    }

    /// Advances the core by one step and returns the outputs visible after
    /// the step boundary.
    pub fn step(&mut self, inputs: CoreInputs) -> CoreOutputs {
        let t = transition(
            &self.geometry,
            &self.regs,
            &inputs,
            &self.run_data,
            self.store.read_data(),
        );

        match t.port {
            PortOp::Idle => {}
            PortOp::Clear => self.store.clear(),
            PortOp::Read(addr) => self.store.read(addr),
            PortOp::Increment(base) => self.store.increment(base),
        }
        self.store.commit();
        if t.latch_data {
            self.run_data = self.data_in.clone();
        }

        if t.next.state != self.regs.state {
            log::trace!(
                "cycle {}: {:?} -> {:?}",
                self.cycle,
                self.regs.state,
                t.next.state
            );
        }
        match (self.regs.state, t.next.state) {
            (CoreState::Idle, CoreState::Clear) => log::info!(
                "run start: n={} k={} data={}",
                self.geometry.n,
                self.geometry.k,
                self.run_data
            ),
            (CoreState::NextSubset, CoreState::Select) => {
                log::debug!("subset {:#x} -> {:#x}", self.regs.mask, t.next.mask)
            }
            (s, CoreState::Done) if s != CoreState::Done => {
                log::info!("run done at cycle {}", self.cycle)
            }
            _ => {}
        }

        self.regs = t.next;
        self.cycle += 1;
        self.outputs()
    }

    pub fn outputs(&self) -> CoreOutputs {
        CoreOutputs {
            busy: self.regs.busy,
            done: self.regs.done,
            rd_data: self.store.read_data().value,
        }
    }

    pub fn state(&self) -> CoreState {
        self.regs.state
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Data captured for the current (or most recent) run.
    pub fn run_data(&self) -> &NibbleArray {
        &self.run_data
    }

    /// Steps taken since construction or the last reset.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// External reset: returns the controller to IDLE, abandoning any run.
    /// Histogram contents are left as they are.
    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.store.reset_ports();
        self.cycle = 0;
    }

    /// Zero-latency copy of the histogram counters.
    pub fn histogram(&self) -> Histogram {
        self.store.snapshot()
    }

    pub fn accesses(&self) -> &[Access] {
        self.store.accesses()
    }
}
