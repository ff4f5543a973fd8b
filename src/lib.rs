// SPDX-License-Identifier: Apache-2.0

//! Step-accurate model of a boolean-atlas core: for an array of up to 32
//! nibbles, every 2- or 3-element subset is pushed through every combination
//! of ten bitwise boolean operators and the 4-bit results are histogrammed.
//!
//! ```
//! use boolean_atlas::{run_hex, SubsetSize};
//!
//! let report = run_hex("A1F3", SubsetSize::Two).unwrap();
//! assert_eq!(report.histogram.total(), 60);
//! ```

pub mod atlas_error;
pub mod config;
pub mod controller;
pub mod harness;
pub mod histogram;
pub mod nibble_utils;
pub mod operators;
pub mod reference;
pub mod selector;
pub mod subset_enum;

pub use atlas_error::AtlasError;
pub use config::{AtlasConfig, OverflowPolicy, SubsetSize, Trace};
pub use controller::{AtlasCore, CoreInputs, CoreOutputs, CoreState};
pub use harness::{run_hex, Harness, RunReport};
pub use histogram::{Histogram, BIN_COUNT};
pub use nibble_utils::{hex_to_nibbles_le, pack_nibbles_le, NibbleArray};
pub use operators::BoolOp;
pub use reference::reference_histogram;
