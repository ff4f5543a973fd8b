// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::atlas_error::AtlasError;
use crate::nibble_utils::{MAX_NIBBLES, MIN_NIBBLES};
use crate::operators::OP_COUNT;
use crate::subset_enum::binomial;

pub const DEFAULT_COUNT_WIDTH: u32 = 32;
pub const MAX_COUNT_WIDTH: u32 = 64;

/// Number of array positions combined per operator evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum SubsetSize {
    Two,
    Three,
}

impl SubsetSize {
    pub fn get(self) -> usize {
        match self {
            SubsetSize::Two => 2,
            SubsetSize::Three => 3,
        }
    }

    /// Operator combinations swept per subset: 10 for pairs, 100 for triples.
    pub fn ops_per_subset(self) -> u64 {
        match self {
            SubsetSize::Two => OP_COUNT as u64,
            SubsetSize::Three => (OP_COUNT * OP_COUNT) as u64,
        }
    }
}

impl TryFrom<usize> for SubsetSize {
    type Error = AtlasError;
    fn try_from(k: usize) -> Result<Self, Self::Error> {
        match k {
            2 => Ok(SubsetSize::Two),
            3 => Ok(SubsetSize::Three),
            _ => Err(AtlasError::InvalidSubsetSize(k)),
        }
    }
}

impl From<SubsetSize> for usize {
    fn from(k: SubsetSize) -> usize {
        k.get()
    }
}

impl std::fmt::Display for SubsetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// What a histogram counter does when an increment would exceed its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Modulo `2^count_width`.
    #[default]
    Wrap,
    /// Clamp at `2^count_width - 1`.
    Saturate,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wrap" => Ok(Self::Wrap),
            "saturate" => Ok(Self::Saturate),
            _ => Err(format!("invalid overflow policy: {}", s)),
        }
    }
}

impl std::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowPolicy::Wrap => write!(f, "wrap"),
            OverflowPolicy::Saturate => write!(f, "saturate"),
        }
    }
}

/// Whether the histogram store records its committed port accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trace {
    #[default]
    None,
    Accesses,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasConfig {
    pub n_nibbles: usize,
    pub k: SubsetSize,
    #[serde(default = "default_count_width")]
    pub count_width: u32,
    #[serde(default)]
    pub overflow: OverflowPolicy,
    #[serde(default)]
    pub trace: Trace,
}

fn default_count_width() -> u32 {
    DEFAULT_COUNT_WIDTH
}

impl AtlasConfig {
    pub fn new(n_nibbles: usize, k: SubsetSize) -> Self {
        AtlasConfig {
            n_nibbles,
            k,
            count_width: DEFAULT_COUNT_WIDTH,
            overflow: OverflowPolicy::default(),
            trace: Trace::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AtlasError> {
        if !(MIN_NIBBLES..=MAX_NIBBLES).contains(&self.n_nibbles) {
            return Err(AtlasError::InvalidNibbleCount(self.n_nibbles));
        }
        if self.count_width == 0 || self.count_width > MAX_COUNT_WIDTH {
            return Err(AtlasError::InvalidCountWidth(self.count_width));
        }
        Ok(())
    }

    pub fn subset_count(&self) -> u64 {
        binomial(self.n_nibbles, self.k.get())
    }

    /// Total histogram increments in one run; also the largest value any
    /// single bin can reach.
    pub fn total_events(&self) -> u64 {
        self.subset_count() * self.k.ops_per_subset()
    }

    /// Whether `count_width` bits can hold `total_events()` without overflow.
    pub fn count_width_is_sufficient(&self) -> bool {
        if self.count_width >= MAX_COUNT_WIDTH {
            return true;
        }
        self.total_events() < (1u64 << self.count_width)
    }
}
