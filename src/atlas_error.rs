// SPDX-License-Identifier: Apache-2.0

use crate::histogram::Histogram;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// Number of nibbles is outside of `[1, 32]`.
    InvalidNibbleCount(usize),
    /// Subset size is not 2 or 3.
    InvalidSubsetSize(usize),
    /// Histogram counter width is outside of `[1, 64]` bits.
    InvalidCountWidth(u32),
    /// A nibble value does not fit in 4 bits.
    NibbleOutOfRange { index: usize, value: u8 },
    /// A character in a hex string is not a hex digit; `index` counts
    /// characters of the cleaned-up string from the left.
    InvalidHexDigit { ch: char, index: usize },
    /// A packed data vector does not have the expected number of bits.
    DataWidthMismatch { expected: usize, actual: usize },
    /// The controller did not raise `done` within the step budget.
    Timeout { steps: u64 },
    /// Controller histogram disagrees with the brute-force reference.
    ReferenceMismatch {
        expected: Histogram,
        actual: Histogram,
    },
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "atlas error: ")?;
        match self {
            AtlasError::InvalidNibbleCount(n) => {
                write!(f, "nibble count must be in [1, 32]; got {}", n)
            }
            AtlasError::InvalidSubsetSize(k) => {
                write!(f, "subset size must be 2 or 3; got {}", k)
            }
            AtlasError::InvalidCountWidth(w) => {
                write!(f, "count width must be in [1, 64] bits; got {}", w)
            }
            AtlasError::NibbleOutOfRange { index, value } => {
                write!(f, "nibble {} has value {} which exceeds 15", index, value)
            }
            AtlasError::InvalidHexDigit { ch, index } => {
                write!(f, "invalid hex digit {:?} at index {}", ch, index)
            }
            AtlasError::DataWidthMismatch { expected, actual } => write!(
                f,
                "packed data width mismatch; expected {} bits, got {}",
                expected, actual
            ),
            AtlasError::Timeout { steps } => {
                write!(f, "timed out waiting for done after {} steps", steps)
            }
            AtlasError::ReferenceMismatch { expected, actual } => write!(
                f,
                "histogram mismatch vs reference; expected {} got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for AtlasError {}
