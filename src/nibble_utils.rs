// SPDX-License-Identifier: Apache-2.0

//! Conversions between hex strings, nibble arrays, and the packed `data_in`
//! bit-vector layout the core consumes.

use bitvec::vec::BitVec;

use crate::atlas_error::AtlasError;

pub const MIN_NIBBLES: usize = 1;
pub const MAX_NIBBLES: usize = 32;
pub const BITS_PER_NIBBLE: usize = 4;

/// An ordered, validated sequence of 1 to 32 four-bit values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NibbleArray(Vec<u8>);

impl NibbleArray {
    pub fn new(values: Vec<u8>) -> Result<Self, AtlasError> {
        if !(MIN_NIBBLES..=MAX_NIBBLES).contains(&values.len()) {
            return Err(AtlasError::InvalidNibbleCount(values.len()));
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v > 0xF) {
            return Err(AtlasError::NibbleOutOfRange { index, value });
        }
        Ok(NibbleArray(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for NibbleArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", nibbles_to_hex_le(self))
    }
}

/// Decodes a hex string so that the rightmost digit lands at position 0.
///
/// Surrounding whitespace, a leading `0x`/`0X`, and `_` separators are
/// ignored. A `0x` anywhere past the start is an invalid digit.
pub fn hex_to_nibbles_le(text: &str) -> Result<NibbleArray, AtlasError> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let cleaned: Vec<char> = trimmed.chars().filter(|c| *c != '_').collect();
    let mut values = Vec::with_capacity(cleaned.len());
    for (index, ch) in cleaned.iter().enumerate().rev() {
        let digit = ch
            .to_digit(16)
            .ok_or(AtlasError::InvalidHexDigit { ch: *ch, index })?;
        values.push(digit as u8);
    }
    NibbleArray::new(values)
}

/// Inverse of [`hex_to_nibbles_le`]; emits uppercase digits, highest
/// position first.
pub fn nibbles_to_hex_le(nibbles: &NibbleArray) -> String {
    nibbles
        .as_slice()
        .iter()
        .rev()
        .map(|v| format!("{:X}", v))
        .collect()
}

/// Packs nibble `i` into bits `[4i+3:4i]` of a `4 * len`-bit vector (LSb at
/// index 0).
pub fn pack_nibbles_le(nibbles: &NibbleArray) -> BitVec {
    let mut bits = BitVec::repeat(false, nibbles.len() * BITS_PER_NIBBLE);
    for (i, &value) in nibbles.as_slice().iter().enumerate() {
        for b in 0..BITS_PER_NIBBLE {
            bits.set(i * BITS_PER_NIBBLE + b, (value >> b) & 1 == 1);
        }
    }
    bits
}

/// Reads the low `count` nibbles back out of a packed vector. Bits beyond
/// `4 * count` are ignored.
pub fn unpack_nibbles_le(bits: &BitVec, count: usize) -> Result<NibbleArray, AtlasError> {
    let expected = count * BITS_PER_NIBBLE;
    if bits.len() < expected {
        return Err(AtlasError::DataWidthMismatch {
            expected,
            actual: bits.len(),
        });
    }
    let values = (0..count)
        .map(|i| {
            (0..BITS_PER_NIBBLE).fold(0u8, |acc, b| {
                acc | ((bits[i * BITS_PER_NIBBLE + b] as u8) << b)
            })
        })
        .collect();
    NibbleArray::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_decodes_last_character_first() {
        let nibbles = hex_to_nibbles_le("A1F3").unwrap();
        assert_eq!(nibbles.as_slice(), &[3, 15, 1, 10]);
        assert_eq!(nibbles_to_hex_le(&nibbles), "A1F3");
    }

    #[test]
    fn test_hex_accepts_prefix_separators_and_lowercase() {
        let nibbles = hex_to_nibbles_le("  0xa1_f3 ").unwrap();
        assert_eq!(nibbles.as_slice(), &[3, 15, 1, 10]);
    }

    #[test]
    fn test_hex_prefix_is_only_stripped_at_the_start() {
        assert_eq!(
            hex_to_nibbles_le("A10xF3"),
            Err(AtlasError::InvalidHexDigit { ch: 'x', index: 3 })
        );
        assert_eq!(
            hex_to_nibbles_le("0X0x1"),
            Err(AtlasError::InvalidHexDigit { ch: 'x', index: 1 })
        );
    }

    #[test]
    fn test_hex_rejects_bad_digit_and_bad_length() {
        assert_eq!(
            hex_to_nibbles_le("A1G3"),
            Err(AtlasError::InvalidHexDigit { ch: 'G', index: 2 })
        );
        assert_eq!(hex_to_nibbles_le(""), Err(AtlasError::InvalidNibbleCount(0)));
        let too_long = "F".repeat(33);
        assert_eq!(
            hex_to_nibbles_le(&too_long),
            Err(AtlasError::InvalidNibbleCount(33))
        );
    }

    #[test]
    fn test_nibble_array_rejects_wide_values() {
        assert_eq!(
            NibbleArray::new(vec![1, 2, 16]),
            Err(AtlasError::NibbleOutOfRange {
                index: 2,
                value: 16
            })
        );
    }

    #[test]
    fn test_pack_layout_matches_integer_packing() {
        let nibbles = hex_to_nibbles_le("A1F3").unwrap();
        let bits = pack_nibbles_le(&nibbles);
        assert_eq!(bits.len(), 16);
        let as_int = bits
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, b)| acc | ((*b as u32) << i));
        assert_eq!(as_int, 0xA1F3);
        assert_eq!(unpack_nibbles_le(&bits, 4).unwrap(), nibbles);
    }

    #[test]
    fn test_unpack_rejects_short_vector() {
        let bits = BitVec::repeat(false, 7);
        assert_eq!(
            unpack_nibbles_le(&bits, 2),
            Err(AtlasError::DataWidthMismatch {
                expected: 8,
                actual: 7
            })
        );
    }
}
