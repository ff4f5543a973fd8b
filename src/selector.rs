// SPDX-License-Identifier: Apache-2.0

use crate::nibble_utils::NibbleArray;

pub const MAX_SELECTION: usize = 3;

/// The nibbles picked out by one subset mask, in ascending position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    values: [u8; MAX_SELECTION],
    len: usize,
}

impl Selection {
    pub fn from_values(values: &[u8]) -> Self {
        assert!(values.len() <= MAX_SELECTION);
        let mut selection = Selection::default();
        for &v in values {
            selection.push(v);
        }
        selection
    }

    fn push(&mut self, value: u8) {
        self.values[self.len] = value;
        self.len += 1;
    }

    pub fn values(&self) -> &[u8] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Scans positions `0..N` and collects the nibble at every position whose
/// bit is set in `mask`.
///
/// The mask comes from the subset enumerator, so its popcount is the subset
/// size and the selection is never longer than three.
pub fn select(mask: u32, nibbles: &NibbleArray) -> Selection {
    let mut selection = Selection::default();
    for (i, &value) in nibbles.as_slice().iter().enumerate() {
        if (mask >> i) & 1 == 1 && selection.len < MAX_SELECTION {
            selection.push(value);
        }
    }
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_takes_ascending_positions() {
        let nibbles = NibbleArray::new(vec![3, 15, 1, 10]).unwrap();
        assert_eq!(select(0b0011, &nibbles).values(), &[3, 15]);
        assert_eq!(select(0b1010, &nibbles).values(), &[15, 10]);
        assert_eq!(select(0b1101, &nibbles).values(), &[3, 1, 10]);
    }

    #[test]
    fn test_select_ignores_bits_past_array_end() {
        let nibbles = NibbleArray::new(vec![7, 8]).unwrap();
        assert_eq!(select(0b111, &nibbles).values(), &[7, 8]);
    }
}
