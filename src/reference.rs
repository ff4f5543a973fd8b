// SPDX-License-Identifier: Apache-2.0

//! Brute-force histogram used to validate the controller.
//!
//! Subsets come from `itertools` index combinations rather than the mask
//! enumerator, so the two paths share nothing but the operator table.

use itertools::Itertools;

use crate::config::SubsetSize;
use crate::histogram::Histogram;
use crate::nibble_utils::NibbleArray;
use crate::operators::ALL_OPS;

pub use crate::subset_enum::binomial;

/// Number of histogram increments a full run performs: `C(n, k) * 10^(k-1)`.
pub fn expected_total_events(n: usize, k: SubsetSize) -> u64 {
    binomial(n, k.get()) * k.ops_per_subset()
}

pub fn reference_histogram(nibbles: &NibbleArray, k: SubsetSize) -> Histogram {
    let mut hist = Histogram::default();
    let values = nibbles.as_slice();
    for positions in (0..values.len()).combinations(k.get()) {
        let a = values[positions[0]];
        let b = values[positions[1]];
        match k {
            SubsetSize::Two => {
                for op in ALL_OPS {
                    hist.bump(op.apply(a, b));
                }
            }
            SubsetSize::Three => {
                let c = values[positions[2]];
                for op1 in ALL_OPS {
                    let first = op1.apply(a, b);
                    for op2 in ALL_OPS {
                        hist.bump(op2.apply(first, c));
                    }
                }
            }
        }
    }
    hist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nibble_utils::hex_to_nibbles_le;
    use crate::operators::BoolOp;

    #[test]
    fn test_single_pair_histogram_by_hand() {
        // a=0x3, b=0x5 gives one result per operator.
        let nibbles = NibbleArray::new(vec![0x3, 0x5]).unwrap();
        let hist = reference_histogram(&nibbles, SubsetSize::Two);
        let mut want = Histogram::default();
        for op in ALL_OPS {
            want.bump(op.apply(0x3, 0x5));
        }
        assert_eq!(hist, want);
        assert_eq!(hist[BoolOp::And.apply(0x3, 0x5) as usize], 1);
        assert_eq!(hist.total(), 10);
    }

    #[test]
    fn test_totals_for_a1f3() {
        let nibbles = hex_to_nibbles_le("A1F3").unwrap();
        assert_eq!(reference_histogram(&nibbles, SubsetSize::Two).total(), 60);
        assert_eq!(reference_histogram(&nibbles, SubsetSize::Three).total(), 400);
        assert_eq!(expected_total_events(4, SubsetSize::Two), 60);
        assert_eq!(expected_total_events(4, SubsetSize::Three), 400);
    }

    #[test]
    fn test_all_zero_pairs() {
        // With a=b=0: AND, OR, XOR, NIMPLY, INV give 0; IMPLY, CONV, XNOR,
        // NAND, NOR give 0xF.
        let nibbles = NibbleArray::new(vec![0, 0, 0]).unwrap();
        let hist = reference_histogram(&nibbles, SubsetSize::Two);
        assert_eq!(hist[0], 15);
        assert_eq!(hist[15], 15);
        assert_eq!(hist.total(), 30);
    }

    #[test]
    fn test_too_few_nibbles_is_empty() {
        let nibbles = NibbleArray::new(vec![9, 9]).unwrap();
        assert_eq!(
            reference_histogram(&nibbles, SubsetSize::Three),
            Histogram::default()
        );
    }
}
