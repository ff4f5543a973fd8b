// SPDX-License-Identifier: Apache-2.0

//! Enumerates N-bit masks with exactly K bits set, in increasing numeric
//! order, using Gosper's successor rule.
//!
//! All intermediate values are held in `u64` and masked back down to `N` bits
//! after each arithmetic step, so the 32-nibble case never relies on native
//! `u32` wraparound.

use crate::config::SubsetSize;

/// Returns a mask with the low `n` bits set.
pub fn width_mask(n: usize) -> u64 {
    debug_assert!(n <= 63);
    (1u64 << n) - 1
}

/// Number of ways to choose `k` of `n` positions.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1u64, |acc, i| acc * (n - i) as u64 / (i + 1) as u64)
}

/// Lowest `k` bits set.
pub fn initial_mask(k: SubsetSize) -> u32 {
    ((1u64 << k.get()) - 1) as u32
}

/// Highest `k` of `n` bits set. Only meaningful when `n >= k`.
pub fn terminal_mask(n: usize, k: SubsetSize) -> u32 {
    debug_assert!(n >= k.get());
    ((((1u64 << k.get()) - 1) << (n - k.get())) & width_mask(n)) as u32
}

/// Computes the next-larger `n`-bit mask with the same popcount as `mask`.
///
/// The caller must not ask for the successor of the terminal mask; doing so
/// yields a truncated value with fewer bits set.
pub fn gosper_successor(mask: u32, n: usize) -> u32 {
    let width = width_mask(n);
    let x = mask as u64 & width;
    debug_assert!(x != 0, "successor of the empty mask");
    let neg = x.wrapping_neg() & width;
    // Lowest set bit.
    let c = x & neg;
    let r = (x + c) & width;
    let t = ((r ^ x) & width) >> 2;
    let tz = c.trailing_zeros();
    let shifted = t.checked_shr(tz).unwrap_or(0);
    ((shifted | r) & width) as u32
}
