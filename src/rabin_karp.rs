//! Rolling-hash substring search, the guaranteed-linear stage-3 fallback.
//!
//! The byte filters degrade to O(n*m) on periodic inputs like `"ABCABC.."`
//! searched for `"ABCABC"`; the rolling hash keeps total work at
//! O(len(haystack) + len(needle)) no matter what. Hashes are u32 with
//! wrap-around by design.
//!
//! The rolling update uses the antisigma trick: with `antisigma =
//! -PRIME_RK^n (mod 2^32)`, sliding the window one byte is
//! `hash = hash * PRIME_RK + fold(new) + antisigma * fold(old)`.
//!
//! Every backend uses this one portable implementation as its stage 3; the
//! original's x86 path quietly delegated to a scalar scan under a Rabin-Karp
//! name, which this rewrite does not reproduce.

use crate::fold::FOLD_TABLE;
use crate::simd;

/// Same prime the Go standard library uses for Rabin-Karp.
pub(crate) const PRIME_RK: u32 = 16777619;

/// `PRIME_RK^n mod 2^32` by repeated squaring.
fn pow_prime(mut n: usize) -> u32 {
    let mut result = 1u32;
    let mut base = PRIME_RK;
    while n > 0 {
        if n & 1 != 0 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        n >>= 1;
    }
    result
}

#[inline(always)]
fn fold(b: u8) -> u32 {
    u32::from(FOLD_TABLE[b as usize])
}

/// Case-insensitive Rabin-Karp. The needle may be raw or pre-normalized;
/// hashing goes through the fold table either way, and candidates are
/// confirmed with folded equality.
pub(crate) fn index_fold(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    search(haystack, needle, fold, |window, needle| {
        simd::equal_fold(window, needle)
    })
}

/// Case-sensitive Rabin-Karp with exact verification.
pub(crate) fn index_exact(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    search(haystack, needle, u32::from, |window, needle| window == needle)
}

#[inline(always)]
fn search(
    haystack: &[u8],
    needle: &[u8],
    hash_byte: impl Fn(u8) -> u32,
    verify: impl Fn(&[u8], &[u8]) -> bool,
) -> Option<usize> {
    let n = needle.len();
    if n == 0 {
        return Some(0);
    }
    if haystack.len() < n {
        return None;
    }

    let search_len = haystack.len() - n + 1;
    let antisigma = pow_prime(n).wrapping_neg();

    let mut target = 0u32;
    let mut hash = 0u32;
    for i in 0..n {
        target = target.wrapping_mul(PRIME_RK).wrapping_add(hash_byte(needle[i]));
        hash = hash.wrapping_mul(PRIME_RK).wrapping_add(hash_byte(haystack[i]));
    }

    if hash == target && verify(&haystack[..n], needle) {
        return Some(0);
    }

    for i in 1..search_len {
        hash = hash
            .wrapping_mul(PRIME_RK)
            .wrapping_add(hash_byte(haystack[i + n - 1]))
            .wrapping_add(antisigma.wrapping_mul(hash_byte(haystack[i - 1])));
        if hash == target && verify(&haystack[i..i + n], needle) {
            return Some(i);
        }
    }

    None
}
