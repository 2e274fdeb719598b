//! UTF-8 validation with an ASCII fast path.
//!
//! The common case is pure ASCII, which the SIMD high-bit scan disposes of at
//! memory bandwidth. Only when a high bit is found does the range validator
//! take over, from the first suspect byte: lead bytes of 2/3/4-byte sequences
//! are checked against the legal continuation ranges, rejecting overlong
//! encodings, surrogates (`U+D800..=U+DFFF`), and code points above
//! `U+10FFFF`.

use crate::simd;

/// True iff `s` is well-formed UTF-8.
pub fn is_valid(s: &[u8]) -> bool {
    match simd::index_non_ascii(s) {
        None => true,
        Some(idx) => valid_range(&s[idx..]),
    }
}

/// Range-table validation of a region known to start at a non-ASCII byte
/// boundary. ASCII bytes inside the region pass through one at a time.
fn valid_range(mut s: &[u8]) -> bool {
    while let Some(&b0) = s.first() {
        let advance = match b0 {
            0x00..=0x7F => 1,
            // C2..DF: two-byte sequences. C0/C1 would be overlong.
            0xC2..=0xDF => {
                if s.len() < 2 || !is_cont(s[1]) {
                    return false;
                }
                2
            }
            0xE0..=0xEF => {
                if s.len() < 3 || !is_cont(s[1]) || !is_cont(s[2]) {
                    return false;
                }
                let ok = match b0 {
                    0xE0 => s[1] >= 0xA0, // reject overlong
                    0xED => s[1] <= 0x9F, // reject surrogates
                    _ => true,
                };
                if !ok {
                    return false;
                }
                3
            }
            0xF0..=0xF4 => {
                if s.len() < 4 || !is_cont(s[1]) || !is_cont(s[2]) || !is_cont(s[3]) {
                    return false;
                }
                let ok = match b0 {
                    0xF0 => s[1] >= 0x90, // reject overlong
                    0xF4 => s[1] <= 0x8F, // reject > U+10FFFF
                    _ => true,
                };
                if !ok {
                    return false;
                }
                4
            }
            // Stray continuation bytes, C0/C1, F5..FF.
            _ => return false,
        };
        s = &s[advance..];
    }
    true
}

#[inline(always)]
fn is_cont(b: u8) -> bool {
    (0x80..=0xBF).contains(&b)
}
