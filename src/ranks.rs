//! Byte frequency rank model used for rare-byte selection.
//!
//! The static table assigns every byte value a rarity score (lower = rarer),
//! derived from a mixed English/code corpus. The rare-pair selector picks the
//! needle offsets whose bytes score lowest, so the SIMD prefilter spends its
//! time on bytes that are unlikely to occur in the haystack at all.
//!
//! Two refinements on top of the raw counts:
//! - UTF-8 lead bytes (`0xC0..=0xFF`) are forced to the maximum rank so that
//!   continuation bytes, which carry far more signal, win the selection in
//!   non-ASCII needles.
//! - The case-folded variant gives each letter the rank `rank(upper) +
//!   rank(lower)`, modeling the probability of either case occurring when the
//!   search is case-insensitive.
//!
//! Callers with unusual corpora (DNA, hex dumps, structured logs) can supply
//! their own table via [`RankTable`]; [`build_rank_table`] derives one from a
//! representative sample.

use std::error::Error;
use std::fmt;

/// Default byte frequency ranks (lower = rarer).
///
/// Mirrors the ranking popularized by the aho-corasick crate (corpus: CIA
/// World Factbook, rustc source, Septuaginta), with UTF-8 lead bytes forced
/// to 255.
pub const BYTE_RANK: [u8; 256] = [
    // 0x00-0x1F: control characters, mostly rare
    55, 52, 51, 50, 49, 48, 47, 46, 45, 103, 242, 66, 67, 229, 44, 43, 42, 41, 40, 39, 38, 37, 36,
    35, 34, 33, 56, 32, 31, 30, 29, 28,
    // 0x20-0x40: space, punctuation, digits
    255, 148, 164, 149, 136, 160, 155, 173, 221, 222, 134, 122, 232, 202, 215, 224, 208, 220, 204,
    187, 183, 179, 177, 168, 178, 200, 226, 195, 154, 184, 174, 126, 120,
    // 0x41-0x5A: A-Z
    191, 157, 194, 170, 189, 162, 161, 150, 193, 142, 137, 171, 176, 185, 167, 186, 112, 175, 192,
    188, 156, 140, 143, 123, 133, 128,
    // 0x5B-0x60: brackets and punctuation
    147, 138, 146, 114, 223, 151,
    // 0x61-0x7A: a-z
    249, 216, 238, 236, 253, 227, 218, 230, 247, 135, 180, 241, 233, 246, 244, 231, 139, 245, 243,
    251, 235, 201, 196, 240, 214, 152,
    // 0x7B-0x7F: braces and DEL
    182, 205, 181, 127, 27,
    // 0x80-0xBF: UTF-8 continuation bytes
    212, 211, 210, 213, 228, 197, 169, 159, 131, 172, 105, 80, 98, 96, 97, 81, 207, 145, 116, 115,
    144, 130, 153, 121, 107, 132, 109, 110, 124, 111, 82, 108, 118, 141, 113, 129, 119, 125, 165,
    117, 92, 106, 83, 72, 99, 93, 65, 79, 166, 237, 163, 199, 190, 225, 209, 203, 198, 217, 219,
    206, 234, 248, 158, 239,
    // 0xC0-0xFF: UTF-8 lead bytes, forced to most-common
    255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255,
    255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255,
    255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255, 255,
    255, 255, 255, 255, 255, 255, 255,
];

/// Case-folded ranks: for letters, `rank(upper) + rank(lower)` so both cases
/// read as one symbol. Computed at compile time from [`BYTE_RANK`].
pub(crate) static CASE_FOLD_RANK: [u16; 256] = fold_ranks(&BYTE_RANK);

const fn fold_ranks(base: &[u8; 256]) -> [u16; 256] {
    let mut out = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        out[i] = base[i] as u16;
        i += 1;
    }
    let mut c = b'A';
    while c <= b'Z' {
        let lower = c + 0x20;
        let sum = base[c as usize] as u16 + base[lower as usize] as u16;
        out[c as usize] = sum;
        out[lower as usize] = sum;
        c += 1;
    }
    out
}

pub(crate) fn widen(base: &[u8; 256]) -> [u16; 256] {
    let mut out = [0u16; 256];
    for (o, &b) in out.iter_mut().zip(base.iter()) {
        *o = u16::from(b);
    }
    out
}

/// A caller-supplied byte frequency table (lower = rarer).
///
/// Build one from a representative corpus with [`build_rank_table`], or
/// validate raw bytes with [`RankTable::new`]. The case-folding sum transform
/// is applied internally when the table is used for case-insensitive
/// selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankTable {
    ranks: [u8; 256],
}

impl RankTable {
    /// Validates a raw table. The slice must hold exactly 256 entries.
    pub fn new(ranks: &[u8]) -> Result<Self, RankTableError> {
        let ranks: [u8; 256] = ranks
            .try_into()
            .map_err(|_| RankTableError::BadLength { len: ranks.len() })?;
        Ok(Self { ranks })
    }

    /// Wraps an array without validation (the length is already right).
    pub fn from_array(ranks: [u8; 256]) -> Self {
        Self { ranks }
    }

    pub fn as_array(&self) -> &[u8; 256] {
        &self.ranks
    }

    /// Direct ranks widened to u16, for case-sensitive selection.
    pub(crate) fn direct(&self) -> [u16; 256] {
        widen(&self.ranks)
    }

    /// Case-folded ranks: letters get `rank(upper) + rank(lower)`.
    pub(crate) fn folded(&self) -> [u16; 256] {
        let mut out = self.direct();
        for c in b'A'..=b'Z' {
            let lower = c + 0x20;
            let sum = u16::from(self.ranks[c as usize]) + u16::from(self.ranks[lower as usize]);
            out[c as usize] = sum;
            out[lower as usize] = sum;
        }
        out
    }
}

/// Errors from [`RankTable`] construction.
#[derive(Debug)]
#[non_exhaustive]
pub enum RankTableError {
    /// The table did not hold exactly 256 entries.
    BadLength { len: usize },
}

impl fmt::Display for RankTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankTableError::BadLength { len } => {
                write!(f, "rank table must have exactly 256 entries, got {len}")
            }
        }
    }
}

impl Error for RankTableError {}

/// Derives a rank table from a corpus sample.
///
/// Letters are counted case-insensitively (both cases accumulate into the
/// uppercase slot before the fold transform redistributes them), and counts
/// are scaled so the most frequent byte lands at 255.
pub fn build_rank_table(corpus: &[u8]) -> RankTable {
    let mut counts = [0usize; 256];
    for &b in corpus {
        let c = if b.is_ascii_lowercase() { b - 0x20 } else { b };
        counts[c as usize] += 1;
    }

    let max_count = counts.iter().copied().max().unwrap_or(0).max(1);

    let mut ranks = [0u8; 256];
    for (r, &c) in ranks.iter_mut().zip(counts.iter()) {
        *r = ((c * 255) / max_count) as u8;
    }
    RankTable::from_array(ranks)
}
