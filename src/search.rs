//! Staged single-needle substring search.
//!
//! # High-level algorithm
//! Given a needle's rare pair `(rare1, off1, rare2, off2)`, the driver runs
//! up to three stages, threading a resume position between them:
//!
//! 1. **1-byte adaptive scan** on `rare1` alone. Fastest per byte, but every
//!    filter hit costs a verification; once failures exceed
//!    `warmup + (bytes >> shift)` the stage bails with a resume position.
//! 2. **2-byte block scan** requiring both rare bytes at their relative
//!    offsets inside one vector block. Far more selective; escalates the
//!    same way under a much higher threshold.
//! 3. **Rabin-Karp**, which guarantees linear total work for inputs that
//!    defeat byte filtering entirely (periodic patterns, single-symbol
//!    floods). Needles of eight bytes or fewer use a brute-force folded scan
//!    instead; the rolling-hash setup costs more than it saves there.
//!
//! Pathology bypasses keep the stages honest: stage 1 is skipped outright
//! when `rare1` is too common for a one-byte filter to pay, and very long
//! needles whose both filter bytes are common go straight to stage 3.
//!
//! # Rare-pair source by caller
//! - One-shot [`index_fold`]/[`index`]: O(1) sampled selection.
//! - [`Needle`]/[`Searcher`]: O(n) full-scan selection at construction,
//!   optionally under a caller-supplied corpus [`RankTable`].

use crate::fold::{normalize, to_lower, to_upper_lower};
use crate::rabin_karp;
use crate::ranks::{RankTable, BYTE_RANK};
use crate::rare::{select_full, select_sampled, RarePair};
use crate::simd::{self, Cutover, StageResult, StageSpec};

/// Tuning thresholds for the staged driver.
///
/// The defaults were chosen empirically against representative corpora;
/// callers with unusual workloads can adjust them per [`Searcher`] via
/// [`Searcher::with_config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Stage-1 tolerated failures before any bytes are scanned.
    pub stage1_warmup: u64,
    /// Stage-1 earns one extra tolerated failure per `1 << shift` bytes.
    pub stage1_shift: u32,
    /// Stage-2 warmup; much higher because stage 2 is the workhorse.
    pub stage2_warmup: u64,
    /// Stage-2 failure-per-bytes shift.
    pub stage2_shift: u32,
    /// Case-sensitive one-shot: skip stage 1 when the first byte ranks
    /// above this.
    pub skip_stage1_rank: u8,
    /// Case-sensitive one-shot: skip stage 1 when first == last byte and
    /// the byte ranks above this (covers quotes and similar).
    pub skip_stage1_repeat_rank: u8,
    /// Case-insensitive one-shot: skip stage 1 when `rare1` ranks above
    /// this.
    pub skip_stage1_fold_rank: u8,
    /// Case-insensitive one-shot: below this haystack size the 2-byte
    /// filter is more robust than a 1-byte warmup.
    pub small_haystack: usize,
    /// Needles longer than this with two common filter bytes go straight
    /// to Rabin-Karp.
    pub direct_rk_len: usize,
    /// Rank floor for the direct-to-Rabin-Karp bypass.
    pub direct_rk_rank: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            stage1_warmup: 4,
            stage1_shift: 8,
            stage2_warmup: 32,
            stage2_shift: 4,
            skip_stage1_rank: 240,
            skip_stage1_repeat_rank: 160,
            skip_stage1_fold_rank: 200,
            small_haystack: 2048,
            direct_rk_len: 64,
            direct_rk_rank: 180,
        }
    }
}

// ---------------------------------------------------------------------------
// One-shot entry points
// ---------------------------------------------------------------------------

/// First case-insensitive occurrence of `needle` in `hay`.
/// Empty needles match at 0.
pub fn index_fold(hay: &[u8], needle: &[u8]) -> Option<usize> {
    let cfg = SearchConfig::default();
    let n = needle.len();
    if n == 0 {
        return Some(0);
    }
    if hay.len() < n {
        return None;
    }
    if n == 1 {
        let (upper, lower) = to_upper_lower(needle[0]);
        return match (memchr::memchr(upper, hay), memchr::memchr(lower, hay)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    // Position-0 quick check: avoids all scanner setup for leading matches.
    if to_lower(hay[0]) == to_lower(needle[0]) && simd::equal_fold(&hay[..n], needle) {
        return Some(0);
    }

    let pair = select_sampled(needle, None, false);
    let norm = normalize(needle);
    let rank1 = BYTE_RANK[pair.rare1 as usize];
    let rank2 = BYTE_RANK[pair.rare2 as usize];

    if n > cfg.direct_rk_len && rank1 > cfg.direct_rk_rank && rank2 > cfg.direct_rk_rank {
        return rabin_karp::index_fold(hay, &norm);
    }

    let skip_stage1 = hay.len() < cfg.small_haystack || rank1 > cfg.skip_stage1_fold_rank;
    drive(hay, &norm, &pair, true, skip_stage1, &cfg)
}

/// First case-sensitive occurrence of `needle` in `hay`.
/// Empty needles match at 0.
pub fn index(hay: &[u8], needle: &[u8]) -> Option<usize> {
    let cfg = SearchConfig::default();
    let n = needle.len();
    if n == 0 {
        return Some(0);
    }
    if hay.len() < n {
        return None;
    }
    if n == 1 {
        return memchr::memchr(needle[0], hay);
    }

    if hay[0] == needle[0] && &hay[..n] == needle {
        return Some(0);
    }

    let pair = select_full(needle, None, true);
    let rank1 = BYTE_RANK[pair.rare1 as usize];
    let rank2 = BYTE_RANK[pair.rare2 as usize];

    // Byte filtering degrades toward O(n*m) when both filter bytes are
    // common; the rolling hash holds O(n+m).
    if n > cfg.direct_rk_len && rank1 > cfg.direct_rk_rank && rank2 > cfg.direct_rk_rank {
        return rabin_karp::index_exact(hay, needle);
    }

    let first = needle[0];
    let last = needle[n - 1];
    let first_rank = BYTE_RANK[first as usize];
    let skip_stage1 = first_rank > cfg.skip_stage1_rank
        || (first == last && first_rank > cfg.skip_stage1_repeat_rank);

    drive(hay, needle, &pair, false, skip_stage1, &cfg)
}

/// Whether `hay` contains `needle` case-insensitively.
pub fn contains_fold(hay: &[u8], needle: &[u8]) -> bool {
    index_fold(hay, needle).is_some()
}

// ---------------------------------------------------------------------------
// Staged driver
// ---------------------------------------------------------------------------

/// Runs the stages over `hay`. `verify_needle` is the normalized needle for
/// folded search and the raw needle otherwise.
fn drive(
    hay: &[u8],
    verify_needle: &[u8],
    pair: &RarePair,
    fold: bool,
    skip_stage1: bool,
    cfg: &SearchConfig,
) -> Option<usize> {
    let mut hay = hay;
    let mut resume = 0usize;

    if !skip_stage1 && pair.off1 != pair.off2 {
        let spec = StageSpec {
            needle: verify_needle,
            off1: pair.off1,
            off2: pair.off1,
            rare1: pair.rare1,
            rare2: pair.rare1,
            fold,
            cutover: Cutover { warmup: cfg.stage1_warmup, shift: cfg.stage1_shift },
        };
        match simd::stage_scan(hay, &spec) {
            StageResult::Found(p) => return Some(p),
            StageResult::NotFound => return None,
            StageResult::Exceeded(p) => {
                resume = p;
                hay = &hay[p..];
            }
        }
    }

    let spec = StageSpec {
        needle: verify_needle,
        off1: pair.off1,
        off2: pair.off2,
        rare1: pair.rare1,
        rare2: pair.rare2,
        fold,
        cutover: Cutover { warmup: cfg.stage2_warmup, shift: cfg.stage2_shift },
    };
    match simd::stage_scan(hay, &spec) {
        StageResult::Found(p) => Some(resume + p),
        StageResult::NotFound => None,
        StageResult::Exceeded(p) => {
            resume += p;
            hay = &hay[p..];
            stage3(hay, verify_needle, fold).map(|p| resume + p)
        }
    }
}

/// Guaranteed-linear last stage.
fn stage3(hay: &[u8], needle: &[u8], fold: bool) -> Option<usize> {
    if fold {
        if needle.len() <= 8 {
            index_fold_brute(hay, needle)
        } else {
            rabin_karp::index_fold(hay, needle)
        }
    } else if needle.len() <= 8 {
        memchr::memmem::find(hay, needle)
    } else {
        rabin_karp::index_exact(hay, needle)
    }
}

/// Brute-force folded scan; beats the rolling hash on short needles.
fn index_fold_brute(hay: &[u8], needle: &[u8]) -> Option<usize> {
    let n = needle.len();
    if hay.len() < n {
        return None;
    }
    (0..=hay.len() - n).find(|&i| simd::equal_fold(&hay[i..i + n], needle))
}

// ---------------------------------------------------------------------------
// Precomputed needles
// ---------------------------------------------------------------------------

/// A precomputed case-insensitive pattern: normalized copy plus full-scan
/// rare pair. Construct once, search many haystacks; immutable and freely
/// shareable across threads.
#[derive(Clone, Debug)]
pub struct Needle {
    raw: Box<[u8]>,
    norm: Box<[u8]>,
    pair: RarePair,
}

impl Needle {
    /// Precomputes `pattern` under the default rank model.
    pub fn new(pattern: &[u8]) -> Self {
        Self::build(pattern, None)
    }

    /// Precomputes `pattern` under a corpus-derived rank model. On corpora
    /// whose byte distribution differs from English text (JSON, UUIDs, DNA),
    /// this markedly improves filter selectivity.
    pub fn with_ranks(pattern: &[u8], ranks: &RankTable) -> Self {
        Self::build(pattern, Some(ranks))
    }

    fn build(pattern: &[u8], ranks: Option<&RankTable>) -> Self {
        let pair = if pattern.is_empty() {
            RarePair::default()
        } else {
            select_full(pattern, ranks, false)
        };
        Self {
            raw: pattern.into(),
            norm: normalize(pattern).into_owned().into_boxed_slice(),
            pair,
        }
    }

    /// The original pattern bytes.
    pub fn pattern(&self) -> &[u8] {
        &self.raw
    }

    /// First case-insensitive occurrence of the pattern in `hay`.
    pub fn find(&self, hay: &[u8]) -> Option<usize> {
        if self.raw.is_empty() {
            return Some(0);
        }
        if hay.len() < self.raw.len() {
            return None;
        }
        if self.raw.len() == 1 {
            let (upper, lower) = to_upper_lower(self.raw[0]);
            return match (memchr::memchr(upper, hay), memchr::memchr(lower, hay)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        drive(hay, &self.norm, &self.pair, true, false, &SearchConfig::default())
    }

    /// First case-sensitive occurrence, reusing the precomputed offsets with
    /// the original-case bytes at those positions.
    pub fn find_exact(&self, hay: &[u8]) -> Option<usize> {
        if self.raw.is_empty() {
            return Some(0);
        }
        if hay.len() < self.raw.len() {
            return None;
        }
        if self.raw.len() == 1 {
            return memchr::memchr(self.raw[0], hay);
        }
        let pair = RarePair {
            rare1: self.raw[self.pair.off1],
            off1: self.pair.off1,
            rare2: self.raw[self.pair.off2],
            off2: self.pair.off2,
        };
        drive(hay, &self.raw, &pair, false, false, &SearchConfig::default())
    }
}

/// A precomputed pattern with an explicit case-sensitivity mode and tunable
/// thresholds. The superset of [`Needle`] used for repeated searches.
#[derive(Clone, Debug)]
pub struct Searcher {
    raw: Box<[u8]>,
    norm: Box<[u8]>,
    pair: RarePair,
    case_sensitive: bool,
    config: SearchConfig,
}

impl Searcher {
    /// Builds a searcher with O(n) full-scan rare-byte selection.
    pub fn new(pattern: &[u8], case_sensitive: bool) -> Self {
        Self::build(pattern, None, case_sensitive)
    }

    /// Builds a searcher under a corpus-derived rank model.
    pub fn with_ranks(pattern: &[u8], ranks: &RankTable, case_sensitive: bool) -> Self {
        Self::build(pattern, Some(ranks), case_sensitive)
    }

    /// Replaces the tuning thresholds.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    fn build(pattern: &[u8], ranks: Option<&RankTable>, case_sensitive: bool) -> Self {
        let pair = if pattern.is_empty() {
            RarePair::default()
        } else {
            select_full(pattern, ranks, case_sensitive)
        };
        Self {
            raw: pattern.into(),
            norm: normalize(pattern).into_owned().into_boxed_slice(),
            pair,
            case_sensitive,
            config: SearchConfig::default(),
        }
    }

    pub fn pattern(&self) -> &[u8] {
        &self.raw
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// First occurrence of the pattern in `hay` under the searcher's
    /// case-sensitivity mode.
    pub fn find(&self, hay: &[u8]) -> Option<usize> {
        if self.raw.is_empty() {
            return Some(0);
        }
        if hay.len() < self.raw.len() {
            return None;
        }
        if self.raw.len() == 1 {
            if self.case_sensitive {
                return memchr::memchr(self.raw[0], hay);
            }
            let (upper, lower) = to_upper_lower(self.raw[0]);
            return match (memchr::memchr(upper, hay), memchr::memchr(lower, hay)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }
        if self.case_sensitive {
            drive(hay, &self.raw, &self.pair, false, false, &self.config)
        } else {
            drive(hay, &self.norm, &self.pair, true, false, &self.config)
        }
    }
}
