//! Rare-pair selection: picking the two needle offsets whose bytes are
//! rarest under a rank model.
//!
//! Two bytes at different offsets filter far more aggressively than one: a
//! block survives the prefilter only when both bytes match inside the same
//! vector lane, which multiplies the per-byte hit rates. Picking the rarest
//! bytes minimizes that product.
//!
//! Two strategies, matching the two construction paths:
//! - [`select_full`] scans every needle position (O(n)); used by `Needle`
//!   and `Searcher` where the cost amortizes over many searches.
//! - [`select_sampled`] evaluates eight evenly spaced positions (O(1)); used
//!   by the one-shot entry points where analysis cost must stay constant.
//!
//! Both return offsets with `off1 <= off2` and bytes normalized to lowercase
//! when the search is case-insensitive. When no second distinct byte exists
//! (e.g. `"aaaa"`), the first and last positions are used as a fallback.

use crate::fold::to_lower;
use crate::ranks::{widen, RankTable, BYTE_RANK, CASE_FOLD_RANK};

/// The chosen filter bytes for a needle: `rare1`/`rare2` are normalized
/// (lowercased) for case-insensitive searches and raw otherwise, with
/// `off1 <= off2`. A single-byte needle collapses both slots onto offset 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RarePair {
    pub rare1: u8,
    pub off1: usize,
    pub rare2: u8,
    pub off2: usize,
}

fn rank_table(ranks: Option<&RankTable>, case_sensitive: bool) -> [u16; 256] {
    match (ranks, case_sensitive) {
        (None, true) => widen(&BYTE_RANK),
        (None, false) => CASE_FOLD_RANK,
        (Some(t), true) => t.direct(),
        (Some(t), false) => t.folded(),
    }
}

#[inline]
fn norm(b: u8, case_sensitive: bool) -> u8 {
    if case_sensitive {
        b
    } else {
        to_lower(b)
    }
}

/// Full O(n) scan for the two rarest distinct bytes.
///
/// Case-sensitive selection with the default table short-circuits to the
/// first/last-byte spread strategy: for short arbitrary patterns the static
/// table carries little signal, and maximal spread keeps adjacent bytes from
/// defeating the two-byte filter on periodic inputs.
pub(crate) fn select_full(
    pattern: &[u8],
    ranks: Option<&RankTable>,
    case_sensitive: bool,
) -> RarePair {
    let n = pattern.len();
    debug_assert!(n > 0);

    let table = rank_table(ranks, case_sensitive);

    if n == 1 {
        let b = norm(pattern[0], case_sensitive);
        return RarePair { rare1: b, off1: 0, rare2: b, off2: 0 };
    }

    if case_sensitive && ranks.is_none() {
        let first = pattern[0];
        let last = pattern[n - 1];
        let off2 = if n > 2 && first == last { n / 2 } else { n - 1 };
        return RarePair { rare1: first, off1: 0, rare2: pattern[off2], off2 };
    }

    let mut best1 = norm(pattern[0], case_sensitive);
    let mut best1_off = 0usize;
    let mut best1_rank = table[best1 as usize];
    let mut best2 = 0u8;
    let mut best2_off: Option<usize> = None;
    let mut best2_rank = u16::MAX;

    for (i, &raw) in pattern.iter().enumerate().skip(1) {
        let c = norm(raw, case_sensitive);
        let r = table[c as usize];
        if r < best1_rank {
            // New rarest; the old best demotes to second place when distinct.
            if c != best1 {
                best2 = best1;
                best2_off = Some(best1_off);
                best2_rank = best1_rank;
            }
            best1 = c;
            best1_off = i;
            best1_rank = r;
        } else if c != best1 && r < best2_rank {
            best2 = c;
            best2_off = Some(i);
            best2_rank = r;
        }
    }

    let Some(best2_off) = best2_off else {
        // Every byte normalizes to the same value; spread first/last.
        return RarePair {
            rare1: norm(pattern[0], case_sensitive),
            off1: 0,
            rare2: norm(pattern[n - 1], case_sensitive),
            off2: n - 1,
        };
    };

    ordered(best1, best1_off, best2, best2_off)
}

/// O(1) selection over eight evenly spaced sample positions
/// (`0, n/8, 2n/8, .., 6n/8, n-1`).
pub(crate) fn select_sampled(
    pattern: &[u8],
    ranks: Option<&RankTable>,
    case_sensitive: bool,
) -> RarePair {
    let n = pattern.len();
    debug_assert!(n > 0);

    let table = rank_table(ranks, case_sensitive);

    if n == 1 {
        let b = norm(pattern[0], case_sensitive);
        return RarePair { rare1: b, off1: 0, rare2: b, off2: 0 };
    }

    let positions = [
        0,
        n / 8,
        (2 * n) / 8,
        (3 * n) / 8,
        (4 * n) / 8,
        (5 * n) / 8,
        (6 * n) / 8,
        n - 1,
    ];

    let mut best1_idx = 0usize;
    let mut best1_rank = table[norm(pattern[positions[0]], case_sensitive) as usize];
    let mut best2_idx: Option<usize> = None;
    let mut best2_rank = u16::MAX;

    for (i, &p) in positions.iter().enumerate().skip(1) {
        let c = norm(pattern[p], case_sensitive);
        let r = table[c as usize];
        let best1 = norm(pattern[positions[best1_idx]], case_sensitive);
        if r < best1_rank {
            if best1 != c {
                best2_idx = Some(best1_idx);
                best2_rank = best1_rank;
            }
            best1_idx = i;
            best1_rank = r;
        } else if c != best1 && r < best2_rank {
            best2_idx = Some(i);
            best2_rank = r;
        }
    }

    let Some(best2_idx) = best2_idx else {
        return RarePair {
            rare1: norm(pattern[0], case_sensitive),
            off1: 0,
            rare2: norm(pattern[n - 1], case_sensitive),
            off2: n - 1,
        };
    };

    let off1 = positions[best1_idx];
    let off2 = positions[best2_idx];
    let rare1 = norm(pattern[off1], case_sensitive);
    let rare2 = norm(pattern[off2], case_sensitive);
    ordered(rare1, off1, rare2, off2)
}

fn ordered(b1: u8, o1: usize, b2: u8, o2: usize) -> RarePair {
    if o1 <= o2 {
        RarePair { rare1: b1, off1: o1, rare2: b2, off2: o2 }
    } else {
        RarePair { rare1: b2, off1: o2, rare2: b1, off2: o1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scan_picks_distinct_rarest() {
        // 'q' and 'z' are the rarest letters in the default table.
        let pair = select_full(b"quartz", None, false);
        let picked = [pair.rare1, pair.rare2];
        assert!(picked.contains(&b'q'));
        assert!(picked.contains(&b'z'));
        assert!(pair.off1 <= pair.off2);
    }

    #[test]
    fn full_scan_same_byte_fallback() {
        let pair = select_full(b"aaaa", None, false);
        assert_eq!((pair.off1, pair.off2), (0, 3));
        assert_eq!((pair.rare1, pair.rare2), (b'a', b'a'));
    }

    #[test]
    fn case_sensitive_default_uses_spread() {
        let pair = select_full(b"abcdef", None, true);
        assert_eq!((pair.off1, pair.off2), (0, 5));
        assert_eq!((pair.rare1, pair.rare2), (b'a', b'f'));

        // first == last moves the second offset to the middle
        let pair = select_full(b"xabcx", None, true);
        assert_eq!((pair.off1, pair.off2), (0, 2));
    }

    #[test]
    fn sampled_offsets_ordered_and_normalized() {
        let pair = select_sampled(b"The Quick Brown Fox", None, false);
        assert!(pair.off1 <= pair.off2);
        assert!(pair.rare1.is_ascii_lowercase() || !pair.rare1.is_ascii_alphabetic());
        assert_ne!(pair.rare1, pair.rare2);
    }

    #[test]
    fn single_byte_needle_collapses() {
        let pair = select_sampled(b"Q", None, false);
        assert_eq!((pair.rare1, pair.off1, pair.rare2, pair.off2), (b'q', 0, b'q', 0));
    }

    #[test]
    fn custom_ranks_redirect_selection() {
        // A table where 'e' is the rarest byte flips the usual choice.
        let mut ranks = [200u8; 256];
        ranks[b'E' as usize] = 0;
        ranks[b'e' as usize] = 0;
        let table = RankTable::from_array(ranks);
        let pair = select_full(b"excellent", Some(&table), false);
        assert_eq!(pair.rare1, b'e');
    }
}
