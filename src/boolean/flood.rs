//! Flood detection: defense against same-byte-run haystacks.
//!
//! A haystack like `"aaaa..."` scanned for `"aab"` makes every position a
//! candidate and drives the scanner toward O(n*m) verification work. The
//! flood table records, per byte value, the patterns whose entire text folds
//! to that byte repeated; at search start three positions are sampled and
//! their runs measured, and any pattern whose length fits inside a measured
//! run is marked found up front. The scan itself is not short-circuited.

use super::Pattern;

/// Longest run worth measuring; no pattern mask benefits beyond this.
const MAX_RUN: usize = 256;

#[derive(Clone, Debug, Default)]
struct FloodEntry {
    pattern_ids: Vec<u8>,
    min_len: usize,
}

pub(crate) struct FloodTable {
    entries: Vec<FloodEntry>,
}

impl FloodTable {
    pub(crate) fn build(patterns: &[Pattern]) -> Self {
        let mut entries = vec![FloodEntry::default(); 256];
        for (c, entry) in entries.iter_mut().enumerate() {
            for (id, p) in patterns.iter().enumerate() {
                if matches_flood(p, c as u8) {
                    entry.pattern_ids.push(id as u8);
                    if entry.min_len == 0 || p.text.len() < entry.min_len {
                        entry.min_len = p.text.len();
                    }
                }
            }
        }
        Self { entries }
    }

    /// Samples the start, middle, and end of `hay`; returns the mask of
    /// patterns satisfied by a measured run. Caller ensures `hay.len() >= 1`.
    pub(crate) fn check(&self, hay: &[u8], patterns: &[Pattern]) -> u64 {
        let n = hay.len();
        let mut found = 0u64;

        for pos in [0, n / 2, n - 1] {
            let c = hay[pos];
            let entry = &self.entries[c as usize];
            if entry.pattern_ids.is_empty() {
                continue;
            }

            let mut run = 1usize;
            let mut i = pos + 1;
            while i < n && hay[i] == c && run < MAX_RUN {
                run += 1;
                i += 1;
            }
            let mut j = pos;
            while j > 0 && hay[j - 1] == c && run < MAX_RUN {
                run += 1;
                j -= 1;
            }

            if run >= entry.min_len {
                for &pid in &entry.pattern_ids {
                    if patterns[pid as usize].text.len() <= run {
                        found |= 1u64 << pid;
                    }
                }
            }
        }

        found
    }
}

/// Whether a run of `flood_byte` would contain the pattern: every pattern
/// byte must equal it (case-insensitively unless the pattern is exact).
fn matches_flood(p: &Pattern, flood_byte: u8) -> bool {
    p.text.iter().all(|&c| {
        if p.case_sensitive {
            c == flood_byte
        } else {
            c.eq_ignore_ascii_case(&flood_byte)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(text: &[u8], case_sensitive: bool) -> Pattern {
        Pattern {
            text: text.to_vec(),
            norm: text.iter().map(|b| b.to_ascii_uppercase()).collect(),
            case_sensitive,
        }
    }

    #[test]
    fn single_symbol_patterns_found_in_flood() {
        let patterns = vec![pat(b"aaaa", false), pat(b"aab", false), pat(b"BBBB", true)];
        let table = FloodTable::build(&patterns);

        let hay = vec![b'A'; 128];
        // Pattern 0 folds to a run of a's; pattern 1 mixes bytes and must
        // not be marked; pattern 2 is case-sensitive and does not match 'A'.
        assert_eq!(table.check(&hay, &patterns), 1);

        let hay = vec![b'B'; 128];
        assert_eq!(table.check(&hay, &patterns), 1 << 2);
    }

    #[test]
    fn short_run_does_not_satisfy() {
        let patterns = vec![pat(b"aaaaaaaa", false)];
        let table = FloodTable::build(&patterns);
        let mut hay = vec![b'x'; 64];
        hay.splice(30..30, std::iter::repeat(b'a').take(4));
        assert_eq!(table.check(&hay, &patterns), 0);
    }

    #[test]
    fn run_measured_around_sample_point() {
        let patterns = vec![pat(b"zzzz", false)];
        let table = FloodTable::build(&patterns);
        // Run crosses the middle sample position.
        let mut hay = vec![b'-'; 200];
        for b in hay.iter_mut().skip(90).take(20) {
            *b = b'z';
        }
        assert_eq!(table.check(&hay, &patterns), 1);
    }
}
