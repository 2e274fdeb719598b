//! Direct TBL engine for one to eight patterns.
//!
//! Two sixteen-entry nibble tables encode, in inverted polarity, which
//! patterns could begin with a byte whose low/high nibble equals the table
//! index. A position's candidate set is `!(lo[c & 0xF] | hi[c >> 4])`,
//! computed sixteen bytes at a time with a byte-shuffle lookup; every
//! surviving bit is confirmed by the verification tables.

use super::{Pattern, ScanContext};
use crate::simd;

pub(crate) struct TblEngine {
    masks_lo: [u8; 16],
    masks_hi: [u8; 16],
}

impl TblEngine {
    pub(crate) fn build(patterns: &[Pattern]) -> Self {
        debug_assert!(patterns.len() <= 8);
        let mut masks_lo = [0xFFu8; 16];
        let mut masks_hi = [0xFFu8; 16];

        for (id, p) in patterns.iter().enumerate() {
            let bit = 1u8 << id;
            let c = p.text[0];
            if !p.case_sensitive && c.is_ascii_alphabetic() {
                for variant in [c & !0x20, c | 0x20] {
                    masks_lo[(variant & 0x0F) as usize] &= !bit;
                    masks_hi[(variant >> 4) as usize] &= !bit;
                }
            } else {
                masks_lo[(c & 0x0F) as usize] &= !bit;
                masks_hi[(c >> 4) as usize] &= !bit;
            }
        }

        Self { masks_lo, masks_hi }
    }

    /// Scans `hay`, returning the updated found mask. Exits early when a
    /// discovery lands in an immediate mask or every pattern is found.
    pub(crate) fn scan(&self, hay: &[u8], mut found: u64, ctx: &ScanContext<'_>) -> u64 {
        let n = hay.len();
        if n < ctx.min_len {
            return found;
        }

        let mut pos = 0usize;
        let mut block = [0u8; 16];

        while pos + 16 <= n {
            simd::nibble_classify16(&hay[pos..], &self.masks_lo, &self.masks_hi, &mut block);
            for (j, &cand_byte) in block.iter().enumerate() {
                let mut candidates = cand_byte & !(found as u8);
                while candidates != 0 {
                    let pid = candidates.trailing_zeros() as u8;
                    candidates &= candidates - 1;
                    // Out-of-range starts fail the verifier's bounds check.
                    if ctx.verify.check(hay, pos + j, pid, ctx.patterns) {
                        found |= 1u64 << pid;
                        if found & ctx.immediate != 0 || found == ctx.all_mask {
                            return found;
                        }
                    }
                }
            }
            pos += 16;
        }

        while pos + ctx.min_len <= n {
            let c = hay[pos];
            let classified =
                !(self.masks_lo[(c & 0x0F) as usize] | self.masks_hi[(c >> 4) as usize]);
            let mut candidates = classified & !(found as u8);
            while candidates != 0 {
                let pid = candidates.trailing_zeros() as u8;
                candidates &= candidates - 1;
                if ctx.verify.check(hay, pos, pid, ctx.patterns) {
                    found |= 1u64 << pid;
                    if found & ctx.immediate != 0 || found == ctx.all_mask {
                        return found;
                    }
                }
            }
            pos += 1;
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::verify::VerifyTables;

    fn pat(text: &[u8], case_sensitive: bool) -> Pattern {
        Pattern {
            text: text.to_vec(),
            norm: text.iter().map(|b| b.to_ascii_uppercase()).collect(),
            case_sensitive,
        }
    }

    fn scan_all(patterns: &[Pattern], hay: &[u8]) -> u64 {
        let engine = TblEngine::build(patterns);
        let verify = VerifyTables::build(patterns);
        let ctx = ScanContext {
            verify: &verify,
            patterns,
            immediate: 0,
            min_len: patterns.iter().map(|p| p.text.len()).min().unwrap(),
            all_mask: (1u64 << patterns.len()) - 1,
        };
        engine.scan(hay, 0, &ctx)
    }

    #[test]
    fn finds_each_pattern() {
        let patterns = vec![
            pat(b"alpha", false),
            pat(b"beta", false),
            pat(b"Gamma", true),
        ];
        let found = scan_all(&patterns, b"xx ALPHA yy Gamma zz");
        assert_eq!(found, 0b101);
        let found = scan_all(&patterns, b"beta gamma");
        assert_eq!(found, 0b010);
    }

    #[test]
    fn nibble_collisions_are_verified_away() {
        // 'a' (0x61) and 'q' (0x71) share a low nibble; the hi-nibble table
        // and verification must keep them apart.
        let patterns = vec![pat(b"aXa", false), pat(b"qXq", false)];
        let found = scan_all(&patterns, b"___qxq___");
        assert_eq!(found, 0b10);
    }

    #[test]
    fn match_straddling_block_boundary() {
        let patterns = vec![pat(b"straddle", false)];
        let mut hay = vec![b'.'; 12];
        hay.extend_from_slice(b"STRADDLE");
        hay.extend_from_slice(&[b'.'; 4]);
        assert_eq!(scan_all(&patterns, &hay), 1);
    }

    #[test]
    fn match_in_scalar_tail() {
        let patterns = vec![pat(b"zz", false)];
        let mut hay = vec![b'-'; 17];
        hay.extend_from_slice(b"zz");
        assert_eq!(scan_all(&patterns, &hay), 1);
    }

    #[test]
    fn early_exit_on_immediate() {
        let patterns = vec![pat(b"hit", false), pat(b"other", false)];
        let engine = TblEngine::build(&patterns);
        let verify = VerifyTables::build(&patterns);
        let ctx = ScanContext {
            verify: &verify,
            patterns: &patterns,
            immediate: 0b01,
            min_len: 3,
            all_mask: 0b11,
        };
        // "other" appears after "hit"; the immediate exit must fire first.
        let found = engine.scan(b"xx hit xx other xx", 0, &ctx);
        assert_eq!(found, 0b01);
    }
}
