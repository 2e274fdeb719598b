//! FDR-style hashed engine for nine to sixty-four patterns.
//!
//! A power-of-two state table is indexed by the low bits of a 4-byte
//! haystack window; each entry is an inverted-polarity 64-bit pattern mask.
//! The domain grows with pattern count (10 bits for up to 16 patterns, 13
//! for up to 64) to hold collisions down.
//!
//! # Stride
//! When every pattern is long enough, the scanner advances several bytes per
//! window. Soundness argument: windows start at multiples of `stride`, so a
//! match starting at `q` is covered by the aligned window at
//! `p = ceil(q / stride) * stride <= q + stride - 1`; that window lies fully
//! inside the match iff `p + 4 <= q + len`, which `len >= stride + 3`
//! guarantees. The table is therefore populated with the pattern's interior
//! 4-byte windows at offsets `0..stride`, and a candidate at `p` is verified
//! at each start `p - s`. Stride 4 requires `min_len >= 7`, stride 2
//! requires `min_len >= 5`; patterns shorter than 4 force stride 1 plus a
//! 3-byte tail sweep.
//!
//! # Coarse TBL prefilter
//! Patterns are partitioned into eight groups (`id % 8`). Two nibble tables
//! over the window's first byte yield an 8-bit group mask, expanded to a
//! 64-bit pattern mask through a 256-entry LUT; this skips the state-table
//! load for most windows.

use super::{Pattern, ScanContext};

pub(crate) struct FdrEngine {
    domain_mask: u32,
    stride: usize,
    state: Vec<u64>,
    coarse_lo: [u8; 16],
    coarse_hi: [u8; 16],
    group_lut: [u64; 256],
}

impl FdrEngine {
    pub(crate) fn build(patterns: &[Pattern], min_len: usize) -> Self {
        debug_assert!(patterns.len() > 8 && patterns.len() <= 64);

        let domain_bits: u32 = match patterns.len() {
            0..=16 => 10,
            17..=32 => 11,
            33..=48 => 12,
            _ => 13,
        };
        let domain_mask = (1u32 << domain_bits) - 1;
        let stride = if min_len >= 7 {
            4
        } else if min_len >= 5 {
            2
        } else {
            1
        };

        let mut state = vec![u64::MAX; 1usize << domain_bits];
        for (id, p) in patterns.iter().enumerate() {
            let bit = 1u64 << id;
            for s in 0..stride {
                populate_window(&mut state, domain_bits, domain_mask, p, s, bit);
            }
        }

        let mut coarse_lo = [0xFFu8; 16];
        let mut coarse_hi = [0xFFu8; 16];
        let mut group_masks = [0u64; 8];
        for (id, p) in patterns.iter().enumerate() {
            let group = id % 8;
            let gbit = 1u8 << group;
            group_masks[group] |= 1u64 << id;

            // A window at shift `s` starts with pattern byte `s`; admit its
            // nibbles (both cases when folding).
            for s in 0..stride.min(p.text.len()) {
                let c = p.text[s];
                if !p.case_sensitive && c.is_ascii_alphabetic() {
                    for v in [c & !0x20, c | 0x20] {
                        coarse_lo[(v & 0x0F) as usize] &= !gbit;
                        coarse_hi[(v >> 4) as usize] &= !gbit;
                    }
                } else {
                    coarse_lo[(c & 0x0F) as usize] &= !gbit;
                    coarse_hi[(c >> 4) as usize] &= !gbit;
                }
            }
        }

        let mut group_lut = [0u64; 256];
        for (m, entry) in group_lut.iter_mut().enumerate() {
            let mut mask = 0u64;
            for (g, &gm) in group_masks.iter().enumerate() {
                if m & (1 << g) != 0 {
                    mask |= gm;
                }
            }
            *entry = mask;
        }

        Self { domain_mask, stride, state, coarse_lo, coarse_hi, group_lut }
    }

    /// Scans `hay`, returning the updated found mask; exits early on
    /// immediate-mask discoveries or once every pattern is found.
    pub(crate) fn scan(&self, hay: &[u8], mut found: u64, ctx: &ScanContext<'_>) -> u64 {
        let n = hay.len();
        if n < ctx.min_len {
            return found;
        }
        if n < 4 {
            return self.verify_sweep(hay, 0, found, ctx);
        }

        let mut pos = 0usize;
        while pos + 4 <= n {
            let c = hay[pos];
            let coarse =
                !(self.coarse_lo[(c & 0x0F) as usize] | self.coarse_hi[(c >> 4) as usize]);
            if coarse != 0 {
                let window = u32::from_le_bytes(hay[pos..pos + 4].try_into().unwrap());
                let hash = (window & self.domain_mask) as usize;
                let mut candidates = !self.state[hash] & self.group_lut[coarse as usize] & !found;
                while candidates != 0 {
                    let pid = candidates.trailing_zeros() as u8;
                    candidates &= candidates - 1;

                    // The window may sit at any interior offset of the
                    // match; try each covered start.
                    for s in 0..self.stride {
                        let Some(start) = pos.checked_sub(s) else { break };
                        if ctx.verify.check(hay, start, pid, ctx.patterns) {
                            found |= 1u64 << pid;
                            break;
                        }
                    }
                    if found & ctx.immediate != 0 || found == ctx.all_mask {
                        return found;
                    }
                }
            }
            pos += self.stride;
        }

        // Starts within the final three bytes have no covering window; they
        // only matter for sub-4-byte patterns (stride is 1 then).
        if ctx.min_len < 4 {
            found = self.verify_sweep(hay, n - 3, found, ctx);
        }
        found
    }

    /// Verifies every unfound pattern at every position from `from`.
    fn verify_sweep(&self, hay: &[u8], from: usize, mut found: u64, ctx: &ScanContext<'_>) -> u64 {
        let n = hay.len();
        for pos in from..=n - ctx.min_len {
            let mut remaining = ctx.all_mask & !found;
            while remaining != 0 {
                let pid = remaining.trailing_zeros() as u8;
                remaining &= remaining - 1;
                if ctx.verify.check(hay, pos, pid, ctx.patterns) {
                    found |= 1u64 << pid;
                    if found & ctx.immediate != 0 || found == ctx.all_mask {
                        return found;
                    }
                }
            }
        }
        found
    }
}

/// Clears the pattern's bit for every state-table slot its window at shift
/// `s` can hash to, expanding case variants and trailing don't-cares.
fn populate_window(
    state: &mut [u64],
    domain_bits: u32,
    domain_mask: u32,
    p: &Pattern,
    s: usize,
    bit: u64,
) {
    let avail = p.text.len().saturating_sub(s).min(4);
    debug_assert!(avail >= 1);

    let mut variants = [[0u8; 2]; 4];
    let mut counts = [1usize; 4];
    for i in 0..avail {
        let c = p.text[s + i];
        if !p.case_sensitive && c.is_ascii_alphabetic() {
            variants[i] = [c & !0x20, c | 0x20];
            counts[i] = 2;
        } else {
            variants[i] = [c, c];
        }
    }

    let known_bits = (8 * avail as u32).min(domain_bits);
    let free_bits = domain_bits - known_bits;
    let total: usize = counts[..avail].iter().product();

    for combo in 0..total {
        let mut rem = combo;
        let mut word = 0u32;
        for i in 0..avail {
            let v = variants[i][rem % counts[i]];
            rem /= counts[i];
            word |= u32::from(v) << (8 * i);
        }

        if free_bits == 0 {
            state[(word & domain_mask) as usize] &= !bit;
        } else {
            // Bytes past the pattern's end are don't-care; enumerate the
            // unconstrained high bits of the domain directly.
            let low = word & ((1u32 << known_bits) - 1);
            for high in 0..(1u32 << free_bits) {
                state[(low | (high << known_bits)) as usize] &= !bit;
            }
        }
    }
}
