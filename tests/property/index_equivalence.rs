//! Single-needle search vs. naive references.

use proptest::prelude::*;

use bytesearch::{index, index_fold, Needle, Searcher};

fn equal_fold_naive(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
}

fn index_fold_reference(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| equal_fold_naive(&hay[i..i + needle.len()], needle))
}

fn index_reference(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

/// Bytes drawn from a small alphabet so collisions and matches are common.
fn dense_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        proptest::sample::select(b"aAbBqQzZ \"01\x80\xC3".to_vec()),
        0..max_len,
    )
}

proptest! {
    #[test]
    fn fold_matches_reference_on_random_bytes(
        hay in proptest::collection::vec(any::<u8>(), 0..400),
        needle in proptest::collection::vec(any::<u8>(), 0..12),
    ) {
        prop_assert_eq!(index_fold(&hay, &needle), index_fold_reference(&hay, &needle));
    }

    #[test]
    fn exact_matches_reference_on_random_bytes(
        hay in proptest::collection::vec(any::<u8>(), 0..400),
        needle in proptest::collection::vec(any::<u8>(), 0..12),
    ) {
        prop_assert_eq!(index(&hay, &needle), index_reference(&hay, &needle));
    }

    #[test]
    fn fold_matches_reference_on_dense_alphabet(
        hay in dense_bytes(600),
        needle in dense_bytes(8),
    ) {
        prop_assert_eq!(index_fold(&hay, &needle), index_fold_reference(&hay, &needle));
    }

    #[test]
    fn planted_needle_is_found(
        prefix in dense_bytes(300),
        suffix in dense_bytes(300),
        needle in proptest::collection::vec(any::<u8>(), 1..24),
    ) {
        let mut hay = prefix.clone();
        hay.extend_from_slice(&needle);
        hay.extend_from_slice(&suffix);

        let got = index(&hay, &needle);
        prop_assert_eq!(got, index_reference(&hay, &needle));
        // A planted needle guarantees at least one occurrence.
        prop_assert!(got.is_some());
        prop_assert!(got.unwrap() <= prefix.len());

        prop_assert_eq!(index_fold(&hay, &needle), index_fold_reference(&hay, &needle));
    }

    #[test]
    fn searcher_agrees_with_one_shot(
        hays in proptest::collection::vec(dense_bytes(200), 1..6),
        needle in dense_bytes(10),
    ) {
        let ci = Searcher::new(&needle, false);
        let cs = Searcher::new(&needle, true);
        let nd = Needle::new(&needle);
        for hay in &hays {
            prop_assert_eq!(ci.find(hay), index_fold(hay, &needle));
            prop_assert_eq!(cs.find(hay), index(hay, &needle));
            prop_assert_eq!(nd.find(hay), index_fold(hay, &needle));
            prop_assert_eq!(nd.find_exact(hay), index(hay, &needle));
        }
    }

    #[test]
    fn prefix_suffix_derivations(
        s in dense_bytes(60),
        p in dense_bytes(12),
    ) {
        let want_prefix = s.len() >= p.len() && equal_fold_naive(&s[..p.len()], &p);
        prop_assert_eq!(bytesearch::has_prefix_fold(&s, &p), want_prefix);
        let want_suffix = s.len() >= p.len() && equal_fold_naive(&s[s.len() - p.len()..], &p);
        prop_assert_eq!(bytesearch::has_suffix_fold(&s, &p), want_suffix);
    }
}
