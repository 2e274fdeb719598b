//! Boolean multi-needle engine vs. a recursive naive evaluator.

use proptest::prelude::*;

use bytesearch::{BoolExpr, BooleanSearch};

fn contains_fold_naive(hay: &[u8], needle: &[u8]) -> bool {
    if needle.len() > hay.len() {
        return false;
    }
    (0..=hay.len() - needle.len()).any(|i| {
        hay[i..i + needle.len()]
            .iter()
            .zip(needle.iter())
            .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
    })
}

fn contains_naive(hay: &[u8], needle: &[u8]) -> bool {
    needle.len() <= hay.len() && hay.windows(needle.len()).any(|w| w == needle)
}

fn reference(expr: &BoolExpr, hay: &[u8]) -> bool {
    match expr {
        BoolExpr::Contains { pattern, case_sensitive } => {
            if *case_sensitive {
                contains_naive(hay, pattern)
            } else {
                contains_fold_naive(hay, pattern)
            }
        }
        BoolExpr::And(l, r) => reference(l, hay) && reference(r, hay),
        BoolExpr::Or(l, r) => reference(l, hay) || reference(r, hay),
        BoolExpr::Not(c) => !reference(c, hay),
    }
}

/// Patterns over a tiny alphabet so random haystacks actually contain them.
fn pattern() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(proptest::sample::select(b"abAB9".to_vec()), 1..6)
}

fn leaf() -> impl Strategy<Value = BoolExpr> {
    (pattern(), any::<bool>()).prop_map(|(p, cs)| {
        if cs {
            BoolExpr::contains_cs(p)
        } else {
            BoolExpr::contains(p)
        }
    })
}

fn expr() -> impl Strategy<Value = BoolExpr> {
    leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| BoolExpr::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| BoolExpr::or(l, r)),
            inner.prop_map(BoolExpr::not),
        ]
    })
}

fn haystack() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(proptest::sample::select(b"abAB9xy ".to_vec()), 0..300)
}

proptest! {
    #[test]
    fn matches_equals_naive_evaluator(e in expr(), hay in haystack()) {
        let bs = BooleanSearch::compile(&e).unwrap();
        prop_assert_eq!(bs.matches(&hay), reference(&e, &hay));
    }

    #[test]
    fn many_patterns_equal_naive(
        pats in proptest::collection::vec(pattern(), 9..20),
        hay in haystack(),
    ) {
        // A wide OR forces the FDR engine.
        let mut e = BoolExpr::contains(pats[0].clone());
        for p in &pats[1..] {
            e = BoolExpr::or(e, BoolExpr::contains(p.clone()));
        }
        let bs = BooleanSearch::compile(&e).unwrap();
        prop_assert_eq!(bs.matches(&hay), reference(&e, &hay));
    }

    #[test]
    fn flood_haystacks_equal_naive(
        e in expr(),
        byte in proptest::sample::select(b"aAbB9".to_vec()),
        len in 64usize..600,
    ) {
        let hay = vec![byte; len];
        let bs = BooleanSearch::compile(&e).unwrap();
        prop_assert_eq!(bs.matches(&hay), reference(&e, &hay));
    }
}
