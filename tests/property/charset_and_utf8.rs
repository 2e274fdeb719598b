//! Charset scans and UTF-8 validation vs. straightforward references.

use proptest::prelude::*;

use bytesearch::{index_any, utf8, CharSet};

proptest! {
    #[test]
    fn index_any_is_minimal_member(
        hay in proptest::collection::vec(any::<u8>(), 0..300),
        chars in proptest::collection::vec(any::<u8>(), 0..12),
    ) {
        let set: std::collections::HashSet<u8> = chars.iter().copied().collect();
        let want = if set.is_empty() {
            None
        } else {
            hay.iter().position(|b| set.contains(b))
        };
        prop_assert_eq!(index_any(&hay, &chars), want);
    }

    #[test]
    fn charset_roundtrip(
        hay in proptest::collection::vec(any::<u8>(), 0..300),
        chars in proptest::collection::vec(any::<u8>(), 0..12),
    ) {
        prop_assert_eq!(CharSet::new(&chars).index_in(&hay), index_any(&hay, &chars));
    }

    #[test]
    fn utf8_matches_std(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        prop_assert_eq!(utf8::is_valid(&bytes), std::str::from_utf8(&bytes).is_ok());
    }

    #[test]
    fn utf8_accepts_all_valid_strings(s in ".{0,40}") {
        prop_assert!(utf8::is_valid(s.as_bytes()));
    }

    #[test]
    fn utf8_mutated_strings_match_std(
        s in "[\\PC]{0,30}",
        flip in any::<(u8, u8)>(),
    ) {
        let mut bytes = s.into_bytes();
        if !bytes.is_empty() {
            let idx = flip.0 as usize % bytes.len();
            bytes[idx] ^= flip.1;
        }
        prop_assert_eq!(utf8::is_valid(&bytes), std::str::from_utf8(&bytes).is_ok());
    }
}
