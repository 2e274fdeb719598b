//! Property-based equivalence tests.
//!
//! Every engine is checked against a naive reference implementation over
//! randomized inputs, with generators biased toward small alphabets and
//! planted matches so the interesting paths actually fire.
//!
//! Run with: `cargo test --test property`

mod boolean_equivalence;
mod charset_and_utf8;
mod index_equivalence;
