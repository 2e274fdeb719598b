//! Boolean multi-needle search: `AND`/`OR`/`NOT`/`Contains` expressions over
//! up to 64 containment patterns, evaluated in a single haystack pass.
//!
//! # High-level algorithm
//! 1. **Compile**: collect `Contains` leaves, deduplicate by case-normalized
//!    text (per sensitivity mode), assign pattern IDs, and build the engine
//!    tables: a nibble-mask TBL scanner for up to eight patterns or an
//!    FDR-style hashed scanner for nine to sixty-four, plus verification,
//!    flood, and immediate-termination tables.
//! 2. **Scan**: walk the haystack block-at-a-time maintaining a 64-bit
//!    `found` mask of verified pattern IDs.
//! 3. **Evaluate**: three-valued logic over the expression. During the scan
//!    a pattern discovery whose bit is in an immediate mask settles the
//!    expression outright; otherwise the final evaluation converts
//!    `Unknown` to "not found".
//!
//! # Invariants
//! - Pattern IDs are dense in `[0, num_patterns)`, `num_patterns <= 64`.
//! - Patterns are non-empty; the compiler rejects empty ones.
//! - All engine tables use inverted polarity: a 0 bit means "could match",
//!   a 1 bit means "definitely not". Lookups from independent byte features
//!   OR together and invert once.
//!
//! # Module map
//! - `tbl`: direct nibble-mask engine (1-8 patterns).
//! - `fdr`: hashed-prefix engine (9-64 patterns).
//! - `verify`: packed 8-byte masked verification tables.
//! - `flood`: same-byte-run defense for adversarial inputs.

mod fdr;
mod flood;
mod tbl;
mod verify;

use std::error::Error;
use std::fmt;

use ahash::AHashMap;

use self::fdr::FdrEngine;
use self::flood::FloodTable;
use self::tbl::TblEngine;
use self::verify::VerifyTables;

/// A boolean expression over substring containment patterns.
///
/// Build leaves with [`BoolExpr::contains`] (case-insensitive) or
/// [`BoolExpr::contains_cs`] (case-sensitive) and combine freely; the tree
/// is compiled once into a [`BooleanSearch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoolExpr {
    /// Substring containment test.
    Contains { pattern: Vec<u8>, case_sensitive: bool },
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    Not(Box<BoolExpr>),
}

impl BoolExpr {
    /// Case-insensitive containment leaf.
    pub fn contains(pattern: impl AsRef<[u8]>) -> Self {
        BoolExpr::Contains { pattern: pattern.as_ref().to_vec(), case_sensitive: false }
    }

    /// Case-sensitive containment leaf.
    pub fn contains_cs(pattern: impl AsRef<[u8]>) -> Self {
        BoolExpr::Contains { pattern: pattern.as_ref().to_vec(), case_sensitive: true }
    }

    pub fn and(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: BoolExpr) -> Self {
        BoolExpr::Not(Box::new(child))
    }
}

/// Three-valued logic result used mid-scan, before all patterns are settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Truth {
    True,
    False,
    Unknown,
}

/// Expression with pattern IDs resolved; leaves index the compiled pattern
/// array instead of carrying text.
#[derive(Clone, Debug)]
enum CompiledExpr {
    Pattern(u8),
    And(Box<CompiledExpr>, Box<CompiledExpr>),
    Or(Box<CompiledExpr>, Box<CompiledExpr>),
    Not(Box<CompiledExpr>),
}

fn evaluate(expr: &CompiledExpr, found: u64, is_final: bool) -> Truth {
    match expr {
        CompiledExpr::Pattern(id) => {
            if found & (1u64 << id) != 0 {
                Truth::True
            } else if is_final {
                Truth::False
            } else {
                Truth::Unknown
            }
        }
        CompiledExpr::And(l, r) => {
            match (evaluate(l, found, is_final), evaluate(r, found, is_final)) {
                (Truth::False, _) | (_, Truth::False) => Truth::False,
                (Truth::True, Truth::True) => Truth::True,
                _ => Truth::Unknown,
            }
        }
        CompiledExpr::Or(l, r) => {
            match (evaluate(l, found, is_final), evaluate(r, found, is_final)) {
                (Truth::True, _) | (_, Truth::True) => Truth::True,
                (Truth::False, Truth::False) => Truth::False,
                _ => Truth::Unknown,
            }
        }
        CompiledExpr::Not(c) => match evaluate(c, found, is_final) {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        },
    }
}

/// One deduplicated containment pattern.
#[derive(Clone, Debug)]
pub(crate) struct Pattern {
    pub text: Vec<u8>,
    /// Uppercase-normalized copy, used for case-insensitive verification.
    pub norm: Vec<u8>,
    pub case_sensitive: bool,
}

/// Shared state the engines need while scanning.
pub(crate) struct ScanContext<'a> {
    pub verify: &'a VerifyTables,
    pub patterns: &'a [Pattern],
    /// Union of the immediate-true and immediate-false masks: any discovery
    /// in here settles the expression.
    pub immediate: u64,
    pub min_len: usize,
    pub all_mask: u64,
}

/// Errors from [`BooleanSearch::compile`].
#[derive(Debug)]
#[non_exhaustive]
pub enum CompileError {
    /// A `Contains` leaf held an empty pattern.
    EmptyPattern,
    /// More than 64 distinct patterns; the 64-bit mask contract caps the
    /// engine.
    TooManyPatterns { count: usize },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::EmptyPattern => write!(f, "boolean expression patterns cannot be empty"),
            CompileError::TooManyPatterns { count } => {
                write!(f, "boolean expression has {count}+ distinct patterns, limit is 64")
            }
        }
    }
}

impl Error for CompileError {}

enum Engine {
    Tbl(TblEngine),
    Fdr(FdrEngine),
}

/// A compiled boolean multi-needle matcher. Immutable after construction and
/// freely shareable; [`BooleanSearch::matches`] allocates nothing.
pub struct BooleanSearch {
    expr: CompiledExpr,
    patterns: Vec<Pattern>,
    min_len: usize,
    engine: Engine,
    verify: VerifyTables,
    flood: FloodTable,
    immediate_true: u64,
    immediate_false: u64,
}

impl BooleanSearch {
    /// Compiles an expression into its scan tables.
    pub fn compile(expr: &BoolExpr) -> Result<Self, CompileError> {
        let mut patterns = Vec::new();
        let mut ids: AHashMap<(Vec<u8>, bool), u8> = AHashMap::new();
        let compiled = compile_expr(expr, &mut patterns, &mut ids)?;

        let min_len = patterns.iter().map(|p: &Pattern| p.text.len()).min().unwrap_or(1);

        let engine = if patterns.len() <= 8 {
            Engine::Tbl(TblEngine::build(&patterns))
        } else {
            Engine::Fdr(FdrEngine::build(&patterns, min_len))
        };

        let verify = VerifyTables::build(&patterns);
        let flood = FloodTable::build(&patterns);

        // A pattern belongs in an immediate mask when discovering it alone,
        // with everything else still unknown, already settles the
        // expression: `A OR B` makes either immediately true, `NOT A` makes
        // A immediately false.
        let mut immediate_true = 0u64;
        let mut immediate_false = 0u64;
        for id in 0..patterns.len() as u8 {
            match evaluate(&compiled, 1u64 << id, false) {
                Truth::True => immediate_true |= 1u64 << id,
                Truth::False => immediate_false |= 1u64 << id,
                Truth::Unknown => {}
            }
        }

        Ok(Self {
            expr: compiled,
            patterns,
            min_len,
            engine,
            verify,
            flood,
            immediate_true,
            immediate_false,
        })
    }

    /// Number of distinct patterns in the compiled expression.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the expression holds over `hay`.
    pub fn matches(&self, hay: &[u8]) -> bool {
        let ctx = ScanContext {
            verify: &self.verify,
            patterns: &self.patterns,
            immediate: self.immediate_true | self.immediate_false,
            min_len: self.min_len,
            all_mask: all_mask(self.patterns.len()),
        };

        let mut found = 0u64;
        if hay.len() >= 64 {
            found = self.flood.check(hay, &self.patterns);
            if found & ctx.immediate != 0 {
                return evaluate(&self.expr, found, true) == Truth::True;
            }
        }

        found = match &self.engine {
            Engine::Tbl(t) => t.scan(hay, found, &ctx),
            Engine::Fdr(f) => f.scan(hay, found, &ctx),
        };

        evaluate(&self.expr, found, true) == Truth::True
    }
}

fn compile_expr(
    expr: &BoolExpr,
    patterns: &mut Vec<Pattern>,
    ids: &mut AHashMap<(Vec<u8>, bool), u8>,
) -> Result<CompiledExpr, CompileError> {
    match expr {
        BoolExpr::Contains { pattern, case_sensitive } => {
            if pattern.is_empty() {
                return Err(CompileError::EmptyPattern);
            }
            let norm: Vec<u8> = pattern.iter().map(|b| b.to_ascii_uppercase()).collect();
            let key = (norm.clone(), *case_sensitive);
            let id = match ids.get(&key) {
                Some(&id) => id,
                None => {
                    if patterns.len() == 64 {
                        return Err(CompileError::TooManyPatterns { count: 65 });
                    }
                    let id = patterns.len() as u8;
                    patterns.push(Pattern {
                        text: pattern.clone(),
                        norm,
                        case_sensitive: *case_sensitive,
                    });
                    ids.insert(key, id);
                    id
                }
            };
            Ok(CompiledExpr::Pattern(id))
        }
        BoolExpr::And(l, r) => Ok(CompiledExpr::And(
            Box::new(compile_expr(l, patterns, ids)?),
            Box::new(compile_expr(r, patterns, ids)?),
        )),
        BoolExpr::Or(l, r) => Ok(CompiledExpr::Or(
            Box::new(compile_expr(l, patterns, ids)?),
            Box::new(compile_expr(r, patterns, ids)?),
        )),
        BoolExpr::Not(c) => Ok(CompiledExpr::Not(Box::new(compile_expr(c, patterns, ids)?))),
    }
}

#[inline]
fn all_mask(num_patterns: usize) -> u64 {
    if num_patterns >= 64 {
        u64::MAX
    } else {
        (1u64 << num_patterns) - 1
    }
}
