//! # Example Expansion
//!
//! The expansion engine: parse a template's `Examples:` pseudo-call into a
//! table, select which rows to use, and clone the template once per selected
//! row with example values substituted throughout.
//!
//! Module layering, leaf-first: `table` (argument list -> records), `select`
//! (selection policy over records), `clone` (per-row template rebuild),
//! `expander` (suite orchestration driving the others).

mod clone;
mod expander;
mod select;
mod table;

pub use clone::{clone_case, ClonedCase};
pub use expander::{Expander, ExpanderConfig};
pub use select::{select_rows, RandomSpec, SelectionPolicy};
pub use table::{build_table, ExampleTable, Record, SENTINEL};

use crate::model::KeywordCall;

/// Reserved name of the table pseudo-call. The keyword is never executed: it
/// is scanned for, consumed, and removed during expansion.
pub const EXAMPLES_KEYWORD: &str = "Examples:";

/// The single predicate deciding whether a keyword call is the table
/// pseudo-call. Matching is case-insensitive.
pub fn is_examples_call(kw: &KeywordCall) -> bool {
    kw.name.eq_ignore_ascii_case(EXAMPLES_KEYWORD)
}
