//! Table builder: a flat positional argument list into ordered records.
//!
//! The wire contract is `H1 H2 ... Hn -- V1 V2 ... Vn*k`: every token before
//! the case-sensitive sentinel `--` is a column header, every token after it
//! is data, and the data must chunk exactly into rows of the header count.
//! A missing sentinel, a sentinel with no headers before it, or a ragged
//! trailing chunk is a hard failure; nothing is silently dropped.

use miette::SourceSpan;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorReporting, ExpandError, ARG_SEPARATOR};

/// The header/data delimiter token. Matched case-sensitively and exactly.
pub const SENTINEL: &str = "--";

/// One example row: an ordered header -> value mapping. Entry order is the
/// header order of the owning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    entries: Vec<(String, String)>,
}

impl Record {
    fn new(headers: &[String], values: &[String]) -> Self {
        Self {
            entries: headers
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed example table: column headers plus one record per data row, in
/// original left-to-right, row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleTable {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

/// Parse a flat argument list into an [`ExampleTable`].
pub fn build_table<R: ErrorReporting>(
    args: &[String],
    reporter: &R,
) -> Result<ExampleTable, ExpandError> {
    let Some(sentinel) = args.iter().position(|arg| arg == SENTINEL) else {
        return Err(reporter.missing_delimiter(span_of_tokens(args, 0, args.len())));
    };
    if sentinel == 0 {
        return Err(reporter.no_headers(span_of_tokens(args, 0, 1)));
    }

    let headers: Vec<String> = args[..sentinel].to_vec();
    let data = &args[sentinel + 1..];
    if data.len() % headers.len() != 0 {
        let complete = data.len() / headers.len() * headers.len();
        let first_orphan = sentinel + 1 + complete;
        return Err(reporter.ragged_data(
            headers.len(),
            data.len(),
            span_of_tokens(args, first_orphan, args.len() - first_orphan),
        ));
    }

    let records = data
        .chunks_exact(headers.len())
        .map(|row| Record::new(&headers, row))
        .collect();

    Ok(ExampleTable { headers, records })
}

// Span over a run of tokens within the argument list as rendered by
// `SourceContext::from_args` (tokens joined by the standard separator).
fn span_of_tokens(args: &[String], start: usize, count: usize) -> SourceSpan {
    let sep = ARG_SEPARATOR.len();
    let offset_of = |index: usize| -> usize {
        args[..index]
            .iter()
            .map(|arg| arg.len() + sep)
            .sum::<usize>()
    };
    let start_offset = offset_of(start);
    let end_offset = if count == 0 {
        start_offset
    } else {
        offset_of(start + count).saturating_sub(sep)
    };
    SourceSpan::from(start_offset..end_offset)
}
