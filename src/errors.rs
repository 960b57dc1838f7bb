//! Exempla error handling - unified encapsulated API
//!
//! Every fatal failure in the crate is an [`ExpandError`]: a typed kind, the
//! source context it arose from, and diagnostic metadata. Errors are created
//! through the [`ErrorReporting`] trait so that each context (a template's
//! argument list, the configuration surface) attaches the right source and
//! span; `ExpandError` structs are never constructed manually outside this
//! module.
//!
//! Recovered conditions (unresolved substitution placeholders) are not errors
//! and never appear here; they travel as structured data on resolution
//! results and are logged by the orchestrator.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Error reporting infrastructure
// ============================================================================

/// Represents the text an error points into. For table errors this is the
/// raw positional argument list of the pseudo-call, rendered the way it was
/// authored (tokens separated by four spaces), named after the owning test
/// case so fatal errors always identify the offending test.
#[derive(Debug, Clone)]
pub struct SourceContext {
    pub name: String,
    pub content: String,
}

/// Separator used when rendering a raw argument list back into source text.
pub const ARG_SEPARATOR: &str = "    ";

impl SourceContext {
    /// Create a source context from a test case name and its raw argument list.
    pub fn from_args(test_name: impl Into<String>, args: &[String]) -> Self {
        Self {
            name: test_name.into(),
            content: args.join(ARG_SEPARATOR),
        }
    }

    /// Create a fallback when no argument text is in play (configuration
    /// errors, suite-level errors).
    pub fn fallback(context: &str) -> Self {
        Self {
            name: "expansion".to_string(),
            content: context.to_string(),
        }
    }

    /// Convert to NamedSource for use with miette error reporting.
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::new(NamedSource::new(self.name.clone(), self.content.clone()))
    }
}

impl Default for SourceContext {
    fn default() -> Self {
        Self::fallback("expansion context")
    }
}

/// The single error type - no wrapper, no variants, just essential data.
#[derive(Debug)]
pub struct ExpandError {
    /// What went wrong (type-specific data)
    pub kind: ErrorKind,
    /// Where it happened (context-specific source information)
    pub source_info: SourceInfo,
    /// How to help (auto-populated based on context)
    pub diagnostic_info: DiagnosticInfo,
}

/// All error kinds as a clean enum - no duplicate fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Table errors - the argument list does not form a table
    #[error("malformed example table: no `--` delimiter between headers and data")]
    MissingDelimiter,
    #[error("malformed example table: delimiter `--` appears before any header")]
    NoHeaders,
    #[error(
        "malformed example table: {value_count} data values do not divide \
         evenly into rows of {header_count}"
    )]
    RaggedData {
        header_count: usize,
        value_count: usize,
    },

    // Selection errors - the requested row selection is unsatisfiable
    #[error("invalid selection: example cap must not be negative (got {requested})")]
    NegativeCount { requested: i64 },
    #[error("invalid selection: `random` must be a boolean or an integer (got '{value}')")]
    InvalidRandomOption { value: String },

    // Trigger errors - an explicit expansion request found nothing to do
    #[error("no `Examples:` table found in suite '{suite}' or any of its child suites")]
    NoTableFound { suite: String },
}

/// Context-specific source information.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
    /// The name of the test case or surface the error originated from.
    pub origin: String,
}

/// Diagnostic enhancement data.
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// Context-aware error creation - each context knows how to create
/// appropriate errors.
pub trait ErrorReporting {
    /// Create an error with context-appropriate enhancements.
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ExpandError;

    fn missing_delimiter(&self, span: SourceSpan) -> ExpandError {
        let mut error = self.report(ErrorKind::MissingDelimiter, span);
        error.diagnostic_info.help = Some(
            "list the column headers first, then a literal `--`, then the row values".into(),
        );
        error
    }

    fn no_headers(&self, span: SourceSpan) -> ExpandError {
        self.report(ErrorKind::NoHeaders, span)
    }

    fn ragged_data(
        &self,
        header_count: usize,
        value_count: usize,
        span: SourceSpan,
    ) -> ExpandError {
        let mut error = self.report(
            ErrorKind::RaggedData {
                header_count,
                value_count,
            },
            span,
        );
        error.diagnostic_info.help = Some(format!(
            "each row needs exactly {header_count} values; remove the orphan \
             values or complete the final row"
        ));
        error
    }

    fn negative_count(&self, requested: i64, span: SourceSpan) -> ExpandError {
        self.report(ErrorKind::NegativeCount { requested }, span)
    }

    fn invalid_random_option(&self, value: &str, span: SourceSpan) -> ExpandError {
        self.report(
            ErrorKind::InvalidRandomOption {
                value: value.to_string(),
            },
            span,
        )
    }

    fn no_table_found(&self, suite: &str) -> ExpandError {
        let mut error = self.report(
            ErrorKind::NoTableFound {
                suite: suite.to_string(),
            },
            unspanned(),
        );
        error.diagnostic_info.help = Some(
            "an explicit expansion request requires at least one test case \
             with an `Examples:` call; the automatic path treats an empty \
             scope as a no-op"
                .into(),
        );
        error
    }
}

impl ErrorKind {
    /// Get the error category for test assertions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingDelimiter | Self::NoHeaders | Self::RaggedData { .. } => {
                ErrorCategory::MalformedTable
            }
            Self::NegativeCount { .. } | Self::InvalidRandomOption { .. } => {
                ErrorCategory::InvalidSelection
            }
            Self::NoTableFound { .. } => ErrorCategory::NoTableFound,
        }
    }

    /// Get error code suffix for diagnostic codes.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::MissingDelimiter => "missing_delimiter",
            Self::NoHeaders => "no_headers",
            Self::RaggedData { .. } => "ragged_data",
            Self::NegativeCount { .. } => "negative_count",
            Self::InvalidRandomOption { .. } => "invalid_random_option",
            Self::NoTableFound { .. } => "no_table_found",
        }
    }
}

/// Coarse classification matching the crate's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MalformedTable,
    InvalidSelection,
    NoTableFound,
}

impl std::error::Error for ExpandError {}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Diagnostic for ExpandError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

impl ExpandError {
    fn primary_label(&self) -> String {
        match &self.kind {
            ErrorKind::MissingDelimiter => "no `--` in this argument list".into(),
            ErrorKind::NoHeaders => "delimiter with no headers before it".into(),
            ErrorKind::RaggedData { .. } => "orphan values here".into(),
            ErrorKind::NegativeCount { .. } => "negative cap".into(),
            ErrorKind::InvalidRandomOption { .. } => "not a boolean or integer".into(),
            ErrorKind::NoTableFound { .. } => "nothing to expand".into(),
        }
    }
}

/// General-purpose error creation context, used wherever errors originate
/// from a known surface (a template's argument list, the configuration
/// options) rather than from ad hoc call sites.
pub struct ReportContext {
    pub source: SourceContext,
    pub origin: String,
}

impl ReportContext {
    pub fn new(source: SourceContext, origin: impl Into<String>) -> Self {
        Self {
            source,
            origin: origin.into(),
        }
    }

    /// Context for errors raised while processing one template test case.
    pub fn for_template(test_name: &str, args: &[String]) -> Self {
        Self::new(SourceContext::from_args(test_name, args), test_name)
    }

    /// Context for errors raised from the configuration surface.
    pub fn for_config() -> Self {
        Self::new(SourceContext::fallback("expander configuration"), "configuration")
    }
}

impl ErrorReporting for ReportContext {
    fn report(&self, kind: ErrorKind, span: SourceSpan) -> ExpandError {
        let error_code = format!("exempla::{}::{}", self.origin, kind.code_suffix());

        ExpandError {
            kind,
            source_info: SourceInfo {
                source: self.source.to_named_source(),
                primary_span: span,
                origin: self.origin.clone(),
            },
            diagnostic_info: DiagnosticInfo {
                help: None,
                error_code,
            },
        }
    }
}

/// Creates a placeholder span for errors not tied to a specific location in
/// the argument text. This makes the intent of using an empty span explicit
/// and searchable.
pub fn unspanned() -> SourceSpan {
    SourceSpan::from(0..0)
}
