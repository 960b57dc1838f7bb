pub use crate::errors::{
    ErrorCategory, ErrorKind, ErrorReporting, ExpandError, ReportContext, SourceContext,
};
pub use crate::expansion::{Expander, ExpanderConfig};

pub mod errors;
pub mod expansion;
pub mod model;
pub mod variables;
