//! # Variables
//!
//! The layered variable store and the placeholder substitution engine.
//! `scope` owns the frame stack (open / bind / close around one table
//! expansion); `resolve` performs `${name}` substitution against it with a
//! structured best-effort fallback for unresolved names.

mod resolve;
mod scope;

pub use resolve::{resolve_list, resolve_scalar, ListResolution, Resolution};
pub use scope::{Value, Variables};
