// src/errors/mod.rs
//! Diagnostic manager: codes, structured errors, the shared sink, and
//! rendering helpers.

pub mod codes;
pub mod render;
pub mod sema;
pub mod sink;

pub use codes::{ErrorInfo, Severity};
pub use sema::SemanticError;
pub use sink::{Diagnostic, DiagnosticKind, DiagnosticSink, SinkStatistics, Suggestion};
