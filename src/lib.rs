// src/lib.rs
//! Semantic analysis core for the Janus compiler front end.
//!
//! Turns a parsed syntax tree into a validated, fully-typed compilation
//! unit: symbol resolution with shadowing and visibility, a canonical
//! interned type representation, constraint-based type inference, and
//! profile-gated semantic validation, all reporting through one
//! diagnostic sink.
//!
//! Parsing, lowering, and the surrounding driver are external
//! collaborators; this crate consumes an already-built tree through the
//! accessors in [`ast`] and never performs I/O.

pub mod ast;
pub mod errors;
pub mod intern;
pub mod sema;
pub mod span;

pub use ast::{NodeId, NodeKind, SyntaxTree};
pub use errors::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity, Suggestion};
pub use intern::{Interner, Symbol};
pub use sema::{
    Analyzer, Constraint, Feature, InferVarId, InferenceEngine, Profile, ScopeId, ScopeKind,
    SemanticValidator, SymbolId, SymbolKind, SymbolTable, TypeArena, TypeId, Visibility,
};
pub use span::Span;
