// src/errors/sema.rs
//! Semantic analysis errors (E2xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(E2001))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("undefined symbol '{name}'")]
    #[diagnostic(code(E2002))]
    UndefinedSymbol {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("'{name}' is already declared in this scope")]
    #[diagnostic(
        code(E2003),
        help("shadowing is allowed in a nested scope, not in the same one")
    )]
    DuplicateDeclaration {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
        #[label("first declared here")]
        previous: SourceSpan,
    },

    #[error("cannot infer a type for this expression")]
    #[diagnostic(code(E2004), help("add a type annotation to pin the type down"))]
    AmbiguousInference {
        #[label("type remains unknown")]
        span: SourceSpan,
    },

    #[error("feature '{feature}' is not available under profile '{profile}'")]
    #[diagnostic(code(E2005))]
    ProfileViolation {
        feature: String,
        profile: String,
        #[label("requires a higher profile")]
        span: SourceSpan,
    },

    #[error("'{name}' is used before it is assigned")]
    #[diagnostic(code(E2006), help("initialize the variable before its first use"))]
    UseBeforeDefinition {
        name: String,
        #[label("read here while still unassigned")]
        span: SourceSpan,
    },

    #[error("function '{name}' declares a return type but has no return statement")]
    #[diagnostic(code(E2007))]
    MissingReturn {
        name: String,
        #[label("no return path in this body")]
        span: SourceSpan,
    },

    #[error("cannot call non-function type '{ty}'")]
    #[diagnostic(code(E2008))]
    NotCallable {
        ty: String,
        #[label("not a function")]
        span: SourceSpan,
    },

    #[error("expected {expected} arguments, found {found}")]
    #[diagnostic(code(E2009))]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("cannot index into type '{ty}'")]
    #[diagnostic(code(E2010))]
    NotIndexable {
        ty: String,
        #[label("not an array")]
        span: SourceSpan,
    },

    #[error("type '{ty}' has no field '{field}'")]
    #[diagnostic(code(E2011))]
    UnknownField {
        ty: String,
        field: String,
        #[label("unknown field")]
        span: SourceSpan,
    },
}
