// src/errors/sink.rs
//
// Shared diagnostic sink for all semantic analysis passes.
//
// Every component reports through one sink instance so that suppression,
// the error ceiling, and ordering are consistent across passes. The sink
// owns its diagnostics; they are never mutated after being pushed.

use super::codes::{self, ErrorInfo, Severity};
use super::sema::SemanticError;
use crate::span::Span;

/// Byte distance under which a diagnostic of the same kind counts as a
/// near-duplicate of an already-reported one
const SUPPRESSION_WINDOW: usize = 8;

/// Default ceiling before further reporting (and analysis) is halted
const DEFAULT_MAX_ERRORS: usize = 100;

/// Machine-readable tag for a diagnostic, matchable without string
/// comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    TypeMismatch,
    UndefinedSymbol,
    DuplicateDeclaration,
    AmbiguousInference,
    ProfileViolation,
    UseBeforeDefinition,
    MissingReturn,
    NotCallable,
    WrongArgumentCount,
    NotIndexable,
    UnknownField,
}

impl DiagnosticKind {
    fn for_error(error: &SemanticError) -> Self {
        match error {
            SemanticError::TypeMismatch { .. } => Self::TypeMismatch,
            SemanticError::UndefinedSymbol { .. } => Self::UndefinedSymbol,
            SemanticError::DuplicateDeclaration { .. } => Self::DuplicateDeclaration,
            SemanticError::AmbiguousInference { .. } => Self::AmbiguousInference,
            SemanticError::ProfileViolation { .. } => Self::ProfileViolation,
            SemanticError::UseBeforeDefinition { .. } => Self::UseBeforeDefinition,
            SemanticError::MissingReturn { .. } => Self::MissingReturn,
            SemanticError::NotCallable { .. } => Self::NotCallable,
            SemanticError::WrongArgumentCount { .. } => Self::WrongArgumentCount,
            SemanticError::NotIndexable { .. } => Self::NotIndexable,
            SemanticError::UnknownField { .. } => Self::UnknownField,
        }
    }

    /// Static metadata from the compiler-wide code registry
    pub fn info(self) -> &'static ErrorInfo {
        match self {
            Self::TypeMismatch => &codes::SEMA_TYPE_MISMATCH,
            Self::UndefinedSymbol => &codes::SEMA_UNDEFINED_SYMBOL,
            Self::DuplicateDeclaration => &codes::SEMA_DUPLICATE_DECLARATION,
            Self::AmbiguousInference => &codes::SEMA_AMBIGUOUS_INFERENCE,
            Self::ProfileViolation => &codes::SEMA_PROFILE_VIOLATION,
            Self::UseBeforeDefinition => &codes::SEMA_USE_BEFORE_DEFINITION,
            Self::MissingReturn => &codes::SEMA_MISSING_RETURN,
            Self::NotCallable => &codes::SEMA_NOT_CALLABLE,
            Self::WrongArgumentCount => &codes::SEMA_WRONG_ARGUMENT_COUNT,
            Self::NotIndexable => &codes::SEMA_NOT_INDEXABLE,
            Self::UnknownField => &codes::SEMA_UNKNOWN_FIELD,
        }
    }

    /// Stable wire code for this kind ("E2001", ...)
    pub fn code(self) -> &'static str {
        match self {
            Self::TypeMismatch => "E2001",
            Self::UndefinedSymbol => "E2002",
            Self::DuplicateDeclaration => "E2003",
            Self::AmbiguousInference => "E2004",
            Self::ProfileViolation => "E2005",
            Self::UseBeforeDefinition => "E2006",
            Self::MissingReturn => "E2007",
            Self::NotCallable => "E2008",
            Self::WrongArgumentCount => "E2009",
            Self::NotIndexable => "E2010",
            Self::UnknownField => "E2011",
        }
    }
}

/// A mechanical fix-it attached to a diagnostic
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub message: String,
    /// Replacement edit, when one can be derived mechanically
    pub replacement: Option<(Span, String)>,
    /// How likely the suggestion is to be the intended fix, in [0, 1]
    pub confidence: f32,
}

impl Suggestion {
    pub fn text(message: impl Into<String>, confidence: f32) -> Self {
        Self {
            message: message.into(),
            replacement: None,
            confidence,
        }
    }

    pub fn replace(
        message: impl Into<String>,
        span: Span,
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            message: message.into(),
            replacement: Some((span, text.into())),
            confidence,
        }
    }
}

/// One reported diagnostic, immutable once pushed into the sink
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    pub file: String,
    pub suggestions: Vec<Suggestion>,
    /// The structured error this diagnostic was created from, kept for
    /// miette rendering
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Running counters exposed for tests and the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStatistics {
    pub errors: usize,
    pub warnings: usize,
    pub suppressed: usize,
}

/// Owning sink shared by every analysis component.
#[derive(Debug)]
pub struct DiagnosticSink {
    file: String,
    diagnostics: Vec<Diagnostic>,
    max_errors: usize,
    stats: SinkStatistics,
}

impl DiagnosticSink {
    pub fn new(file: impl Into<String>) -> Self {
        Self::with_max_errors(file, DEFAULT_MAX_ERRORS)
    }

    pub fn with_max_errors(file: impl Into<String>, max_errors: usize) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
            max_errors,
            stats: SinkStatistics::default(),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Report an error with no suggestions
    pub fn report(&mut self, error: SemanticError, span: Span) {
        self.report_with_suggestions(error, span, Vec::new());
    }

    /// Report an error with mechanically derived suggestions
    pub fn report_with_suggestions(
        &mut self,
        error: SemanticError,
        span: Span,
        suggestions: Vec<Suggestion>,
    ) {
        let kind = DiagnosticKind::for_error(&error);

        if self.stats.errors >= self.max_errors {
            self.stats.suppressed += 1;
            return;
        }
        if self.is_near_duplicate(kind, span) {
            self.stats.suppressed += 1;
            return;
        }

        tracing::debug!(code = kind.code(), start = span.start, "diagnostic");
        self.stats.errors += 1;
        self.diagnostics.push(Diagnostic {
            severity: kind.info().severity,
            kind,
            message: error.to_string(),
            span,
            file: self.file.clone(),
            suggestions,
            error,
        });
    }

    /// Near-duplicate check: same kind within a small byte window of an
    /// already-reported diagnostic, to cut cascades from one root cause
    fn is_near_duplicate(&self, kind: DiagnosticKind, span: Span) -> bool {
        self.diagnostics.iter().any(|d| {
            d.kind == kind && d.span.start.abs_diff(span.start) <= SUPPRESSION_WINDOW
        })
    }

    /// True once the configured error ceiling has been crossed; callers
    /// skip further analysis for the unit when this trips
    pub fn should_stop_compilation(&self) -> bool {
        self.stats.errors >= self.max_errors
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.stats.errors
    }

    pub fn statistics(&self) -> SinkStatistics {
        self.stats
    }

    /// Diagnostics of one kind, for callers that dispatch on the tag
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
