// src/errors/codes.rs
//! Error codes and metadata for Janus semantic analysis.
//!
//! Error codes follow the compiler-wide numbering scheme:
//! - E0xxx: Lexer errors (owned by the lexer)
//! - E1xxx: Parser errors (owned by the parser)
//! - E2xxx: Semantic analysis errors (owned by this crate)
//!
//! Other subsystems (e.g. the query-purity checker) own their own
//! namespaces; nothing here may reuse their ranges.

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// Error metadata - static definition
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub code: u16,
    pub message: &'static str,
    pub severity: Severity,
    pub hint: Option<&'static str>,
}

impl ErrorInfo {
    /// Format error code as "Exxxx" for errors or "Wxxxx" for warnings
    pub fn code_string(&self) -> String {
        let prefix = if self.severity == Severity::Warning {
            "W"
        } else {
            "E"
        };
        format!("{}{:04}", prefix, self.code)
    }
}

// =============================================================================
// Semantic Analysis Errors (E2xxx)
// =============================================================================

/// E2001: Type mismatch between expected and actual types
pub const SEMA_TYPE_MISMATCH: ErrorInfo = ErrorInfo {
    code: 2001,
    message: "expected {}, found {}",
    severity: Severity::Error,
    hint: None,
};

/// E2002: Reference to an undefined symbol
pub const SEMA_UNDEFINED_SYMBOL: ErrorInfo = ErrorInfo {
    code: 2002,
    message: "undefined symbol '{}'",
    severity: Severity::Error,
    hint: None,
};

/// E2003: Same name declared twice in one scope
pub const SEMA_DUPLICATE_DECLARATION: ErrorInfo = ErrorInfo {
    code: 2003,
    message: "'{}' is already declared in this scope",
    severity: Severity::Error,
    hint: Some("shadowing is allowed in a nested scope, not in the same one"),
};

/// E2004: Inference variable left unbound after solving
pub const SEMA_AMBIGUOUS_INFERENCE: ErrorInfo = ErrorInfo {
    code: 2004,
    message: "cannot infer a type for this expression",
    severity: Severity::Error,
    hint: Some("add a type annotation to pin the type down"),
};

/// E2005: Construct requires a higher language profile
pub const SEMA_PROFILE_VIOLATION: ErrorInfo = ErrorInfo {
    code: 2005,
    message: "feature '{}' is not available under profile '{}'",
    severity: Severity::Error,
    hint: None,
};

/// E2006: Variable read before any assignment
pub const SEMA_USE_BEFORE_DEFINITION: ErrorInfo = ErrorInfo {
    code: 2006,
    message: "'{}' is used before it is assigned",
    severity: Severity::Error,
    hint: Some("initialize the variable before its first use"),
};

/// E2007: Non-void function with no return path
pub const SEMA_MISSING_RETURN: ErrorInfo = ErrorInfo {
    code: 2007,
    message: "function '{}' declares a return type but has no return statement",
    severity: Severity::Error,
    hint: None,
};

/// E2008: Call target is not a function
pub const SEMA_NOT_CALLABLE: ErrorInfo = ErrorInfo {
    code: 2008,
    message: "cannot call non-function type '{}'",
    severity: Severity::Error,
    hint: None,
};

/// E2009: Wrong number of arguments in function call
pub const SEMA_WRONG_ARGUMENT_COUNT: ErrorInfo = ErrorInfo {
    code: 2009,
    message: "expected {} arguments, found {}",
    severity: Severity::Error,
    hint: None,
};

/// E2010: Index applied to a non-array type
pub const SEMA_NOT_INDEXABLE: ErrorInfo = ErrorInfo {
    code: 2010,
    message: "cannot index into type '{}'",
    severity: Severity::Error,
    hint: None,
};

/// E2011: Field access names a field the struct does not have
pub const SEMA_UNKNOWN_FIELD: ErrorInfo = ErrorInfo {
    code: 2011,
    message: "type '{}' has no field '{}'",
    severity: Severity::Error,
    hint: None,
};
