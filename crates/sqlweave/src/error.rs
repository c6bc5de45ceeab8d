//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type WeaveResult<T> = Result<T, WeaveError>;

/// Error types for building, compiling and executing statements.
///
/// Builders keep the first error they hit and hand it back from `compile()`,
/// so the type is `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeaveError {
    /// A condition, field or source string could not be parsed
    #[error("Malformed expression \"{expr}\": {reason}")]
    MalformedExpression { expr: String, reason: String },

    /// A statement kind or dialect name has no entry in the dispatch tables
    #[error("Unknown dialect operation: {0}")]
    UnknownDialectOperation(String),

    /// The statement asks for something the compiled SQL cannot express
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The builder was driven into an inconsistent state
    #[error("Structural state error: {0}")]
    StructuralState(String),

    /// The external executor failed
    #[error("Execution error: {0}")]
    Execution(String),

    /// Configuration could not be decoded
    #[error("Config error: {0}")]
    Config(String),
}

impl WeaveError {
    /// Create a malformed expression error
    pub fn malformed(expr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedExpression {
            expr: expr.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown dialect operation error
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownDialectOperation(name.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    /// Create a structural state error
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralState(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this is a malformed expression error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedExpression { .. })
    }

    /// Check if this is an unknown dialect operation error
    pub fn is_unknown_operation(&self) -> bool {
        matches!(self, Self::UnknownDialectOperation(_))
    }

    /// Check if this is an unsupported operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }

    /// Check if this is a structural state error
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::StructuralState(_))
    }

    /// Check if this error came from the executor
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

impl From<serde_json::Error> for WeaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
