use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while editing or evaluating a graph.
///
/// Cloneable so that a failed in-flight compute can hand the same error
/// to every caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Context variable \"{name}\" not found")]
    MissingVariable { name: String },
    #[error("Invalid connection: {reason}")]
    InvalidConnection { reason: String },
    #[error("Error computing {plug}: {message}")]
    Compute { plug: String, message: String },
    #[error("Cyclic affects declaration reached {plug}")]
    CyclicAffects { plug: String },
    #[error("Computation cancelled")]
    Cancelled,
    #[error("Node not found: {0}")]
    UnknownNode(String),
    #[error("Plug not found: {0}")]
    UnknownPlug(String),
    #[error("Name already in use: {0}")]
    DuplicateName(String),
    #[error("Type mismatch on {plug}: expected {expected}, found {found}")]
    TypeMismatch {
        plug: String,
        expected: String,
        found: String,
    },
    #[error("Cannot edit {plug}: {reason}")]
    InvalidEdit { plug: String, reason: String },
    #[error("Lock poisoned")]
    LockPoisoned,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraphError {
    pub fn invalid_connection(reason: impl Into<String>) -> Self {
        GraphError::InvalidConnection {
            reason: reason.into(),
        }
    }

    pub fn missing_variable(name: impl Into<String>) -> Self {
        GraphError::MissingVariable { name: name.into() }
    }

    /// True for conditions a waiter may retry rather than report.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GraphError::Cancelled)
    }
}

impl<T> From<std::sync::PoisonError<T>> for GraphError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        GraphError::LockPoisoned
    }
}
