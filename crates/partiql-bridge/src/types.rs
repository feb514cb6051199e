//! Core request types and the error taxonomy shared by every execution path.

use std::fmt;

/// One query execution: the query text and the environment it runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    query: String,
    environment: String,
}

impl QueryRequest {
    /// Build a request. No validation happens here; see [`QueryRequest::validate`].
    pub fn new(query: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            environment: environment.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Reject requests with an empty query or environment.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.query.is_empty() || self.environment.is_empty() {
            return Err(BridgeError::Validation(
                "query and environment must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Boxed underlying cause carried by an [`ExecutionError`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The engine ran (or tried to) and reported a failure.
///
/// Carries the engine's raw combined output so the diagnostics reach the
/// user, plus the underlying cause (exit status, launch failure, stdin write
/// failure) when there is one.
#[derive(Debug)]
pub struct ExecutionError {
    output: String,
    cause: Option<BoxedCause>,
}

impl ExecutionError {
    pub fn new(output: impl Into<String>, cause: Option<BoxedCause>) -> Self {
        Self {
            output: output.into(),
            cause,
        }
    }

    /// Raw engine output captured before the failure was detected.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "query exec: {}; original err: {cause}", self.output),
            None => write!(f, "query exec: {}", self.output),
        }
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Errors that can occur while bridging to the engine.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// The engine process could not be created or its pipes could not be opened.
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// A framed exchange did not complete (short read, failed write, bad payload).
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this failure came from the engine itself rather than the plumbing.
    pub fn is_execution(&self) -> bool {
        matches!(self, BridgeError::Execution(_))
    }
}

/// Convenience result type.
pub type BridgeResult<T> = Result<T, BridgeError>;
