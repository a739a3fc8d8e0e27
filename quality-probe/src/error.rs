//! Error types for quality-probe.
//!
//! Every failure surfaced by the executor, the probes, the profiler and the
//! catalog browser is a [`ProbeError`]. Errors coming out of a connection are
//! passed through untouched, so a caller can match on the same variant no
//! matter which layer it called.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for quality-probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The connection could not be established, or the executor is not connected.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// The engine rejected the statement or failed while running it.
    #[error("Execution error: {message}")]
    Execution {
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A single-row operation got no rows back.
    #[error("Query for '{operation}' returned no rows")]
    EmptyResult {
        /// Name of the operation that needed a row
        operation: String,
    },

    /// A catalog, schema, table or column name failed validation.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// An operation argument is out of its accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A result row did not have the shape the operation expected.
    #[error("Cannot normalize column '{column}': {message}")]
    Normalization {
        /// Column that could not be read
        column: String,
        /// What was wrong with it
        message: String,
    },
}

/// Coarse classification of a [`ProbeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Execution,
    EmptyResult,
    InvalidIdentifier,
    InvalidArgument,
    Configuration,
    Normalization,
}

/// A type alias for `Result<T, ProbeError>`.
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a connection error wrapping its cause.
    pub fn connection_with_source(message: impl Into<String>, source: BoxedSource) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an execution error wrapping its cause.
    pub fn execution_with_source(message: impl Into<String>, source: BoxedSource) -> Self {
        Self::Execution {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an empty-result error for the named operation.
    pub fn empty_result(operation: impl Into<String>) -> Self {
        Self::EmptyResult {
            operation: operation.into(),
        }
    }

    /// Creates a normalization error for the given column.
    pub fn normalization(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Normalization {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Normalization { .. } => ErrorKind::Normalization,
        }
    }
}

impl From<datafusion::error::DataFusionError> for ProbeError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        Self::execution_with_source(err.to_string(), Box::new(err))
    }
}

impl From<arrow::error::ArrowError> for ProbeError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::execution_with_source(err.to_string(), Box::new(err))
    }
}
