//! Centralized error handling for graphsmith.
//!
//! Most recoverable data issues inside the transform pipeline are reported as
//! warnings rather than errors (see [`crate::transform`]); the error type here
//! covers the genuinely fatal cases: I/O, malformed project files, and
//! corrupted transform step lists.

use std::fmt;

/// Main error type for graphsmith operations.
#[derive(Debug)]
pub enum GraphsmithError {
    /// I/O errors (file operations, clipboard reads, etc.)
    Io(std::io::Error),

    /// Data processing errors (table construction, transforms, parsing)
    Data(String),

    /// Project file or configuration errors
    Config(String),

    /// File not found or invalid path
    InvalidPath(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for GraphsmithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Data(msg) => write!(f, "Data processing error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidPath(msg) => write!(f, "Invalid path: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for GraphsmithError {}

impl From<std::io::Error> for GraphsmithError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for GraphsmithError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<serde_json::Error> for GraphsmithError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<csv::Error> for GraphsmithError {
    fn from(err: csv::Error) -> Self {
        Self::Data(format!("CSV error: {err}"))
    }
}

impl From<crate::table::TableError> for GraphsmithError {
    fn from(err: crate::table::TableError) -> Self {
        Self::Data(err.to_string())
    }
}

impl From<crate::transform::TransformError> for GraphsmithError {
    fn from(err: crate::transform::TransformError) -> Self {
        Self::Data(err.to_string())
    }
}

/// Result type alias for graphsmith operations.
pub type Result<T> = std::result::Result<T, GraphsmithError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<GraphsmithError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: GraphsmithError = e.into();
            GraphsmithError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: GraphsmithError = e.into();
            GraphsmithError::Other(format!("{}: {}", f(), err))
        })
    }
}
