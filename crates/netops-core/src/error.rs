//! Error types for netops

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for netops operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Iteration limit exceeded after {0} model calls")]
    IterationLimitExceeded(usize),

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, serializable name of an error variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    NotSupported,
    Unavailable,
    UnknownTool,
    IterationLimitExceeded,
    UpstreamFailure,
    Config,
    Serialization,
    Io,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotSupported => "not_supported",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::IterationLimitExceeded => "iteration_limit_exceeded",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::Config => "config",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Io => "io",
            ErrorKind::Internal => "internal",
        }
    }

    /// Errors a tool may raise that the model can react to within a dispatch cycle
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidArgument
                | ErrorKind::NotFound
                | ErrorKind::NotSupported
                | ErrorKind::Unavailable
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create a not supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Error::NotSupported(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::Unavailable(msg.into())
    }

    /// Create an upstream failure
    pub fn upstream(msg: impl Into<String>) -> Self {
        Error::UpstreamFailure(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::NotSupported(_) => ErrorKind::NotSupported,
            Error::Unavailable(_) => ErrorKind::Unavailable,
            Error::UnknownTool(_) => ErrorKind::UnknownTool,
            Error::IterationLimitExceeded(_) => ErrorKind::IterationLimitExceeded,
            Error::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            Error::Config(_) => ErrorKind::Config,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(Error::upstream("x").kind(), ErrorKind::UpstreamFailure);
        assert_eq!(
            Error::IterationLimitExceeded(3).kind(),
            ErrorKind::IterationLimitExceeded
        );
    }

    #[test]
    fn test_recoverable_kinds() {
        assert!(ErrorKind::InvalidArgument.is_recoverable());
        assert!(ErrorKind::Unavailable.is_recoverable());
        assert!(!ErrorKind::UnknownTool.is_recoverable());
        assert!(!ErrorKind::UpstreamFailure.is_recoverable());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotSupported).unwrap();
        assert_eq!(json, "\"not_supported\"");
        assert_eq!(ErrorKind::NotSupported.to_string(), "not_supported");
    }
}
