//! Tool-level errors
//!
//! These are the failures a tool reports back into the conversation. The
//! dispatcher renders them with [`ToolError::to_observation`] so the model can
//! correct itself within the same cycle.

use netops_core::{Error, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Tool '{0}' is not registered")]
    UnknownTool(String),

    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ToolError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ToolError::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        ToolError::Unavailable(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ToolError::NotFound(_) => ErrorKind::NotFound,
            ToolError::NotSupported(_) => ErrorKind::NotSupported,
            ToolError::Unavailable(_) => ErrorKind::Unavailable,
            ToolError::UnknownTool(_) => ErrorKind::UnknownTool,
            ToolError::Execution(_) => ErrorKind::Internal,
        }
    }

    /// Text fed back to the model as a tool observation
    pub fn to_observation(&self) -> String {
        format!("error ({}): {}", self.kind(), self)
    }
}

impl From<Error> for ToolError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidArgument(msg) => ToolError::InvalidArgument(msg),
            Error::NotFound(msg) => ToolError::NotFound(msg),
            Error::NotSupported(msg) => ToolError::NotSupported(msg),
            Error::Unavailable(msg) => ToolError::Unavailable(msg),
            Error::UnknownTool(name) => ToolError::UnknownTool(name),
            other => ToolError::Execution(other.to_string()),
        }
    }
}

impl From<ToolError> for Error {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArgument(msg) => Error::InvalidArgument(msg),
            ToolError::NotFound(msg) => Error::NotFound(msg),
            ToolError::NotSupported(msg) => Error::NotSupported(msg),
            ToolError::Unavailable(msg) => Error::Unavailable(msg),
            ToolError::UnknownTool(name) => Error::UnknownTool(name),
            ToolError::Execution(msg) => Error::Internal(msg),
        }
    }
}
