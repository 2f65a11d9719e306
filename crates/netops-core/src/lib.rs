//! Core types and utilities for netops
//!
//! # Modules
//!
//! - `config`: Environment file loading and application settings
//! - `error`: Error taxonomy and Result alias
//! - `types`: Conversation turns, tool calls and tool declarations

pub mod config;
pub mod error;
pub mod types;

// Re-exports
pub use config::AppConfig;
pub use error::{Error, ErrorKind, Result};
pub use types::*;
