// src/error.rs

//! Unified error handling for the classificados tooling.

use std::fmt;

use thiserror::Error;

/// Result type alias for classificados operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required document is missing from storage
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The structural schema could not be compiled
    #[error("Schema error: {0}")]
    Schema(String),

    /// Dataset failed validation
    #[error("Validation failed with {0} problem(s)")]
    Invalid(usize),

    /// Malformed version string
    #[error("Invalid version '{value}': {message}")]
    Version { value: String, message: String },

    /// A delegated source-control command exited unsuccessfully
    #[error("{command} failed: {message}")]
    ExternalTool { command: String, message: String },
}

impl AppError {
    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a schema compilation error.
    pub fn schema(message: impl fmt::Display) -> Self {
        Self::Schema(message.to_string())
    }

    /// Create a version parsing error.
    pub fn version(value: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Version {
            value: value.into(),
            message: message.to_string(),
        }
    }

    /// Create an external tool error with the failing command line.
    pub fn external(command: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::ExternalTool {
            command: command.into(),
            message: message.to_string(),
        }
    }
}
