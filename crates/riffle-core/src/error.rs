//! Error types for Riffle core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while higher-level code can use `anyhow` for
//! convenient error handling.

use thiserror::Error;

/// Result type alias using RiffleError
pub type Result<T> = std::result::Result<T, RiffleError>;

/// Core error types for Riffle operations.
///
/// These errors represent specific failure modes that callers may want to
/// handle differently (e.g., reporting a bad upload without touching the
/// currently stored record set).
#[derive(Error, Debug)]
pub enum RiffleError {
    // === Parse Errors ===
    /// The CSV input has no header line, or the header line is blank
    #[error("missing or empty CSV header: {reason}")]
    MissingHeader { reason: String },

    // === Ingest Boundary Errors ===
    /// The declared content type of an upload does not denote CSV
    #[error("unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    /// An ingest request carried no payload
    #[error("empty upload: no payload present")]
    EmptyUpload,

    /// The upload payload is not valid UTF-8 text
    #[error("upload payload is not valid UTF-8")]
    InvalidEncoding,

    // === Search Boundary Errors ===
    /// A search request arrived without a query parameter.
    ///
    /// Note that an *empty* query is valid and returns the full record set;
    /// only a genuinely absent parameter produces this error.
    #[error("missing query parameter")]
    MissingQuery,

    // === Configuration Errors ===
    /// Configuration file parsing or validation failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Internal Errors ===
    /// Internal error that should not happen
    #[error("internal error: {0}")]
    Internal(String),
}

impl RiffleError {
    /// Returns true if this error was caused by the request itself rather
    /// than by the system.
    ///
    /// Client errors are always recoverable at the boundary: they produce a
    /// user-visible message and never alter a previously stored record set.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RiffleError::MissingHeader { .. }
                | RiffleError::UnsupportedMediaType { .. }
                | RiffleError::EmptyUpload
                | RiffleError::InvalidEncoding
                | RiffleError::MissingQuery
        )
    }

    /// Create a missing-header parse error
    pub fn missing_header(reason: impl Into<String>) -> Self {
        RiffleError::MissingHeader {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        RiffleError::ConfigError {
            reason: reason.into(),
        }
    }
}
