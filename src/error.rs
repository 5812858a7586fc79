//! Error types for the dirvault library
//!
//! All fallible operations return [`Result<T>`]. Failures abort the current
//! backup run immediately; nothing in this crate retries internally.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the dirvault library
pub type Result<T> = std::result::Result<T, VaultError>;

/// Main error type for all dirvault operations
#[derive(Debug, Error)]
pub enum VaultError {
    /// I/O errors during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Source directory does not exist or is not a directory
    #[error("Source directory not found: {0:?}")]
    SourceNotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Archive creation errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Archive extraction errors
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VaultError {
    /// Create an archive error with a custom message
    pub fn archive(msg: impl Into<String>) -> Self {
        VaultError::Archive(msg.into())
    }

    /// Create an extraction error with a custom message
    pub fn extraction(msg: impl Into<String>) -> Self {
        VaultError::Extraction(msg.into())
    }

    /// Create a configuration error with a custom message
    pub fn config(msg: impl Into<String>) -> Self {
        VaultError::InvalidConfiguration(msg.into())
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        VaultError::Internal(msg.into())
    }

    /// Check if this error stems from a missing filesystem entry
    pub fn is_not_found(&self) -> bool {
        match self {
            VaultError::SourceNotFound(_) => true,
            VaultError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            VaultError::Walk(e) => e
                .io_error()
                .map(|e| e.kind() == std::io::ErrorKind::NotFound)
                .unwrap_or(false),
            _ => false,
        }
    }
}
