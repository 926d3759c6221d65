//! Error handling for sortnet
//!
//! Solver verdicts (infeasible, unknown, invalid model) and validation
//! failures are reported as data, not as errors. This type only covers
//! configuration mistakes and I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for sortnet operations
pub type Result<T> = std::result::Result<T, SortnetError>;

/// Main error type for sortnet operations
#[derive(Error, Debug)]
pub enum SortnetError {
    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Too many channels: {channels} (maximum {max}, every 0/1 vector is enumerated)")]
    TooManyChannels { channels: usize, max: usize },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SortnetError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SortnetError::InvalidConfig { .. } => "INVALID_CONFIG",
            SortnetError::TooManyChannels { .. } => "TOO_MANY_CHANNELS",
            SortnetError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SortnetError::FileReadError { .. } => "FILE_READ_ERROR",
            SortnetError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            SortnetError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SortnetError::InvalidConfig { .. } => vec![
                "Channel count must be at least 1",
                "Time limit, when given, must be a positive number of seconds",
            ],
            SortnetError::TooManyChannels { .. } => vec![
                "The model grows with 2^n test vectors; use fewer channels",
            ],
            SortnetError::FileNotFound { .. } => vec!["Check the configuration file path"],
            _ => vec![],
        }
    }
}
