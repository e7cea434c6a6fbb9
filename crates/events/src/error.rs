//! Journal errors

use thiserror::Error;

use crate::hash::ChainError;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid journal file {file} line {line}: {reason}")]
    InvalidFile {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Journal integrity check failed: {0}")]
    Chain(#[from] ChainError),
}

/// Result type for journal operations
pub type EventResult<T> = Result<T, EventError>;
