//! Core error types for `QuotaBar`.

use thiserror::Error;

/// Core error type for `QuotaBar` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed a range or shape check.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
