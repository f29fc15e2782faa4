//! Error types for update computation and checking.

use thiserror::Error;

/// Errors that can occur while diffing or checking configurations.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// One side of the diff has no channel group to compare.
    #[error("no channel group included for {0} config")]
    MissingChannelGroup(&'static str),

    /// Diagnostics could not be serialized.
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Result type for update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;
