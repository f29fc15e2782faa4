//! Error types for the codec adapter.

use std::path::PathBuf;

use configtx_core::{CoreError, DecodeStage};
use thiserror::Error;

/// Errors that can occur while reading or writing messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No input was named and this command does not read stdin.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// The input stream could not be read.
    #[error("error reading {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    /// The output sink could not be written.
    #[error("error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decoding or encoding the message itself failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CodecError {
    /// The decode stage, when this is a decode failure.
    pub fn decode_stage(&self) -> Option<DecodeStage> {
        match self {
            CodecError::Read { .. } => Some(DecodeStage::StreamRead),
            CodecError::Core(CoreError::Decode { stage, .. }) => Some(*stage),
            _ => None,
        }
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
