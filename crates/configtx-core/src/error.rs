//! Error types for the configuration wire model.

use std::fmt;

use thiserror::Error;

/// The step at which decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStage {
    /// Reading the raw input stream.
    StreamRead,
    /// Stripping the base64 transport wrapper.
    Base64,
    /// Parsing protobuf binary.
    Binary,
    /// Parsing the JSON projection.
    Json,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodeStage::StreamRead => "stream read",
            DecodeStage::Base64 => "base64",
            DecodeStage::Binary => "binary parse",
            DecodeStage::Json => "json parse",
        };
        f.write_str(s)
    }
}

/// Core errors that can occur while translating configuration messages.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("decode failed at {stage}: {message}")]
    Decode { stage: DecodeStage, message: String },

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("unknown message name '{0}'")]
    UnknownMessageType(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,
}

impl CoreError {
    /// Shorthand for a binary decode failure.
    pub fn binary(err: impl fmt::Display) -> Self {
        CoreError::Decode {
            stage: DecodeStage::Binary,
            message: err.to_string(),
        }
    }

    /// Shorthand for a JSON decode failure.
    pub fn json(err: impl fmt::Display) -> Self {
        CoreError::Decode {
            stage: DecodeStage::Json,
            message: err.to_string(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_stage() {
        let err = CoreError::binary("buffer underflow");
        assert_eq!(
            err.to_string(),
            "decode failed at binary parse: buffer underflow"
        );

        let err = CoreError::Decode {
            stage: DecodeStage::StreamRead,
            message: "broken pipe".into(),
        };
        assert!(err.to_string().contains("stream read"));
    }
}
