//! Error types for the translator operations.

use configtx_core::CoreError;
use configtx_io::CodecError;
use configtx_msp::MspError;
use configtx_update::UpdateError;
use thiserror::Error;

/// Errors surfaced by translator operations.
#[derive(Debug, Error)]
pub enum TranslatorError {
    /// No input source could be resolved.
    #[error("input unavailable: {0}")]
    InputUnavailable(String),

    /// Input bytes could not be read or parsed.
    #[error(transparent)]
    Decode(CodecError),

    /// The requested message name is not registered.
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    /// The diff rejected its inputs.
    #[error("error computing update: {0}")]
    DiffComputation(#[from] UpdateError),

    /// An envelope did not carry the expected payload.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The signer could not be loaded or could not sign.
    #[error("signing failed: {0}")]
    Signing(#[from] MspError),

    /// Output could not be encoded or written.
    #[error("error writing output: {0}")]
    Encode(String),
}

impl TranslatorError {
    /// Whether the caller is at fault: bad fields, bad input bytes, unknown
    /// message type, or a diff rejection.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslatorError::InputUnavailable(_)
                | TranslatorError::Decode(_)
                | TranslatorError::UnknownMessageType(_)
                | TranslatorError::DiffComputation(_)
                | TranslatorError::MalformedEnvelope(_)
        )
    }
}

impl From<CoreError> for TranslatorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownMessageType(name) => TranslatorError::UnknownMessageType(name),
            CoreError::MalformedEnvelope(reason) => TranslatorError::MalformedEnvelope(reason),
            CoreError::Encode(reason) => TranslatorError::Encode(reason),
            other => TranslatorError::Decode(CodecError::Core(other)),
        }
    }
}

impl From<CodecError> for TranslatorError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InputUnavailable(reason) => TranslatorError::InputUnavailable(reason),
            CodecError::Write { .. } => TranslatorError::Encode(err.to_string()),
            CodecError::Core(core) => core.into(),
            read @ CodecError::Read { .. } => TranslatorError::Decode(read),
        }
    }
}

/// Result type for translator operations.
pub type Result<T> = std::result::Result<T, TranslatorError>;
