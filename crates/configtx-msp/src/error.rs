//! Error types for identity loading and signing.

use std::path::PathBuf;

use configtx_core::CoreError;
use thiserror::Error;

/// Errors that can occur while loading or using a signing identity.
#[derive(Debug, Error)]
pub enum MspError {
    /// A file or directory of the MSP could not be read.
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required MSP sub-directory holds no files.
    #[error("no files found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// The keystore holds something other than a usable private key.
    #[error("invalid private key in {}: {reason}", path.display())]
    InvalidKey { path: PathBuf, reason: String },

    /// The signing certificate's public key does not belong to the private key.
    #[error("identity in {} does not match the private key", .0.display())]
    IdentityMismatch(PathBuf),

    /// A signature header or identity could not be decoded.
    #[error("malformed signature header: {0}")]
    MalformedSignatureHeader(String),

    /// The creator's credential is not a usable public key.
    #[error("creator identity for MSP '{0}' has no usable public key")]
    UnusableIdentity(String),

    /// The signature does not verify.
    #[error("signature by MSP '{0}' does not verify")]
    BadSignature(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for MSP operations.
pub type Result<T> = std::result::Result<T, MspError>;
