//! # configtx-msp
//!
//! Signing identities for config update signatures.
//!
//! ## Key Types
//!
//! - [`Signer`] - Produces signature headers and signatures
//! - [`LocalSigner`] - A signer loaded from an MSP directory
//! - [`SigningIdentity`] - MSP id plus credential bytes
//!
//! A loaded signer is an explicit value passed to whoever needs it; nothing
//! here keeps process-global state.

pub mod error;
pub mod local;
pub mod signer;
pub mod verify;

pub use error::{MspError, Result};
pub use local::{load_local_msp, resolve_signer, KEYSTORE_DIR, SIGNCERTS_DIR};
pub use signer::{LocalSigner, Signer, SigningIdentity, NONCE_LEN};
pub use verify::verify_config_signature;
