//! # configtx-core
//!
//! Wire model for channel configuration transactions: protobuf messages,
//! their JSON projection, and the envelope framing around them.
//!
//! This crate contains no I/O. It is pure computation over messages.
//!
//! ## Key Types
//!
//! - [`Config`] - A full channel configuration snapshot
//! - [`ConfigUpdate`] - A read-set / write-set delta between two snapshots
//! - [`ConfigUpdateEnvelope`] - A serialized update plus collected signatures
//! - [`Envelope`] - The outermost transport unit
//! - [`MessageRegistry`] - Name-indexed decoders for every message
//!
//! ## Signing
//!
//! Config signatures cover `signature_header || config_update`. See the
//! [`canonical`] module.

pub mod canonical;
pub mod codec;
pub mod crypto;
pub mod envelope;
pub mod error;
mod json;
pub mod protos;
pub mod registry;

pub use canonical::config_signature_message;
pub use crypto::{Digest, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use envelope::EnvelopeParams;
pub use error::{CoreError, DecodeStage, Result};
pub use protos::*;
pub use registry::{DynMessage, MessageRegistry, MessageType, WireMessage};
