//! Signing identities.
//!
//! A [`Signer`] produces fresh signature headers and signs arbitrary bytes.
//! The signature collector only talks to this trait; [`LocalSigner`] is the
//! implementation backed by an on-disk MSP directory.

use std::fmt;

use configtx_core::{Ed25519PublicKey, Keypair, SerializedIdentity, SignatureHeader};
use prost::Message;
use rand::RngCore;

use crate::error::Result;

/// Length of the random nonce in every signature header.
pub const NONCE_LEN: usize = 24;

/// The signing capability consumed by the signature collector.
pub trait Signer: Send + Sync {
    /// The MSP this signer belongs to.
    fn msp_id(&self) -> &str;

    /// A new signature header with this signer's identity and a fresh nonce.
    fn new_signature_header(&self) -> Result<SignatureHeader>;

    /// Sign a message.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// An identity as it is announced to verifiers.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    msp_id: String,
    id_bytes: Vec<u8>,
}

impl SigningIdentity {
    pub fn new(msp_id: impl Into<String>, id_bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            msp_id: msp_id.into(),
            id_bytes: id_bytes.into(),
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    /// The credential bytes (PEM certificate or public key).
    pub fn id_bytes(&self) -> &[u8] {
        &self.id_bytes
    }

    /// The wire form placed in `SignatureHeader.creator`.
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.id_bytes.clone(),
        }
        .encode_to_vec()
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SigningIdentity({}, {} bytes)",
            self.msp_id,
            self.id_bytes.len()
        )
    }
}

/// A signer holding its private key in memory.
#[derive(Clone)]
pub struct LocalSigner {
    identity: SigningIdentity,
    keypair: Keypair,
}

impl LocalSigner {
    pub fn new(identity: SigningIdentity, keypair: Keypair) -> Self {
        Self { identity, keypair }
    }

    pub fn identity(&self) -> &SigningIdentity {
        &self.identity
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalSigner({:?}, {:?})", self.identity, self.public_key())
    }
}

impl Signer for LocalSigner {
    fn msp_id(&self) -> &str {
        self.identity.msp_id()
    }

    fn new_signature_header(&self) -> Result<SignatureHeader> {
        let mut nonce = vec![0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        Ok(SignatureHeader {
            creator: self.identity.serialize(),
            nonce,
        })
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.keypair.sign(message).as_bytes().to_vec())
    }
}
