//! Verification of collected config signatures.

use configtx_core::{
    ConfigSignature, Ed25519PublicKey, Ed25519Signature, SerializedIdentity, SignatureHeader,
};
use prost::Message;

use crate::error::{MspError, Result};

/// Verify one signature over `config_update` and return the signer.
///
/// The creator's credential must be a PEM public key. Certificate
/// credentials are not verified here.
pub fn verify_config_signature(
    signature: &ConfigSignature,
    config_update: &[u8],
) -> Result<SerializedIdentity> {
    let header = SignatureHeader::decode(signature.signature_header.as_slice())
        .map_err(|e| MspError::MalformedSignatureHeader(e.to_string()))?;
    let creator = SerializedIdentity::decode(header.creator.as_slice())
        .map_err(|e| MspError::MalformedSignatureHeader(format!("creator: {}", e)))?;

    let public_key = std::str::from_utf8(&creator.id_bytes)
        .ok()
        .and_then(|pem| Ed25519PublicKey::from_pem(pem).ok())
        .ok_or_else(|| MspError::UnusableIdentity(creator.mspid.clone()))?;

    let sig = Ed25519Signature::from_slice(&signature.signature)
        .map_err(|_| MspError::BadSignature(creator.mspid.clone()))?;
    public_key
        .verify(&signature.signed_message(config_update), &sig)
        .map_err(|_| MspError::BadSignature(creator.mspid.clone()))?;

    Ok(creator)
}
