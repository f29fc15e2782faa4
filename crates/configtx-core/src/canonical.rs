//! Canonical signed-message construction for config signatures.
//!
//! Every signer of a config update signs:
//!
//! ```text
//! serialized SignatureHeader || ConfigUpdateEnvelope.config_update
//! ```
//!
//! The signature list is never part of the message, so appending a signature
//! leaves every earlier signature valid. The header comes first; verifiers on
//! the ordering side rebuild the message in exactly this order.

/// Construct the signed message (signature_header || config_update).
pub fn config_signature_message(signature_header: &[u8], config_update: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(signature_header.len() + config_update.len());
    buf.extend_from_slice(signature_header);
    buf.extend_from_slice(config_update);
    buf
}
