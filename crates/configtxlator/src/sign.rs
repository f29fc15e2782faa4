//! Signature collection over pending config updates.
//!
//! Each signer appends one `ConfigSignature` covering
//! `signature_header || config_update`. The update bytes are never touched
//! and earlier signatures are never removed, so signers can work one after
//! another on the same envelope without coordinating.

use configtx_core::{
    config_signature_message, ConfigSignature, ConfigUpdate, ConfigUpdateEnvelope, Digest,
    Envelope, EnvelopeParams,
};
use configtx_msp::Signer;
use prost::Message;
use tracing::{debug, info};

use crate::config::EnvelopeDefaults;
use crate::error::Result;

/// What a signing pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutcome {
    /// Signatures on the update after this pass.
    pub signature_count: usize,
    /// Digest of the config update bytes every signer covers.
    pub update_digest: Digest,
    /// The MSP that signed in this pass, if any.
    pub signed_by: Option<String>,
}

/// Append one signature from `signer`, or leave the envelope untouched when
/// there is no signer.
pub fn sign_config_update_envelope(
    cue: &mut ConfigUpdateEnvelope,
    signer: Option<&dyn Signer>,
) -> Result<SignOutcome> {
    let update_digest = cue.update_digest();

    let Some(signer) = signer else {
        debug!(update = %update_digest, "no signer, envelope left unchanged");
        return Ok(SignOutcome {
            signature_count: cue.signatures.len(),
            update_digest,
            signed_by: None,
        });
    };

    let signature_header = signer.new_signature_header()?.encode_to_vec();
    let message = config_signature_message(&signature_header, &cue.config_update);
    let signature = signer.sign(&message)?;

    cue.push_signature(ConfigSignature {
        signature_header,
        signature,
    });

    info!(
        msp_id = signer.msp_id(),
        update = %update_digest,
        signatures = cue.signatures.len(),
        "Envelope signed with {}",
        signer.msp_id()
    );

    Ok(SignOutcome {
        signature_count: cue.signatures.len(),
        update_digest,
        signed_by: Some(signer.msp_id().to_string()),
    })
}

/// A re-wrapped envelope plus what signing did to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub envelope: Envelope,
    pub outcome: SignOutcome,
}

/// Start a signing session from a bare update, sign it, and wrap it.
pub fn sign_config_update(
    update: &ConfigUpdate,
    signer: Option<&dyn Signer>,
    channel_id: &str,
    defaults: EnvelopeDefaults,
) -> Result<SignedEnvelope> {
    sign_and_wrap(ConfigUpdateEnvelope::new(update), signer, channel_id, defaults)
}

/// Sign an already-unwrapped ConfigUpdateEnvelope and wrap it.
pub fn sign_and_wrap(
    mut cue: ConfigUpdateEnvelope,
    signer: Option<&dyn Signer>,
    channel_id: &str,
    defaults: EnvelopeDefaults,
) -> Result<SignedEnvelope> {
    let outcome = sign_config_update_envelope(&mut cue, signer)?;
    let envelope = EnvelopeParams::config_update(channel_id, defaults.version, defaults.epoch)
        .wrap_message(&cue);
    Ok(SignedEnvelope { envelope, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use configtx_core::{envelope, HeaderType, Keypair};
    use configtx_msp::{verify_config_signature, LocalSigner, SigningIdentity};

    fn signer(msp_id: &str, seed: u8) -> LocalSigner {
        let keypair = Keypair::from_seed(&[seed; 32]);
        let pem = keypair.public_key().to_pem().unwrap();
        LocalSigner::new(SigningIdentity::new(msp_id, pem), keypair)
    }

    fn pending() -> ConfigUpdateEnvelope {
        ConfigUpdateEnvelope::new(&ConfigUpdate {
            channel_id: "mychannel".into(),
            ..Default::default()
        })
    }

    #[test]
    fn test_no_signer_is_noop() {
        let mut cue = pending();
        let before = cue.clone();
        let outcome = sign_config_update_envelope(&mut cue, None).unwrap();
        assert_eq!(cue, before);
        assert_eq!(outcome.signature_count, 0);
        assert!(outcome.signed_by.is_none());
    }

    #[test]
    fn test_signature_appended_and_verifies() {
        let org1 = signer("Org1MSP", 1);
        let mut cue = pending();
        let update_bytes = cue.config_update.clone();

        let outcome = sign_config_update_envelope(&mut cue, Some(&org1)).unwrap();
        assert_eq!(outcome.signature_count, 1);
        assert_eq!(outcome.signed_by.as_deref(), Some("Org1MSP"));
        assert_eq!(cue.config_update, update_bytes);

        let creator = verify_config_signature(&cue.signatures[0], &cue.config_update).unwrap();
        assert_eq!(creator.mspid, "Org1MSP");
    }

    #[test]
    fn test_same_signer_twice_is_not_deduplicated() {
        let org1 = signer("Org1MSP", 1);
        let mut cue = pending();
        sign_config_update_envelope(&mut cue, Some(&org1)).unwrap();
        sign_config_update_envelope(&mut cue, Some(&org1)).unwrap();
        assert_eq!(cue.signatures.len(), 2);
        assert_ne!(cue.signatures[0], cue.signatures[1]);
    }

    #[test]
    fn test_sign_envelope_rewraps() {
        let org1 = signer("Org1MSP", 1);
        let env = EnvelopeParams::config_update("mychannel", 0, 0).wrap_message(&pending());

        let defaults = EnvelopeDefaults {
            version: 0,
            epoch: 5,
        };
        let cue: ConfigUpdateEnvelope = envelope::unwrap(&env).unwrap();
        let signed = sign_and_wrap(cue, Some(&org1), "mychannel", defaults).unwrap();
        let ch = envelope::channel_header(&signed.envelope).unwrap();
        assert_eq!(ch.header_type(), Some(HeaderType::ConfigUpdate));
        assert_eq!(ch.epoch, 5);

        let cue: ConfigUpdateEnvelope = envelope::unwrap(&signed.envelope).unwrap();
        assert_eq!(cue.signatures.len(), 1);
    }
}
