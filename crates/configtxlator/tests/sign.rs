//! Multi-party signing over a shared config update.

use configtx_core::{codec, envelope, ConfigUpdate, ConfigUpdateEnvelope, Envelope};
use configtx_io::{Input, Output};
use configtx_msp::{resolve_signer, verify_config_signature, Signer};
use configtxlator::sign::sign_config_update_envelope;
use configtxlator::{EnvelopeDefaults, Translator};
use configtxlator_testkit::{multi_party_msps, sample_config};
use proptest::prelude::*;

fn pending_update() -> ConfigUpdate {
    let mut write_set = sample_config().channel_group.unwrap();
    write_set.version += 1;
    ConfigUpdate {
        channel_id: "mychannel".into(),
        read_set: None,
        write_set: Some(write_set),
        ..Default::default()
    }
}

fn signatures(env: &Envelope) -> ConfigUpdateEnvelope {
    envelope::unwrap(env).unwrap()
}

#[test]
fn test_two_parties_sign_in_turn() {
    let msps = multi_party_msps(2);
    let translator = Translator::default();
    let dir = tempfile::tempdir().unwrap();

    // First organization starts from the bare update.
    let first = translator
        .sign_config_update(
            &Input::bytes(codec::encode_binary(&pending_update())),
            "mychannel",
            msps[0].msp_id(),
            Some(msps[0].path()),
        )
        .unwrap();
    assert_eq!(first.outcome.signature_count, 1);

    // The envelope travels through a file to the second organization.
    let handoff = dir.path().join("signed_once.pb");
    Output::file(&handoff).emit(&first.envelope).unwrap();

    let second = translator
        .sign_envelope(
            &Input::file(&handoff),
            "mychannel",
            msps[1].msp_id(),
            Some(msps[1].path()),
        )
        .unwrap();
    assert_eq!(second.outcome.signature_count, 2);
    assert_eq!(second.outcome.update_digest, first.outcome.update_digest);

    let cue = signatures(&second.envelope);
    let signers: Vec<String> = cue
        .signatures
        .iter()
        .map(|sig| verify_config_signature(sig, &cue.config_update).unwrap().mspid)
        .collect();
    assert_eq!(signers, vec!["Org1MSP".to_string(), "Org2MSP".to_string()]);

    let update: ConfigUpdate = codec::decode_binary(&cue.config_update).unwrap();
    assert_eq!(update, pending_update());
}

#[test]
fn test_signature_does_not_verify_against_other_update() {
    let msps = multi_party_msps(1);
    let signed = Translator::default()
        .sign_config_update(
            &Input::bytes(codec::encode_binary(&pending_update())),
            "mychannel",
            msps[0].msp_id(),
            Some(msps[0].path()),
        )
        .unwrap();

    let cue = signatures(&signed.envelope);
    let other = codec::encode_binary(&ConfigUpdate {
        channel_id: "otherchannel".into(),
        ..Default::default()
    });
    assert!(verify_config_signature(&cue.signatures[0], &other).is_err());
}

#[test]
fn test_without_msp_dir_envelope_is_rewrapped_unchanged() {
    let env = configtxlator::update::wrap_update(
        &pending_update(),
        "mychannel",
        EnvelopeDefaults::default(),
    );
    let signed = Translator::default()
        .sign_envelope(
            &Input::bytes(codec::encode_binary(&env)),
            "mychannel",
            "Org1MSP",
            None,
        )
        .unwrap();

    assert_eq!(signed.outcome.signature_count, 0);
    assert!(signed.outcome.signed_by.is_none());
    assert_eq!(signed.envelope, env);
}

#[test]
fn test_json_envelope_input() {
    let msps = multi_party_msps(1);
    let env = configtxlator::update::wrap_update(
        &pending_update(),
        "mychannel",
        EnvelopeDefaults::default(),
    );
    let json = codec::to_json(&env).unwrap();

    let signed = Translator::default()
        .sign_envelope(
            &Input::bytes(json).with_json(true),
            "mychannel",
            msps[0].msp_id(),
            Some(msps[0].path()),
        )
        .unwrap();
    assert_eq!(signatures(&signed.envelope).signatures.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_signatures_only_grow(rounds in 1usize..5) {
        let msps = multi_party_msps(2);
        let signers: Vec<_> = msps
            .iter()
            .map(|msp| resolve_signer(msp.msp_id(), Some(msp.path())).unwrap().unwrap())
            .collect();

        let mut cue = ConfigUpdateEnvelope::new(&pending_update());
        let update_bytes = cue.config_update.clone();

        for round in 0..rounds {
            let before = cue.signatures.clone();
            let signer = &signers[round % signers.len()];
            let outcome =
                sign_config_update_envelope(&mut cue, Some(signer as &dyn Signer)).unwrap();

            prop_assert_eq!(outcome.signature_count, before.len() + 1);
            prop_assert_eq!(&cue.signatures[..before.len()], &before[..]);
            prop_assert_eq!(&cue.config_update, &update_bytes);
        }

        for sig in &cue.signatures {
            prop_assert!(verify_config_signature(sig, &cue.config_update).is_ok());
        }
    }
}
