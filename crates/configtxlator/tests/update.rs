//! Update computation through the translator, from encoded inputs.

use base64::Engine;
use configtx_core::{
    codec, envelope, Config, ConfigUpdate, ConfigUpdateEnvelope, ConfigValue, Consortium,
    HeaderType,
};
use configtx_io::{Input, Output};
use configtxlator::{Translator, TranslatorConfig, TranslatorError, UpdateOutput};
use configtxlator_testkit::{generators::channel_id, sample_config, ConfigPairParams};
use proptest::prelude::*;
use prost::Message;

fn binary(config: &Config) -> Input {
    Input::bytes(codec::encode_binary(config))
}

fn bare(output: UpdateOutput) -> ConfigUpdate {
    match output {
        UpdateOutput::Update(update) => update,
        other => panic!("expected a bare update, got {:?}", other),
    }
}

fn with_consortium(mut config: Config) -> Config {
    let group = config.channel_group.as_mut().unwrap();
    group.values.insert(
        "Consortium".into(),
        ConfigValue {
            version: 0,
            value: Consortium {
                name: "SampleConsortium".into(),
            }
            .encode_to_vec(),
            mod_policy: "Admins".into(),
        },
    );
    config
}

#[test]
fn test_identical_configs_give_empty_update() {
    let update = bare(
        Translator::default()
            .compute_update(
                &binary(&sample_config()),
                &binary(&sample_config()),
                "mychannel",
                false,
            )
            .unwrap(),
    );
    assert_eq!(update.channel_id, "mychannel");
    assert!(update.read_set.is_none());
    assert!(update.write_set.is_none());
}

#[test]
fn test_mixed_input_encodings() {
    let original = codec::to_json(&sample_config()).unwrap();
    let updated = base64::engine::general_purpose::STANDARD
        .encode(codec::encode_binary(&with_consortium(sample_config())));

    let update = bare(
        Translator::default()
            .compute_update(
                &Input::bytes(original).with_json(true),
                &Input::bytes(format!("{}\n", updated)).with_base64(true),
                "mychannel",
                false,
            )
            .unwrap(),
    );

    let write_set = update.write_set.unwrap();
    assert_eq!(write_set.values["Consortium"].version, 0);
    // Membership changed, so the channel group itself is bumped.
    assert_eq!(write_set.version, 1);
}

#[test]
fn test_envelope_uses_configured_scalars() {
    let translator = Translator::new(TranslatorConfig::default().with_envelope(3, 9));
    let out = translator
        .compute_update(
            &binary(&sample_config()),
            &binary(&with_consortium(sample_config())),
            "mychannel",
            true,
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("update.pb");
    Output::file(&path).emit_dyn(out.as_message()).unwrap();

    let env: configtx_core::Envelope = Input::file(&path).decode().unwrap();
    let header = envelope::channel_header(&env).unwrap();
    assert_eq!(header.header_type(), Some(HeaderType::ConfigUpdate));
    assert_eq!((header.version, header.epoch), (3, 9));

    let cue: ConfigUpdateEnvelope = envelope::unwrap(&env).unwrap();
    assert!(cue.signatures.is_empty());
}

#[test]
fn test_missing_channel_group_is_rejected() {
    let err = Translator::default()
        .compute_update(
            &binary(&Config::default()),
            &binary(&sample_config()),
            "mychannel",
            false,
        )
        .unwrap_err();
    assert!(matches!(err, TranslatorError::DiffComputation(_)));
    assert!(err.is_client_error());
}

#[test]
fn test_garbage_input_is_decode_error() {
    let err = Translator::default()
        .compute_update(
            &Input::bytes(vec![0xff, 0xff]),
            &binary(&sample_config()),
            "mychannel",
            false,
        )
        .unwrap_err();
    assert!(matches!(err, TranslatorError::Decode(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_channel_id_always_stamped(pair in any::<ConfigPairParams>(), channel in channel_id()) {
        let update = bare(
            Translator::default()
                .compute_update(&binary(&pair.original), &binary(&pair.updated), &channel, false)
                .unwrap(),
        );
        prop_assert_eq!(&update.channel_id, &channel);

        let write_set = update.write_set.unwrap();
        prop_assert!(write_set.values.contains_key(&pair.added_value));
    }
}
