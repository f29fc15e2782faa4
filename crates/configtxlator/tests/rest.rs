//! REST handlers driven through the router without a socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use configtx_core::{
    codec, envelope, Config, ConfigUpdate, ConfigUpdateEnvelope, ConfigValue, Envelope,
};
use configtx_msp::verify_config_signature;
use configtxlator::{rest, Translator};
use configtxlator_testkit::{sample_config, TestMsp};
use tower::ServiceExt;

const BOUNDARY: &str = "configtxlator-test-boundary";

fn app() -> Router {
    rest::router(Arc::new(Translator::default()), &[])
}

/// A multipart/form-data body. Every field is sent as a file part.
#[derive(Default)]
struct Form {
    body: Vec<u8>,
}

impl Form {
    fn field(mut self, name: &str, data: impl AsRef<[u8]>) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, name
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data.as_ref());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}

async fn post(uri: &str, body: Vec<u8>) -> (StatusCode, Vec<u8>) {
    send(Request::builder().method("POST").uri(uri).body(Body::from(body)).unwrap()).await
}

async fn post_form(uri: &str, form: Form) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(form.finish()))
        .unwrap();
    send(request).await
}

async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn edited_config() -> Config {
    let mut config = sample_config();
    config.channel_group.as_mut().unwrap().values.insert(
        "Consortium".into(),
        ConfigValue {
            version: 0,
            value: Vec::new(),
            mod_policy: "Admins".into(),
        },
    );
    config
}

#[tokio::test]
async fn test_decode_then_encode() {
    let binary = codec::encode_binary(&sample_config());

    let (status, json) = post("/protolator/decode/common.Config", binary.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let parsed: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(parsed["sequence"], "3");
    assert!(parsed["channel_group"]["groups"]["Application"].is_object());

    let (status, back) = post("/protolator/encode/common.Config", json).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(back, binary);
}

#[tokio::test]
async fn test_encode_minimal_config() {
    let (status, body) = post(
        "/protolator/encode/common.Config",
        br#"{"channel_group":{"version":"0"}}"#.to_vec(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hex::encode(body), "1200");
}

#[tokio::test]
async fn test_unknown_message_type_is_bad_request() {
    let (status, body) = post("/protolator/decode/common.Nope", Vec::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("common.Nope"));
}

#[tokio::test]
async fn test_garbage_body_is_bad_request() {
    let (status, _) =
        post("/protolator/decode/common.Config", vec![0xff, 0xff, 0xff]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post("/protolator/encode/common.Config", b"{not json".to_vec()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compute_update_from_configs() {
    let original = codec::encode_binary(&sample_config());
    let updated = codec::encode_binary(&edited_config());

    let (status, body) = post_form(
        "/configtxlator/compute/update-from-configs",
        Form::default()
            .field("original", &original)
            .field("updated", &updated)
            .field("channel", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let update: ConfigUpdate = codec::decode_binary(&body).unwrap();
    assert_eq!(update.channel_id, "mychannel");
    assert!(update.write_set.unwrap().values.contains_key("Consortium"));
}

#[tokio::test]
async fn test_compute_update_wrapped() {
    let original = codec::encode_binary(&sample_config());
    let updated = codec::encode_binary(&edited_config());

    let (status, body) = post_form(
        "/configtxlator/compute/update-from-configs",
        Form::default()
            .field("original", &original)
            .field("updated", &updated)
            .field("channel", "mychannel")
            .field("envelope", "true"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let env: Envelope = codec::decode_binary(&body).unwrap();
    let cue: ConfigUpdateEnvelope = envelope::unwrap(&env).unwrap();
    assert!(cue.signatures.is_empty());
    assert_eq!(envelope::channel_header(&env).unwrap().channel_id, "mychannel");
}

#[tokio::test]
async fn test_compute_update_missing_field() {
    let original = codec::encode_binary(&sample_config());
    let (status, body) = post_form(
        "/configtxlator/compute/update-from-configs",
        Form::default()
            .field("original", &original)
            .field("channel", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("Error with field 'updated'"));
}

#[tokio::test]
async fn test_compute_update_rejects_empty_config() {
    let empty = codec::encode_binary(&Config::default());
    let updated = codec::encode_binary(&sample_config());
    let (status, _) = post_form(
        "/configtxlator/compute/update-from-configs",
        Form::default()
            .field("original", &empty)
            .field("updated", &updated)
            .field("channel", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_reports_dangling_mod_policy() {
    let mut config = sample_config();
    config
        .channel_group
        .as_mut()
        .unwrap()
        .values
        .get_mut("HashingAlgorithm")
        .unwrap()
        .mod_policy = "/Channel/Nowhere".into();

    let (status, body) =
        post("/configtxlator/config/verify", codec::encode_binary(&config)).await;
    assert_eq!(status, StatusCode::OK);

    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let errors = parsed["element_errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["path"], "[Value] /Channel/HashingAlgorithm");
}

#[tokio::test]
async fn test_sign_config_update() {
    let msp = TestMsp::new("Org1MSP", 1);
    let update = codec::encode_binary(&ConfigUpdate {
        channel_id: "mychannel".into(),
        ..Default::default()
    });
    let dir = msp.path().to_string_lossy().into_owned();

    let (status, body) = post_form(
        "/configtxlator/config/sign-config-update",
        Form::default()
            .field("configUpdate", &update)
            .field("mspID", "Org1MSP")
            .field("mspDir", &dir)
            .field("channelID", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let env: Envelope = codec::decode_binary(&body).unwrap();
    let cue: ConfigUpdateEnvelope = envelope::unwrap(&env).unwrap();
    assert_eq!(cue.config_update, update);
    assert_eq!(cue.signatures.len(), 1);
    let creator = verify_config_signature(&cue.signatures[0], &cue.config_update).unwrap();
    assert_eq!(creator.mspid, "Org1MSP");
}

#[tokio::test]
async fn test_sign_envelope_without_msp_dir_is_unchanged() {
    let cue = ConfigUpdateEnvelope::new(&ConfigUpdate {
        channel_id: "mychannel".into(),
        ..Default::default()
    });
    let bytes = codec::encode_binary(&cue);

    let (status, body) = post_form(
        "/configtxlator/config/sign-config-update-envelope",
        Form::default()
            .field("configUpdateEnvelope", &bytes)
            .field("mspID", "Org1MSP")
            .field("mspDir", "")
            .field("channelID", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let env: Envelope = codec::decode_binary(&body).unwrap();
    let rewrapped: ConfigUpdateEnvelope = envelope::unwrap(&env).unwrap();
    assert_eq!(rewrapped, cue);
}

#[tokio::test]
async fn test_sign_with_missing_msp_dir_is_server_error() {
    let missing = tempfile::tempdir().unwrap().path().join("no-such-msp");
    let update = codec::encode_binary(&ConfigUpdate::default());
    let dir = missing.to_string_lossy().into_owned();

    let (status, body) = post_form(
        "/configtxlator/config/sign-config-update",
        Form::default()
            .field("configUpdate", &update)
            .field("mspID", "Org1MSP")
            .field("mspDir", &dir)
            .field("channelID", "mychannel"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.is_empty());
}
