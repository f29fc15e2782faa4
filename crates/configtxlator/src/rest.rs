//! REST surface over the translator.
//!
//! Every handler decodes its request, runs one synchronous translator
//! operation, and answers with the encoded result. Signing loads key
//! material from disk, so it runs on the blocking pool. Failures are plain
//! text: 400 when the request itself is at fault, 500 otherwise.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use configtx_core::DynMessage;
use configtx_io::Input;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{self, TranslatorError};
use crate::sign::SignedEnvelope;
use crate::translator::Translator;

/// Largest request body accepted. Channel configs with many organizations
/// outgrow the axum default.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

type SharedTranslator = Arc<Translator>;

/// A failed request: status plus a plain-text explanation.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn field(name: &str, err: impl std::fmt::Display) -> Self {
        Self::bad_request(format!("Error with field '{}': {}", name, err))
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TranslatorError> for ApiError {
    fn from(err: TranslatorError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
        } else {
            debug!(status = %self.status, error = %self.message, "request rejected");
        }
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self.message),
        )
            .into_response()
    }
}

type ApiResult = std::result::Result<Response, ApiError>;

fn binary(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, OCTET_STREAM)], bytes).into_response()
}

fn json(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, JSON)], bytes).into_response()
}

/// A fully buffered multipart form.
///
/// Fields are read up front so handlers can look them up by name in any
/// order. A repeated name keeps its last value.
struct Form {
    fields: HashMap<String, Bytes>,
}

impl Form {
    async fn read(mut multipart: Multipart) -> std::result::Result<Self, ApiError> {
        let mut fields = HashMap::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::field(&name, e))?;
            fields.insert(name, data);
        }
        Ok(Self { fields })
    }

    /// A required field's raw bytes.
    fn file(&self, name: &str) -> std::result::Result<Input, ApiError> {
        self.fields
            .get(name)
            .map(|data| Input::bytes(data.to_vec()))
            .ok_or_else(|| ApiError::field(name, "missing"))
    }

    /// An optional text field; absent reads as empty.
    fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|data| String::from_utf8_lossy(data).trim().to_string())
            .unwrap_or_default()
    }

    /// A checkbox-style field: present and not an explicit "false"/"0".
    fn flag(&self, name: &str) -> bool {
        if !self.fields.contains_key(name) {
            return false;
        }
        !matches!(self.text(name).to_ascii_lowercase().as_str(), "false" | "0" | "off" | "no")
    }
}

fn msp_dir(dir: &str) -> Option<&Path> {
    (!dir.is_empty()).then(|| Path::new(dir))
}

/// The signing fields shared by both signing endpoints.
struct SigningRequest {
    input: Input,
    msp_id: String,
    msp_dir: Option<PathBuf>,
    channel_id: String,
}

impl SigningRequest {
    fn from_form(form: &Form, input_field: &str) -> std::result::Result<Self, ApiError> {
        Ok(Self {
            input: form.file(input_field)?,
            msp_id: form.text("mspID"),
            msp_dir: msp_dir(&form.text("mspDir")).map(Path::to_path_buf),
            channel_id: form.text("channelID"),
        })
    }

    /// Run `op` on the blocking pool and encode the signed envelope.
    async fn run<F>(self, translator: SharedTranslator, op: F) -> ApiResult
    where
        F: FnOnce(&Translator, &Input, &str, &str, Option<&Path>) -> error::Result<SignedEnvelope>
            + Send
            + 'static,
    {
        let signed = tokio::task::spawn_blocking(move || {
            op(
                &translator,
                &self.input,
                &self.channel_id,
                &self.msp_id,
                self.msp_dir.as_deref(),
            )
        })
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("signing task failed: {}", e),
        })??;
        Ok(binary(signed.envelope.encode_binary()))
    }
}

async fn encode(
    State(translator): State<SharedTranslator>,
    UrlPath(msg_name): UrlPath<String>,
    body: Bytes,
) -> ApiResult {
    let input = Input::bytes(body.to_vec()).with_json(true);
    let message = translator.decode(&msg_name, &input)?;
    Ok(binary(message.encode_binary()))
}

async fn decode(
    State(translator): State<SharedTranslator>,
    UrlPath(msg_name): UrlPath<String>,
    body: Bytes,
) -> ApiResult {
    let message = translator.decode(&msg_name, &Input::bytes(body.to_vec()))?;
    let rendered = message.to_json().map_err(TranslatorError::from)?;
    Ok(json(rendered))
}

async fn compute_update_from_configs(
    State(translator): State<SharedTranslator>,
    multipart: Multipart,
) -> ApiResult {
    let form = Form::read(multipart).await?;
    let original = form.file("original")?;
    let updated = form.file("updated")?;
    let channel_id = form.text("channel");
    let wrap = form.flag("envelope");

    let output = translator.compute_update(&original, &updated, &channel_id, wrap)?;
    Ok(binary(output.as_message().encode_binary()))
}

async fn verify_config(State(translator): State<SharedTranslator>, body: Bytes) -> ApiResult {
    let messages = translator.verify(&Input::bytes(body.to_vec()))?;
    let rendered = messages
        .to_json()
        .map_err(|e| TranslatorError::Encode(e.to_string()))?;
    Ok(json(rendered))
}

async fn sign_config_update_envelope(
    State(translator): State<SharedTranslator>,
    multipart: Multipart,
) -> ApiResult {
    let form = Form::read(multipart).await?;
    SigningRequest::from_form(&form, "configUpdateEnvelope")?
        .run(translator, Translator::sign_config_update_envelope)
        .await
}

async fn sign_config_update(
    State(translator): State<SharedTranslator>,
    multipart: Multipart,
) -> ApiResult {
    let form = Form::read(multipart).await?;
    SigningRequest::from_form(&form, "configUpdate")?
        .run(translator, Translator::sign_config_update)
        .await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    cors.allow_origin(origins)
}

/// Build the router. CORS headers are only sent when `cors_origins` is
/// non-empty.
pub fn router(translator: SharedTranslator, cors_origins: &[String]) -> Router {
    let app = Router::new()
        .route("/protolator/encode/:msg_name", post(encode))
        .route("/protolator/decode/:msg_name", post(decode))
        .route(
            "/configtxlator/compute/update-from-configs",
            post(compute_update_from_configs),
        )
        .route("/configtxlator/config/verify", post(verify_config))
        .route(
            "/configtxlator/config/sign-config-update-envelope",
            post(sign_config_update_envelope),
        )
        .route(
            "/configtxlator/config/sign-config-update",
            post(sign_config_update),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(translator);

    if cors_origins.is_empty() {
        app
    } else {
        app.layer(cors_layer(cors_origins))
    }
}

/// Bind and serve until the process exits.
pub async fn serve(translator: Translator, config: &ServerConfig) -> anyhow::Result<()> {
    let app = router(Arc::new(translator), &config.cors_origins);

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Error binding {}", config.bind_address()))?;
    info!(addr = %listener.local_addr()?, "Serving HTTP requests");

    axum::serve(listener, app)
        .await
        .context("Error starting server")
}

#[cfg(test)]
mod tests {
    use super::*;
    use configtx_core::CoreError;

    #[test]
    fn test_error_status_mapping() {
        let unknown: ApiError = TranslatorError::UnknownMessageType("x.Y".into()).into();
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);

        let encode: ApiError = TranslatorError::from(CoreError::Encode("boom".into())).into();
        assert_eq!(encode.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_msp_dir_empty_is_none() {
        assert!(msp_dir("").is_none());
        assert_eq!(msp_dir("/msp"), Some(Path::new("/msp")));
    }

    #[test]
    fn test_form_flag() {
        let mut fields = HashMap::new();
        fields.insert("envelope".to_string(), Bytes::from_static(b"true"));
        fields.insert("off".to_string(), Bytes::from_static(b"false"));
        fields.insert("bare".to_string(), Bytes::new());
        let form = Form { fields };

        assert!(form.flag("envelope"));
        assert!(!form.flag("off"));
        assert!(form.flag("bare"));
        assert!(!form.flag("missing"));
        assert_eq!(form.text("missing"), "");
    }
}
