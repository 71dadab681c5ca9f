//! Analysis endpoints: multipart upload handling and input validation.
//!
//! Both endpoints take an `image` file part and a `config` JSON text part.
//! Bad input is rejected with 422 before the core runs; upstream failures map
//! to an opaque 502; malformed model output is not an error at all and comes
//! back as a normal 200 with the fallback result inside.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use snapjudge_core::{
    AnalysisResult, ImagePayload, SnapjudgeError, DEFAULT_CONFIDENCE_THRESHOLD,
};
use tracing::error;

use crate::server::GatewayState;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// Client-side input problem; the detail names the offending part/field.
    UnprocessableEntity(String),
    /// Upload exceeded the configured multipart size cap.
    PayloadTooLarge,
    /// Upstream call failed. Deliberately opaque: upstream error bodies are
    /// logged, never forwarded to clients.
    Upstream,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::UnprocessableEntity(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "uploaded image is too large".to_string(),
            ),
            ApiError::Upstream => (
                StatusCode::BAD_GATEWAY,
                "upstream analysis service failed".to_string(),
            ),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::UnprocessableEntity(format!("malformed multipart body: {}", err.body_text()))
        }
    }
}

impl From<SnapjudgeError> for ApiError {
    fn from(err: SnapjudgeError) -> Self {
        error!(error = %err, "analysis request failed");
        ApiError::Upstream
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptConfig {
    target_product_key: String,
    #[serde(default = "default_threshold")]
    confidence_threshold: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InventoryConfig {
    answer_image_url: String,
    #[serde(default = "default_threshold")]
    confidence_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

/// Handler for `POST /analyze/receipt`.
pub async fn analyze_receipt(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let cfg: ReceiptConfig = parse_config(&upload.config)?;
    if cfg.target_product_key.trim().is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "targetProductKey is required in config".into(),
        ));
    }

    let result = snapjudge_vision::analyze_receipt(
        &state.client,
        &upload.image,
        cfg.target_product_key,
        cfg.confidence_threshold,
    )
    .await?;
    Ok(Json(result))
}

/// Handler for `POST /analyze/inventory`.
pub async fn analyze_inventory(
    State(state): State<GatewayState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let upload = read_upload(multipart).await?;
    let cfg: InventoryConfig = parse_config(&upload.config)?;
    if cfg.answer_image_url.trim().is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "answerImageUrl is required in config".into(),
        ));
    }

    let result = snapjudge_vision::compare_inventory(
        &state.client,
        &upload.image,
        cfg.answer_image_url,
        cfg.confidence_threshold,
    )
    .await?;
    Ok(Json(result))
}

struct AnalyzeUpload {
    image: ImagePayload,
    config: String,
}

/// Pull the `image` and `config` parts out of a multipart body. Unknown parts
/// are ignored; both known parts are required.
async fn read_upload(mut multipart: Multipart) -> Result<AnalyzeUpload, ApiError> {
    let mut image = None;
    let mut config = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                image = Some(ImagePayload::new(bytes.to_vec(), content_type));
            }
            Some("config") => {
                config = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(AnalyzeUpload {
        image: image.ok_or_else(|| {
            ApiError::UnprocessableEntity("image file part is required".into())
        })?,
        config: config.ok_or_else(|| {
            ApiError::UnprocessableEntity("config part is required".into())
        })?,
    })
}

/// Parse the `config` part as JSON; the serde error names any missing field
/// (e.g. `targetProductKey`) in the 422 detail.
fn parse_config<T: DeserializeOwned>(raw: &str) -> Result<T, ApiError> {
    serde_json::from_str(raw)
        .map_err(|e| ApiError::UnprocessableEntity(format!("config must be valid JSON: {e}")))
}
