use serde::{Deserialize, Serialize};

/// Threshold applied when the caller's config omits one.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// One analysis job, as requested by the consuming backend.
///
/// Immutable once constructed; thresholds are passed through to the prompt
/// as given, without clamping.
#[derive(Debug, Clone)]
pub enum AnalysisTask {
    /// Does the named product appear on a photographed receipt?
    ReceiptCheck {
        target_product_key: String,
        confidence_threshold: f64,
    },
    /// Does the user's photo show the same product as the reference image?
    InventoryCompare {
        answer_image_url: String,
        confidence_threshold: f64,
    },
}

/// Raw uploaded image bytes plus their MIME content type.
///
/// Lives for the duration of a single request; never persisted.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    /// Build a payload, defaulting the content type to `image/jpeg` when the
    /// upload did not carry one.
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.unwrap_or_else(|| "image/jpeg".to_string()),
        }
    }
}

/// The fixed-shape judgment returned to the consuming backend (camelCase on
/// the wire, matching its `AiJudgmentResult` contract).
///
/// Invariant: `raw_json` is always syntactically valid JSON text — either the
/// model's parsed answer re-serialized, or the fallback object when the answer
/// could not be parsed. Non-ASCII characters are preserved literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub confidence: f64,
    pub retry_hint: Option<String>,
    pub raw_json: String,
}
