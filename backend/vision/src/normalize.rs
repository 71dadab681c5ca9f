//! Normalization of free-form model completions into [`AnalysisResult`].
//!
//! Models wrap their JSON in Markdown fences, truncate it, or answer in prose.
//! Whatever comes back, this module returns a well-formed result: a genuine
//! parse when possible, the fixed fallback object otherwise. It never returns
//! an error; downstream consumers must not see parse exceptions.

use serde_json::{json, Value};
use snapjudge_core::AnalysisResult;
use tracing::warn;

/// Retry hint substituted when the completion cannot be parsed. Korean, like
/// every user-facing hint in this service.
pub const PARSE_FAILURE_HINT: &str = "AI 응답을 파싱할 수 없습니다. 다시 시도해주세요.";

/// Remove Markdown code-fence wrapping, if present.
///
/// When the trimmed text starts with a triple backtick, the first line is
/// dropped (it carries the fence and optional language tag) along with any
/// remaining line that is itself a fence marker. Unfenced text passes through
/// trimmed. Idempotent.
pub fn strip_code_fences(raw: &str) -> String {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a raw model completion into the guaranteed-shape result.
///
/// Any failure (unparseable text, non-object JSON) logs the offending raw
/// text at WARN and substitutes the fallback object before projection.
pub fn normalize_completion(raw: &str) -> AnalysisResult {
    let object = match serde_json::from_str::<Value>(&strip_code_fences(raw)) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            warn!(raw_completion = %raw, "failed to parse model response");
            fallback_object()
        }
    };
    project(&object)
}

fn fallback_object() -> Value {
    json!({
        "match": false,
        "confidence": 0.0,
        "retryHint": PARSE_FAILURE_HINT,
    })
}

/// Project a (parsed or fallback) object onto the result contract, with named
/// defaults per field. `raw_json` is the re-serialization of the object
/// actually used; serde_json leaves non-ASCII characters unescaped.
fn project(object: &Value) -> AnalysisResult {
    AnalysisResult {
        is_match: object.get("match").and_then(Value::as_bool).unwrap_or(false),
        confidence: object
            .get("confidence")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        retry_hint: object
            .get("retryHint")
            .and_then(Value::as_str)
            .map(str::to_string),
        raw_json: object.to_string(),
    }
}
