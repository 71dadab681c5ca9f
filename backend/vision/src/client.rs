//! HTTP client for the OpenAI-compatible vision endpoint.
//!
//! One `ModelClient` is built at startup and shared across requests; it holds
//! the endpoint location, credentials, and a pooled `reqwest` client. Remote
//! failures (transport errors or non-success statuses) are never retried here.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use snapjudge_core::SnapjudgeError;
use tracing::debug;

/// Timeout for one chat-completion call.
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for fetching a reference image by URL.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Completion-token cap sent with every request.
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// Client for the external vision model and reference-image hosts.
#[derive(Debug, Clone)]
pub struct ModelClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ModelClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Send one chat-completion request and return the first choice's raw
    /// text content, unparsed.
    ///
    /// A 200 whose body carries no choice (or a null content) yields an empty
    /// completion; the normalizer turns that into the fallback result.
    pub async fn complete(&self, messages: Vec<Value>) -> Result<String, SnapjudgeError> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_completion_tokens": MAX_COMPLETION_TOKENS,
        });

        debug!(model = %self.model, "calling chat completions");
        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.api_url))
            .bearer_auth(&self.api_key)
            .timeout(CHAT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SnapjudgeError::remote("model endpoint", e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SnapjudgeError::remote(
                "model endpoint",
                format!("status {status}"),
            ));
        }

        let completion: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| SnapjudgeError::remote("model endpoint", e.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Download a reference image and re-encode it as a base64 data URI.
    ///
    /// The content-type response header is used as the MIME type, with any
    /// parameters after `;` stripped; `image/jpeg` when absent or unreadable.
    pub async fn fetch_image_as_data_uri(&self, url: &str) -> Result<String, SnapjudgeError> {
        let resp = self
            .http
            .get(url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| SnapjudgeError::remote("reference image", e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SnapjudgeError::remote(
                "reference image",
                format!("status {status}"),
            ));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "image/jpeg".to_string());

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SnapjudgeError::remote("reference image", e.to_string()))?;

        Ok(format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes)))
    }
}
