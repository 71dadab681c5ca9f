//! Process settings for the snapjudge service.
//!
//! Everything is read from environment variables exactly once at startup and
//! treated as read-only afterwards. Missing credentials fail the process early
//! instead of surfacing as opaque upstream errors at request time.

use std::collections::HashMap;
use std::net::SocketAddr;

use snapjudge_core::SnapjudgeError;

/// Default multipart part-size cap: 10 MiB, enough for phone camera uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Read-only service configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the OpenAI-compatible vision endpoint (no trailing slash).
    pub api_url: String,
    /// Bearer token for the vision endpoint.
    pub api_key: String,
    /// Model identifier sent with every chat-completion request.
    pub model: String,
    /// Address the HTTP gateway binds to.
    pub bind_addr: SocketAddr,
    /// Maximum accepted multipart body size, applied at the router layer.
    pub max_upload_bytes: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, SnapjudgeError> {
        Self::from_env_map(&std::env::vars().collect())
    }

    /// Load settings from a provided map (useful for testing).
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self, SnapjudgeError> {
        let api_url = require(env, "INVENTORY_API_URL")?
            .trim_end_matches('/')
            .to_string();
        let api_key = require(env, "INVENTORY_API_KEY")?;

        let model = get_or(env, "INVENTORY_MODEL", DEFAULT_MODEL);

        let bind_addr: SocketAddr = get_or(env, "SNAPJUDGE_BIND", DEFAULT_BIND)
            .parse()
            .map_err(|e| {
                SnapjudgeError::Config(format!("invalid SNAPJUDGE_BIND address: {e}"))
            })?;

        let max_upload_bytes = match env.get("SNAPJUDGE_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|e| {
                SnapjudgeError::Config(format!("invalid SNAPJUDGE_MAX_UPLOAD_BYTES: {e}"))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            api_url,
            api_key,
            model,
            bind_addr,
            max_upload_bytes,
            log_level: get_or(env, "SNAPJUDGE_LOG_LEVEL", "info"),
        })
    }
}

fn require(env: &HashMap<String, String>, key: &str) -> Result<String, SnapjudgeError> {
    match env.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SnapjudgeError::Config(format!(
            "missing required env var {key}"
        ))),
    }
}

fn get_or(env: &HashMap<String, String>, key: &str, default: &str) -> String {
    env.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}
