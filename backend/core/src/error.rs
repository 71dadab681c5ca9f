use thiserror::Error;

/// Top-level error type for the snapjudge runtime.
#[derive(Debug, Error)]
pub enum SnapjudgeError {
    /// Non-success status or transport failure from an upstream service
    /// (the model endpoint or a reference-image host). Never retried locally;
    /// surfaced at the HTTP boundary as a server-side failure.
    #[error("remote service error ({service}): {message}")]
    Remote { service: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SnapjudgeError {
    /// Shorthand for a remote failure attributed to a named upstream.
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            service: service.into(),
            message: message.into(),
        }
    }
}
