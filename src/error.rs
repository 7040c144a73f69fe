use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Upstream bodies are cut to this many characters before they reach an error.
pub const BODY_SNIPPET_LEN: usize = 300;

#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{provider} status={}, body={body_snippet}", display_status(.status))]
    Upstream {
        provider: &'static str,
        status: Option<u16>,
        body_snippet: String,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

impl StatsError {
    pub fn missing_key(var: &str) -> Self {
        StatsError::Config(format!("{} is not set", var))
    }

    pub fn upstream(provider: &'static str, status: Option<u16>, body: &str) -> Self {
        StatsError::Upstream {
            provider,
            status,
            body_snippet: snippet(body),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

/// First [`BODY_SNIPPET_LEN`] characters of `body`, on a char boundary.
pub fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Request failed");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
