use thiserror::Error;

/// Fallback message when an error response body carries no usable `message`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Normalized failure from a registry exchange.
///
/// Transport errors, unexpected status codes, and unparseable bodies all
/// collapse into a single message string; callers wrap that message into the
/// error kind of whatever operation was in progress.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Response(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{}", UNKNOWN_ERROR_MESSAGE)]
    MalformedBody,
}

impl ApiError {
    /// Build an error for a non-success response, extracting the body's
    /// `message` field when present.
    pub fn from_response(body: &str) -> Self {
        ApiError::Response(extract_message(body))
    }

    /// The caller-facing message for this failure.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Best-effort extraction of the `message` field from a JSON error body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}
