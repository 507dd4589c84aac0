//! Typed error enum for the text generation provider.

use thiserror::Error;

/// Errors from a text generation call.
///
/// None of these are retried; the insight generator falls back to the
/// rule-based narrative on any of them.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("empty response: no text content returned")]
    EmptyResponse,
    #[error("client initialization failed: {0}")]
    ClientInit(String),
}

impl GenerationError {
    /// Short operator hint for status codes with a known cause.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::HttpStatus { code: 401, .. } => Some("invalid API key, check HABIT_TRACKER_API_KEY"),
            Self::HttpStatus { code: 429, .. } => Some("rate limit reached, try again later"),
            Self::HttpStatus { code: 400, .. } => Some("malformed request, check the prompt format"),
            _ => None,
        }
    }
}
