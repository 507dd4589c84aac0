use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::llm::error::GenerationError;
use crate::llm::types::{ErrorResponse, Message, MessagesRequest, MessagesResponse};
use crate::llm::TextGenerator;

/// Value of the `anthropic-version` header.
pub const API_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicClient {
    /// Builds a client from provider settings.
    ///
    /// # Errors
    /// Returns `ClientInit` if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenerationError::ClientInit("no API key configured".to_owned()))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user-role prompt and return the first text block.
    ///
    /// # Errors
    /// Returns an error if the request fails, the API answers with a
    /// non-success status, or the body has no text content.
    pub async fn create_message(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message { role: "user".to_owned(), content: prompt.to_owned() }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "text provider responded");

        let body = response.text().await?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(parsed) => {
                    if let Some(kind) = parsed.error.error_type {
                        tracing::debug!(error_type = %kind, "text provider error");
                    }
                    parsed.error.message
                }
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
            };
            return Err(GenerationError::HttpStatus { code: status.as_u16(), message });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::JsonParse {
                context: format!("messages response (body: {})", truncate(&body, 200)),
                source: e,
            })?;

        parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.create_message(prompt).await
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
