use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    pub message: String,
}
