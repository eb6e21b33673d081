use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::retry::Retryable;

/// Failure talking to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LlmError {
    #[display("LLM API error {status}: {message}")]
    Http { status: u16, message: String },
    #[display("LLM request failed: {_0}")]
    Transport(#[error(not(source))] String),
    #[display("LLM returned an empty response")]
    EmptyResponse,
    #[display("Failed to parse LLM response: {_0}")]
    Decode(#[error(not(source))] String),
    #[display("Failed to create HTTP client: {_0}")]
    ClientBuild(#[error(not(source))] String),
}

impl Retryable for LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            // 529 is the "overloaded" status some providers use
            LlmError::Http { status, .. } => {
                matches!(*status, 408 | 429 | 500 | 502 | 503 | 504 | 529)
            }
            LlmError::Transport(_) | LlmError::EmptyResponse => true,
            LlmError::Decode(_) | LlmError::ClientBuild(_) => false,
        }
    }
}

/// A service that turns a prompt into free text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    search_parameters: SearchParameters,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct SearchParameters {
    mode: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for xAI's OpenAI-compatible chat completions endpoint.
pub struct XaiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl XaiClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.x.ai/v1";
    pub const DEFAULT_MODEL: &'static str = "grok-4";

    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for XaiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: 0.7,
            max_tokens: 800,
            // Lets the model use live search for fresh headlines
            search_parameters: SearchParameters { mode: "auto" },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(LlmError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let overloaded = LlmError::Http {
            status: 503,
            message: "overloaded".into(),
        };
        let unauthorized = LlmError::Http {
            status: 401,
            message: "bad key".into(),
        };

        assert!(overloaded.is_retryable());
        assert!(LlmError::EmptyResponse.is_retryable());
        assert!(LlmError::Transport("reset".into()).is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(!LlmError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "grok-4",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
            temperature: 0.7,
            max_tokens: 800,
            search_parameters: SearchParameters { mode: "auto" },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "grok-4");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["search_parameters"]["mode"], "auto");
    }
}
