//! Text-generation backend.
//!
//! [`LlmClient`] is the seam the analysis and QA paths call through.
//! [`OpenAiChatClient`] is the production implementation: one user message
//! to an OpenAI-compatible `/chat/completions` endpoint at temperature 0.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http::{build_http_client, endpoint, post_json, ProviderError};
use crate::config::LlmConfig;

/// Decoding temperature for every model call.
pub const TEMPERATURE: f32 = 0.0;

/// Trait for sending a prompt to a text-generation model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send `prompt` as a single user turn and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Model identifier, recorded alongside stored analyses.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
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

/// OpenAI-compatible chat completion client.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_http_client(config.timeout_secs)?,
            url: endpoint(&config.api_base, "chat/completions"),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "chat completion request");

        let response: ChatResponse =
            post_json(&self.client, &self.url, self.api_key.as_deref(), &request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no message content in choices".into()))?;

        tracing::debug!(model = %self.model, response_len = text.len(), "chat completion received");
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_fixed_temperature() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            temperature: TEMPERATURE,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn response_without_content_is_tolerated_by_decoder() {
        let json = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let config = LlmConfig {
            api_base: "http://127.0.0.1:9".into(),
            api_key: None,
            ..LlmConfig::default()
        };
        let client = OpenAiChatClient::new(&config).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
