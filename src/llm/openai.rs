// file: src/llm/openai.rs
// description: OpenAI compatible chat completions client
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::config::OpenAiConfig;
use crate::error::{RagError, Result};
use crate::llm::{ChatMessage, ChatModel};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiChat {
    pub fn new(api_key: String, config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
            temperature: config.temperature,
        })
    }

    fn first_choice(response: ChatResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| RagError::Llm("Chat completion returned no choices".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Llm(format!("Failed to send chat request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagError::Llm(format!(
                "Chat request failed with status {}: {}",
                status, error_text
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::Llm(format!("Failed to parse chat response: {}", e)))?;

        Self::first_choice(body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_request_serialization() {
        let messages = vec![ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_first_choice_extracted() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"  Paris.\n"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAiChat::first_choice(response).unwrap(), "Paris.");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAiChat::first_choice(response),
            Err(RagError::Llm(_))
        ));
    }

    #[test]
    fn test_model_from_config() {
        let config = Config::default_config();
        let chat = OpenAiChat::new("sk".to_string(), &config.openai).unwrap();
        assert_eq!(chat.model(), "gpt-3.5-turbo");
    }
}
