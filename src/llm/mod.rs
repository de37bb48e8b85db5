// file: src/llm/mod.rs
// description: chat model seam, prompts and the conversational retrieval chain
// reference: internal module structure

pub mod chain;
pub mod openai;
pub mod prompt;

pub use chain::ConversationalRetrievalChain;
pub use openai::OpenAiChat;
pub use prompt::PromptBuilder;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Prompts go out as a single user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn model(&self) -> &str;
}
