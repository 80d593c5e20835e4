use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// How the model may pick from the offered tools
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub tool_choice: ToolChoice,
    /// Number of candidates to request; only the first is used
    pub candidates: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            tool_choice: ToolChoice::Auto,
            candidates: 1,
        }
    }
}

/// The first candidate returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The candidate parsed into the internal message format
    pub message: Message,
    /// The candidate exactly as the provider returned it
    pub raw: Value,
    pub usage: Usage,
}

/// Base trait for AI providers (OpenAI, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the conversation and tools to the model and return its first candidate
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &CompletionOptions,
    ) -> Result<Completion>;
}
