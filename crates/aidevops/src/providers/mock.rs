use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Completion, CompletionOptions, Provider, Usage};

/// A mock provider that returns pre-configured responses and records what it was sent
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
    pub calls: Arc<Mutex<Vec<(Vec<Message>, Vec<Tool>, CompletionOptions)>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            calls: Arc::default(),
        }
    }

    /// Create a mock provider whose next call fails with `error`
    pub fn failing<S: Into<String>>(error: S) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(error.into())])),
            calls: Arc::default(),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &CompletionOptions,
    ) -> Result<Completion> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), tools.to_vec(), options.clone()));

        let mut responses = self.responses.lock().unwrap();
        let message = if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Message::assistant().with_text("")
        } else {
            responses.remove(0).map_err(|e| anyhow!(e))?
        };

        let tool_calls: Vec<_> = message
            .tool_requests()
            .filter_map(|request| request.tool_call.as_ref().ok().map(|call| (&request.id, call)))
            .map(|(id, call)| {
                json!({
                    "id": id,
                    "type": "function",
                    "function": {"name": call.name, "arguments": call.arguments.to_string()}
                })
            })
            .collect();
        let mut raw = json!({ "role": "assistant", "content": message.text() });
        if !tool_calls.is_empty() {
            raw["tool_calls"] = json!(tool_calls);
        }

        Ok(Completion {
            raw,
            message,
            usage: Usage::default(),
        })
    }
}
