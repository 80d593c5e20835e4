use anyhow::Result;
use serde_json::Value;

use crate::context::ContextGatherer;
use crate::models::message::Message;
use crate::prompt::{create_messages, ContextItem};
use crate::providers::base::{Completion, CompletionOptions, Provider};
use crate::tools::pipeline_tools;

/// Assistant answers one prompt at a time, grounding the model in the gathered repo context
pub struct Assistant {
    provider: Box<dyn Provider + Send + Sync>,
    gatherer: ContextGatherer,
    system_prompt: String,
    options: CompletionOptions,
}

impl Assistant {
    /// Create a new Assistant that sends `system_prompt` ahead of every conversation
    pub fn new<S: Into<String>>(
        provider: Box<dyn Provider + Send + Sync>,
        gatherer: ContextGatherer,
        system_prompt: S,
    ) -> Self {
        Self {
            provider,
            gatherer,
            system_prompt: system_prompt.into(),
            options: CompletionOptions::default(),
        }
    }

    /// Gather context, assemble the conversation and ask the model exactly once
    pub async fn reply(&self, prompt: &str, extra_context: &[ContextItem]) -> Result<Completion> {
        let gatherer = self.gatherer.clone();
        let gathered = tokio::task::spawn_blocking(move || gatherer.gather()).await??;

        let messages = create_messages(&self.system_prompt, prompt, &gathered.text, extra_context);
        let tools = pipeline_tools();

        let completion = self
            .provider
            .complete(&messages, &tools, &self.options)
            .await?;

        log_tool_calls(&completion.raw, &completion.message);
        Ok(completion)
    }
}

/// Name and argument blob of each tool call in a raw assistant message, exactly as sent
fn invoked_tools(raw: &Value) -> Vec<(&str, &str)> {
    let Some(tool_calls) = raw.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    tool_calls
        .iter()
        .map(|tool_call| {
            let function = &tool_call["function"];
            (
                function["name"].as_str().unwrap_or_default(),
                function["arguments"].as_str().unwrap_or_default(),
            )
        })
        .collect()
}

fn log_tool_calls(raw: &Value, message: &Message) {
    let invoked = invoked_tools(raw);
    if invoked.is_empty() {
        tracing::info!("No tool call made.");
        return;
    }

    for (tool_name, arguments) in invoked {
        tracing::info!(tool_name, arguments, "Made tool call");
    }

    for request in message.tool_requests() {
        if let Err(e) = &request.tool_call {
            tracing::warn!(id = %request.id, "Made invalid tool call: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::models::tool::ToolCall;
    use crate::prompt::{system_prompt, Persona};
    use crate::providers::base::ToolChoice;
    use crate::providers::mock::MockProvider;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn assistant(provider: &MockProvider, folder: &TempDir) -> Assistant {
        Assistant::new(
            Box::new(provider.clone()),
            ContextGatherer::new([folder.path().join("samples"), folder.path().join("dist")]),
            system_prompt(&Persona::default(), None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_reply_without_context_sends_three_messages() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let provider = MockProvider::new(vec![
            Message::assistant().with_text("On which branch should the tests run?")
        ]);

        let completion = assistant(&provider, &temp_dir)
            .reply("Create a pipeline that runs tests on push", &[])
            .await?;
        assert_eq!(completion.message.text(), "On which branch should the tests run?");

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);

        let (messages, tools, options) = &calls[0];
        assert_eq!(messages.len(), 3);
        assert!(messages[0].text().contains("AI Devops Engineer"));
        assert_eq!(messages[1].text(), "Context from the repo: ");
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(messages[2].text(), "Create a pipeline that runs tests on push");

        assert_eq!(tools, &pipeline_tools());
        assert_eq!(options.tool_choice, ToolChoice::Auto);
        assert_eq!(options.candidates, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_includes_files_and_extra_context() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("samples"))?;
        fs::write(temp_dir.path().join("samples/build.yaml"), "kind: pipeline")?;

        let provider = MockProvider::new(vec![Message::assistant().with_tool_request(
            "call_1",
            Ok(ToolCall::new("fix_failed_pipeline", json!({"suggested_fix": "pin go 1.22"}))),
        )]);
        let extra = vec![
            ContextItem::new("Pipeline logs", "go: command not found"),
            ContextItem::new("Pipeline yaml", "kind: pipeline"),
        ];

        let completion = assistant(&provider, &temp_dir)
            .reply("Why did my build fail?", &extra)
            .await?;
        assert_eq!(completion.message.tool_requests().count(), 1);
        assert_eq!(
            invoked_tools(&completion.raw),
            vec![("fix_failed_pipeline", "{\"suggested_fix\":\"pin go 1.22\"}")]
        );

        let calls = provider.calls.lock().unwrap();
        let (messages, _, _) = &calls[0];
        assert_eq!(messages.len(), 5);
        assert!(messages[1].text().contains("build.yaml\nkind: pipeline"));
        assert_eq!(messages[2].text(), "Pipeline logs: go: command not found");
        assert_eq!(messages[3].text(), "Pipeline yaml: kind: pipeline");
        assert_eq!(messages[4].text(), "Why did my build fail?");
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_propagates_provider_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let provider = MockProvider::failing("Rate limit reached for gpt-4o");

        let err = assistant(&provider, &temp_dir)
            .reply("hi", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Rate limit reached for gpt-4o");
        Ok(())
    }

    #[tokio::test]
    async fn test_reply_propagates_context_error_before_calling_provider() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("dist"))?;
        fs::write(temp_dir.path().join("dist/bundle.js"), b"\xff\xfe\xfd")?;
        let provider = MockProvider::default();

        let err = assistant(&provider, &temp_dir)
            .reply("hi", &[])
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
        assert!(provider.calls.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn test_invoked_tools_keep_raw_name_and_arguments() {
        let raw = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                {
                    "id": "c1",
                    "type": "function",
                    "function": {"name": "generate_pipeline", "arguments": "{not json"}
                },
                {
                    "id": "c2",
                    "type": "function",
                    "function": {"name": "update pipeline", "arguments": "{\"updated_pipeline_config\": \"kind: pipeline\"}"}
                }
            ]
        });

        assert_eq!(
            invoked_tools(&raw),
            vec![
                ("generate_pipeline", "{not json"),
                ("update pipeline", "{\"updated_pipeline_config\": \"kind: pipeline\"}"),
            ]
        );
    }

    #[test]
    fn test_invoked_tools_without_tool_calls() {
        assert!(invoked_tools(&json!({"role": "assistant", "content": "hi"})).is_empty());
        assert!(invoked_tools(&json!({"role": "assistant", "tool_calls": null})).is_empty());
    }

    #[tokio::test]
    async fn test_custom_system_prompt() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let provider = MockProvider::default();

        Assistant::new(
            Box::new(provider.clone()),
            ContextGatherer::new([temp_dir.path()]),
            "Only answer about Drone pipelines.",
        )
        .reply("hi", &[])
        .await?;

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].0[0].text(), "Only answer about Drone pipelines.");
        Ok(())
    }
}
