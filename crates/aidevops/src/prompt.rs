use serde::{Deserialize, Serialize};
use std::path::Path;
use tera::Error as TeraError;

use crate::models::message::Message;
use crate::prompt_template::{load_prompt, load_prompt_file};

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("prompts/system.md");

/// Caller supplied text that is added to the conversation as its own system message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub description: String,
    pub content: String,
}

impl ContextItem {
    pub fn new<D: Into<String>, C: Into<String>>(description: D, content: C) -> Self {
        Self {
            description: description.into(),
            content: content.into(),
        }
    }
}

/// Values substituted into the system prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub assistant_name: String,
    pub platform: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            assistant_name: "AI Devops Engineer".to_string(),
            platform: "Gitness".to_string(),
        }
    }
}

/// Render the system instruction, from `template_file` when given and the built-in template otherwise
pub fn system_prompt(
    persona: &Persona,
    template_file: Option<&Path>,
) -> Result<String, TeraError> {
    match template_file {
        Some(path) => load_prompt_file(path, persona),
        None => load_prompt(SYSTEM_PROMPT_TEMPLATE, persona),
    }
}

/// Build the conversation sent to the model.
///
/// The order is fixed: the system instruction, the gathered repo context, one message
/// per context item, and finally the user's prompt.
pub fn create_messages(
    system_prompt: &str,
    prompt: &str,
    repo_context: &str,
    extra_context: &[ContextItem],
) -> Vec<Message> {
    let mut messages = vec![
        Message::system().with_text(system_prompt),
        Message::system().with_text(format!("Context from the repo: {}", repo_context)),
    ];

    messages.extend(extra_context.iter().map(|item| {
        Message::system().with_text(format!("{}: {}", item.description, item.content))
    }));

    messages.push(Message::user().with_text(prompt));
    messages
}
