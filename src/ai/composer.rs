use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::models::ContentItem;

/// System instruction used when neither an override nor a configured prompt
/// is available.
pub const DEFAULT_PROMPT: &str = "You are a helpful assistant that summarizes articles.
Write a concise summary of the user's text in one short paragraph.
Focus on the key facts and main conclusions. Reply with the summary only.";

/// Fixed prefix in front of the item body in the user message.
pub const USER_LABEL: &str = "Title: ";

const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub model: String,
}

/// Picks the system prompt: override, then configured prompt, then
/// [`DEFAULT_PROMPT`].
pub fn resolve_prompt<'a>(config: &'a GenerationConfig, prompt_override: Option<&'a str>) -> &'a str {
    prompt_override
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| config.configured_prompt())
        .unwrap_or(DEFAULT_PROMPT)
}

/// Builds the request for `item`. The config is expected to have passed
/// [`GenerationConfig::validate`] already.
pub fn compose(item: &ContentItem, config: &GenerationConfig) -> ChatRequest {
    compose_with_prompt(item, config, resolve_prompt(config, None))
}

pub fn compose_with_prompt(
    item: &ContentItem,
    config: &GenerationConfig,
    prompt: &str,
) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: prompt.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: format!("{}{}", USER_LABEL, item.body),
            },
        ],
        temperature: TEMPERATURE,
        top_p: TOP_P,
        model: config.model.clone(),
    }
}
