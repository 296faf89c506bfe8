//! OpenAI-compatible chat completion request types.

use aiser_core::ChatMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Separator placed between text parts of a structured message.
const CONTENT_PART_SEPARATOR: &str = "\n\n";

/// Request payload of the OpenAI-compatible chat completions endpoint.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ChatCompletion {
    /// Identifier of the agent that should answer.
    #[validate(length(min = 1))]
    pub model: String,
    /// Conversation so far, oldest first.
    #[validate(length(min = 1))]
    pub messages: Vec<CompletionMessage>,
    /// Sampling temperature. Accepted for compatibility and otherwise unused.
    #[serde(default = "ChatCompletion::default_temperature")]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f64,
    /// Whether the reply should be streamed as server-sent events.
    #[serde(default)]
    pub stream: bool,
}

impl ChatCompletion {
    fn default_temperature() -> f64 {
        1.0
    }

    /// Converts the request messages into the conversation handed to the agent.
    pub fn conversation(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|message| ChatMessage::new(message.content.to_text()))
            .collect()
    }
}

/// Author of a chat completion message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the assistant.
    System,
    /// The human side of the conversation.
    User,
    /// A previous assistant reply.
    Assistant,
}

/// One message of an OpenAI-compatible conversation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompletionMessage {
    /// Author of the message.
    pub role: Role,
    /// Message body.
    pub content: MessageContent,
}

/// Message body: either plain text or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text.
    Text(String),
    /// Typed content parts. Only `text` parts are understood.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Returns the text of this content.
    ///
    /// Text parts are joined with a blank line. Parts of any other type are
    /// dropped.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(ContentPart::as_text)
                .collect::<Vec<_>>()
                .join(CONTENT_PART_SEPARATOR),
        }
    }
}

/// One typed part of a structured message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentPart {
    /// Part type, e.g. `text` or `image_url`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Text of a `text` part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentPart {
    /// Part type carrying plain text.
    pub const TEXT: &str = "text";

    /// Returns the text of a `text` part.
    fn as_text(&self) -> Option<&str> {
        (self.kind == Self::TEXT)
            .then_some(self.text.as_deref())
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use validator::Validate;

    use super::*;

    #[test]
    fn text_parts_are_joined_with_blank_line() -> anyhow::Result<()> {
        let content: MessageContent = serde_json::from_value(json!([
            {"type": "text", "text": "a"},
            {"type": "text", "text": "b"},
        ]))?;

        assert_eq!(content.to_text(), "a\n\nb");
        Ok(())
    }

    #[test]
    fn unsupported_parts_are_dropped() -> anyhow::Result<()> {
        let content: MessageContent = serde_json::from_value(json!([
            {"type": "image_url", "image_url": {"url": "https://example.com/cat.png"}},
            {"type": "text", "text": "what is this?"},
        ]))?;

        assert_eq!(content.to_text(), "what is this?");
        Ok(())
    }

    #[test]
    fn defaults_are_applied() -> anyhow::Result<()> {
        let request: ChatCompletion = serde_json::from_value(json!({
            "model": "echo_agent",
            "messages": [{"role": "user", "content": "hi"}],
        }))?;

        assert!(!request.stream);
        assert_eq!(request.temperature, 1.0);
        assert!(request.validate().is_ok());
        assert_eq!(request.conversation(), [ChatMessage::new("hi")]);
        Ok(())
    }

    #[test]
    fn every_role_is_forwarded() -> anyhow::Result<()> {
        let request: ChatCompletion = serde_json::from_value(json!({
            "model": "echo_agent",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": [{"type": "text", "text": "again"}]},
            ],
        }))?;

        let texts: Vec<_> = request
            .conversation()
            .into_iter()
            .map(ChatMessage::into_text)
            .collect();
        assert_eq!(texts, ["be brief", "hi", "hello", "again"]);
        Ok(())
    }

    #[test]
    fn out_of_range_temperature_fails_validation() -> anyhow::Result<()> {
        let request: ChatCompletion = serde_json::from_value(json!({
            "model": "echo_agent",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 2.5,
        }))?;

        let errors = request.validate().err();
        assert!(errors.is_some_and(|e| e.field_errors().contains_key("temperature")));
        Ok(())
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<ChatCompletion>(json!({
            "model": "echo_agent",
            "messages": [{"role": "tool", "content": "hi"}],
        }));
        assert!(result.is_err());
    }
}
