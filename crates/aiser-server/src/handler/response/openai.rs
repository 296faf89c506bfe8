//! OpenAI-compatible chat completion response types.

use aiser_core::TokenUsage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::request::Role;
use crate::utility::unix_seconds;

/// Finish reason reported once the agent's reply is complete.
pub const FINISH_REASON_STOP: &str = "stop";

/// Object type of a buffered completion.
pub const OBJECT_COMPLETION: &str = "chat.completion";

/// Object type of a streamed completion chunk.
pub const OBJECT_COMPLETION_CHUNK: &str = "chat.completion.chunk";

/// Completion envelope shared by buffered responses and streamed chunks.
///
/// `C` is [`CompletionChoice`] for a buffered response and [`ChunkChoice`]
/// for a streamed chunk.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Completion<C> {
    /// Completion identifier, `chatcmpl-<unix seconds>`.
    pub id: String,
    /// Object type.
    pub object: String,
    /// Creation time in unix seconds.
    pub created: i64,
    /// The requested model, i.e. the agent id.
    pub model: String,
    /// Exactly one choice.
    pub choices: Vec<C>,
    /// Token usage, present only on the trailing stream chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

impl<C> Completion<C> {
    fn new(object: &str, model: &str, choice: C) -> Self {
        let created = unix_seconds();
        Self {
            id: format!("chatcmpl-{created}"),
            object: object.to_owned(),
            created,
            model: model.to_owned(),
            choices: vec![choice],
            usage: None,
        }
    }
}

/// Buffered chat completion.
pub type ChatCompletionResponse = Completion<CompletionChoice>;

/// One chunk of a streamed chat completion.
pub type ChatCompletionChunk = Completion<ChunkChoice>;

impl ChatCompletionResponse {
    /// Creates a completion holding the full assistant reply.
    pub fn assistant_reply(model: &str, content: String) -> Self {
        Self::new(
            OBJECT_COMPLETION,
            model,
            CompletionChoice {
                index: 0,
                message: AssistantMessage {
                    role: Role::Assistant,
                    content,
                },
                finish_reason: Some(FINISH_REASON_STOP.to_owned()),
            },
        )
    }
}

impl ChatCompletionChunk {
    /// Opening chunk carrying only the assistant role.
    pub fn role(model: &str) -> Self {
        Self::with_delta(
            model,
            Delta {
                role: Some(Role::Assistant),
                content: None,
            },
            None,
        )
    }

    /// Chunk carrying one reply fragment.
    pub fn content(model: &str, content: String) -> Self {
        Self::with_delta(
            model,
            Delta {
                role: None,
                content: Some(content),
            },
            None,
        )
    }

    /// Terminal chunk with an empty delta and the stop finish reason.
    pub fn stop(model: &str) -> Self {
        Self::with_delta(model, Delta::default(), Some(FINISH_REASON_STOP.to_owned()))
    }

    /// Trailing chunk reporting token usage, zeros when unknown.
    pub fn usage(model: &str, usage: Option<TokenUsage>) -> Self {
        let mut chunk = Self::with_delta(model, Delta::default(), None);
        chunk.usage = Some(usage.unwrap_or_default().into());
        chunk
    }

    fn with_delta(model: &str, delta: Delta, finish_reason: Option<String>) -> Self {
        Self::new(
            OBJECT_COMPLETION_CHUNK,
            model,
            ChunkChoice {
                index: 0,
                delta,
                finish_reason,
            },
        )
    }
}

/// Choice of a buffered completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompletionChoice {
    /// Always 0.
    pub index: u32,
    /// The assistant reply.
    pub message: AssistantMessage,
    /// Why generation stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Full assistant message of a buffered completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssistantMessage {
    /// Always `assistant`.
    pub role: Role,
    /// Concatenated reply text.
    pub content: String,
}

/// Choice of a streamed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkChoice {
    /// Always 0.
    pub index: u32,
    /// Incremental change to the assistant message.
    pub delta: Delta,
    /// Why generation stopped, only on the terminal chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental change to the assistant message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Delta {
    /// Author, only on the opening chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Reply fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Token usage in OpenAI field names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompletionUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated for the completion.
    pub completion_tokens: u64,
    /// Sum of prompt and completion tokens.
    pub total_tokens: u64,
}

impl From<TokenUsage> for CompletionUsage {
    fn from(usage: TokenUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens(),
        }
    }
}
