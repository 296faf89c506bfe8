use aiser_core::ChatMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload of the native chat endpoint.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AgentChat {
    /// Conversation so far, oldest first.
    #[validate(length(min = 1))]
    pub messages: Vec<ChatMessage>,
}
