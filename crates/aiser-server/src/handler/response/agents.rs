use aiser_core::ChatMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One record of the native chat stream, carrying a single reply fragment.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentChatFragment {
    /// Fragment of the agent's reply.
    pub output_message: ChatMessage,
}

impl From<ChatMessage> for AgentChatFragment {
    fn from(output_message: ChatMessage) -> Self {
        Self { output_message }
    }
}
