//! Chat message value type.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// One piece of dialogue text.
///
/// A conversation is an ordered list of chat messages, oldest first. Agents
/// also emit their replies as a sequence of chat messages, where each one is
/// an incremental fragment of the full reply.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, From)]
#[derive(Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
#[display("{text_content}")]
pub struct ChatMessage {
    /// Text of the message or fragment.
    pub text_content: String,
}

impl ChatMessage {
    /// Creates a new chat message with the given text.
    #[inline]
    pub fn new(text_content: impl Into<String>) -> Self {
        Self {
            text_content: text_content.into(),
        }
    }

    /// Returns the text of this message.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text_content
    }

    /// Consumes the message and returns its text.
    #[inline]
    #[must_use]
    pub fn into_text(self) -> String {
        self.text_content
    }
}

impl From<&str> for ChatMessage {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Concatenates the text of all fragments in order.
pub fn concat_fragments<'a>(fragments: impl IntoIterator<Item = &'a ChatMessage>) -> String {
    fragments.into_iter().map(ChatMessage::text).collect()
}
