use crate::{Agent, ChatMessage, Identifiable, ReplyStream};

/// Agent that repeats the latest message one character at a time.
///
/// Useful for smoke tests and as a template for custom agents.
#[derive(Debug, Clone)]
pub struct EchoAgent {
    id: String,
}

impl EchoAgent {
    /// Default identifier of the echo agent.
    pub const DEFAULT_ID: &'static str = "echo_agent";

    /// Creates a new echo agent with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for EchoAgent {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ID)
    }
}

impl Identifiable for EchoAgent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Agent for EchoAgent {
    fn reply(&self, conversation: Vec<ChatMessage>) -> ReplyStream {
        let latest = conversation
            .into_iter()
            .last()
            .map(ChatMessage::into_text)
            .unwrap_or_default();

        let fragments: Vec<_> = latest
            .chars()
            .map(|c| ChatMessage::new(c.to_string()))
            .collect();
        ReplyStream::from_fragments(fragments)
    }
}
