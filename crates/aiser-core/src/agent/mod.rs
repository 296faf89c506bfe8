//! Agent contract and built-in agents.
//!
//! An [`Agent`] turns a conversation into a lazily produced [`ReplyStream`].
//! Fragments are pulled by the transport one at a time, so a reply can be
//! forwarded to the client while the agent is still generating it.

mod echo;
mod router;
mod stream;

pub use echo::EchoAgent;
pub use router::RouterAgent;
pub use stream::{FragmentSender, FragmentStream, ReplyStream};

use crate::{ChatMessage, Identifiable, TokenUsage};

/// Conversational agent.
///
/// Implementations must be shareable across concurrent requests.
pub trait Agent: Identifiable + Send + Sync {
    /// Produces a reply to the given conversation.
    ///
    /// The conversation is ordered oldest first. The returned stream is
    /// lazy: no work needs to happen until it is polled.
    fn reply(&self, conversation: Vec<ChatMessage>) -> ReplyStream;

    /// Returns the token usage of the most recent completed reply, if the
    /// agent tracks it.
    ///
    /// Only meaningful once the stream returned by [`Agent::reply`] has been
    /// fully consumed.
    fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
        None
    }
}
