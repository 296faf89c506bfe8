//! Convenient re-exports for common use.

pub use crate::agent::{Agent, ReplyStream};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::knowledge_base::{KnowledgeBase, SemanticSearchResult};
pub use crate::message::ChatMessage;
pub use crate::registry::{AgentRegistry, Identifiable, KnowledgeBaseRegistry};
pub use crate::usage::TokenUsage;
