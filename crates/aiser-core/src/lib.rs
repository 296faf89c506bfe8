#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod knowledge_base;
mod message;
mod registry;
mod usage;

pub mod agent;
pub mod prelude;

pub use crate::agent::{Agent, EchoAgent, FragmentSender, FragmentStream, ReplyStream, RouterAgent};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::knowledge_base::{KnowledgeBase, SemanticSearchResult};
pub use crate::message::{ChatMessage, concat_fragments};
pub use crate::registry::{AgentRegistry, Identifiable, KnowledgeBaseRegistry, Registry};
pub use crate::usage::TokenUsage;
