//! Request types for HTTP handlers.

mod agents;
mod knowledge_bases;
mod openai;
mod paths;

pub use agents::*;
pub use knowledge_bases::*;
pub use openai::*;
pub use paths::*;
