//! Response types for HTTP handlers.

mod agents;
mod errors;
mod knowledge_bases;
mod monitors;
mod openai;

pub use agents::*;
pub use errors::*;
pub use knowledge_bases::*;
pub use monitors::*;
pub use openai::*;
