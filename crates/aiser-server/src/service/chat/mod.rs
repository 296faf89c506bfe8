//! Protocol bridges from agent replies to the chat wire formats.

mod completion;
mod native;
mod reply;

pub use completion::{ChatService, CompletionStream};
pub use native::{NativeStream, encode_record};
