//! Token usage accounting.

use serde::{Deserialize, Serialize};

/// Token accounting for a single reply invocation.
///
/// The total is always derived from the prompt and completion counts and is
/// never stored on its own.
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TokenUsage {
    /// Number of tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Number of tokens generated for the completion.
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Creates a new usage record.
    #[inline]
    pub const fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Returns the sum of prompt and completion tokens.
    #[inline]
    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}
