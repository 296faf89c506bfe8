use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for semantic search.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSearch {
    /// Query text.
    pub text: String,
    /// Number of results the caller wants back.
    #[validate(range(max = 1000))]
    pub num_results: usize,
}
