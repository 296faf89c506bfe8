use aiser_core::SemanticSearchResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Results of a semantic search, best match first.
#[must_use]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SemanticSearchResults {
    /// Matching passages with their scores.
    pub results: Vec<SemanticSearchResult>,
}

impl From<Vec<SemanticSearchResult>> for SemanticSearchResults {
    fn from(results: Vec<SemanticSearchResult>) -> Self {
        Self { results }
    }
}
