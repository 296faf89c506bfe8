//! Knowledge base contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Identifiable, Result};

/// One hit of a semantic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct SemanticSearchResult {
    /// Matched content.
    pub content: String,
    /// Relevance score, higher is more relevant.
    pub score: f64,
}

impl SemanticSearchResult {
    /// Creates a new search result.
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}

/// Searchable store of documents.
#[async_trait]
pub trait KnowledgeBase: Identifiable + Send + Sync {
    /// Returns up to `desired_number_of_results` results relevant to `query_text`.
    async fn perform_semantic_search(
        &self,
        query_text: &str,
        desired_number_of_results: usize,
    ) -> Result<Vec<SemanticSearchResult>>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::KnowledgeBaseRegistry;

    struct Repeating;

    impl Identifiable for Repeating {
        fn id(&self) -> &str {
            "kb"
        }
    }

    #[async_trait]
    impl KnowledgeBase for Repeating {
        async fn perform_semantic_search(
            &self,
            query_text: &str,
            desired_number_of_results: usize,
        ) -> Result<Vec<SemanticSearchResult>> {
            Ok(vec![SemanticSearchResult::new(query_text, 0.5); desired_number_of_results])
        }
    }

    #[tokio::test]
    async fn search_through_registry() -> anyhow::Result<()> {
        let knowledge_bases: Vec<Arc<dyn KnowledgeBase>> = vec![Arc::new(Repeating)];
        let registry = KnowledgeBaseRegistry::new("knowledge base", knowledge_bases)?;

        let results = registry.resolve("kb")?.perform_semantic_search("q", 2).await?;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], SemanticSearchResult::new("q", 0.5));
        Ok(())
    }
}
