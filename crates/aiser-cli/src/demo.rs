//! Demo agents and knowledge base served by the binary.
//!
//! Replace these with real implementations of [`Agent`] and
//! [`KnowledgeBase`] when embedding the server.

use std::sync::Arc;
use std::time::Duration;

use aiser_core::{
    Agent, ChatMessage, EchoAgent, Identifiable, KnowledgeBase, ReplyStream, Result, RouterAgent,
    SemanticSearchResult, TokenUsage,
};
use async_trait::async_trait;
use futures::{StreamExt, stream};

use crate::config::DemoConfig;

const EXAMPLE_REPLY: &str = "This is an example of a reply from an agent";
const EXAMPLE_SEARCH_RESULT: &str = "This is an example of a semantic search result";

/// Agent that streams a fixed reply one character at a time.
#[derive(Debug, Clone)]
pub struct ExampleAgent {
    id: String,
    fragment_delay: Duration,
}

impl ExampleAgent {
    pub fn new(id: impl Into<String>, fragment_delay: Duration) -> Self {
        Self {
            id: id.into(),
            fragment_delay,
        }
    }
}

impl Identifiable for ExampleAgent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Agent for ExampleAgent {
    fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
        let delay = self.fragment_delay;
        let fragments = stream::iter(EXAMPLE_REPLY.chars().enumerate()).then(
            move |(index, character)| async move {
                if index > 0 {
                    tokio::time::sleep(delay).await;
                }
                Ok(ChatMessage::new(character.to_string()))
            },
        );

        ReplyStream::new(fragments)
    }

    fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
        Some(TokenUsage::new(10, 20))
    }
}

/// Knowledge base that answers every query with copies of a fixed result.
#[derive(Debug, Clone)]
pub struct ExampleKnowledgeBase {
    id: String,
}

impl ExampleKnowledgeBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl Identifiable for ExampleKnowledgeBase {
    fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl KnowledgeBase for ExampleKnowledgeBase {
    async fn perform_semantic_search(
        &self,
        _query_text: &str,
        desired_number_of_results: usize,
    ) -> Result<Vec<SemanticSearchResult>> {
        let result = SemanticSearchResult::new(EXAMPLE_SEARCH_RESULT, 0.5);
        Ok(vec![result; desired_number_of_results])
    }
}

/// Returns the echo agent, the example agent and a router over both.
pub fn agents(config: &DemoConfig) -> Result<Vec<Arc<dyn Agent>>> {
    let echo: Arc<dyn Agent> = Arc::new(EchoAgent::default());
    let example: Arc<dyn Agent> = Arc::new(ExampleAgent::new(
        config.demo_agent_id.as_str(),
        Duration::from_millis(config.demo_fragment_delay_ms),
    ));
    let router: Arc<dyn Agent> = Arc::new(RouterAgent::new(vec![echo.clone(), example.clone()])?);

    Ok(vec![echo, example, router])
}

/// Returns the example knowledge base.
pub fn knowledge_bases(config: &DemoConfig) -> Vec<Arc<dyn KnowledgeBase>> {
    vec![Arc::new(ExampleKnowledgeBase::new(
        config.demo_knowledge_base_id.as_str(),
    ))]
}
