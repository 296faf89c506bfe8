//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use aiser_core::{Agent, EchoAgent};
//! use aiser_server::handler::routes;
//! use aiser_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use aiser_server::service::{ServiceConfig, ServiceState};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let agents: Vec<Arc<dyn Agent>> = vec![Arc::new(EchoAgent::default())];
//! let state = ServiceState::from_config(&config, agents, Vec::new()).await?;
//!
//! let app: axum::Router = routes(state.clone())
//!     .with_state(state)
//!     .with_open_api(OpenApiConfig::default());
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod agents;
mod error;
mod knowledge_bases;
mod monitors;
mod openai;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{IntoResponse, Response};

pub use crate::handler::agents::AgentChatStream;
pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::openai::ChatCompletionReply;
use crate::middleware::{require_authentication, require_min_version};
use crate::service::{ApiPaths, ServiceState};

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes that require authentication.
fn private_routes(api_paths: &ApiPaths) -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(monitors::routes())
        .merge(knowledge_bases::routes())
        .merge(agents::routes(api_paths))
        .merge(openai::routes(api_paths))
}

/// Returns an [`ApiRouter`] with all public routes.
fn public_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().merge(monitors::public_routes())
}

/// Returns an [`ApiRouter`] with all routes.
///
/// Every route except the liveness check first passes the authentication
/// gate and then the minimum version gate. Unknown paths are answered with
/// 404 Not Found.
pub fn routes(state: ServiceState) -> ApiRouter<ServiceState> {
    let require_authentication = from_fn_with_state(state.clone(), require_authentication);
    let require_min_version = from_fn(require_min_version);

    // Private routes: the last route layer runs first.
    let private_router = private_routes(state.api_paths())
        .route_layer(require_min_version)
        .route_layer(require_authentication);

    // Public routes without authentication
    let public_router = public_routes();

    ApiRouter::new()
        .merge(private_router)
        .merge(public_router)
        .fallback(handler)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use aide::axum::ApiRouter;
    use aiser_core::{
        Agent, AgentRegistry, ChatMessage, EchoAgent, Identifiable, KnowledgeBase,
        KnowledgeBaseRegistry, ReplyStream, RouterAgent, SemanticSearchResult, TokenUsage,
    };
    use axum_test::TestServer;

    use crate::handler::routes;
    use crate::middleware::{OpenApiConfig, RouterOpenApiExt};
    use crate::service::ServiceState;

    /// Agent replying with fixed fragments and reporting fixed usage.
    struct Fixed {
        id: &'static str,
        fragments: &'static [&'static str],
        usage: Option<TokenUsage>,
    }

    impl Identifiable for Fixed {
        fn id(&self) -> &str {
            self.id
        }
    }

    impl Agent for Fixed {
        fn reply(&self, _conversation: Vec<ChatMessage>) -> ReplyStream {
            ReplyStream::from_fragments(self.fragments.iter().copied().map(ChatMessage::new))
        }

        fn latest_reply_token_usage(&self) -> Option<TokenUsage> {
            self.usage
        }
    }

    /// Knowledge base answering with copies of the query.
    struct Mirror;

    impl Identifiable for Mirror {
        fn id(&self) -> &str {
            "kb"
        }
    }

    #[async_trait::async_trait]
    impl KnowledgeBase for Mirror {
        async fn perform_semantic_search(
            &self,
            query_text: &str,
            desired_number_of_results: usize,
        ) -> aiser_core::Result<Vec<SemanticSearchResult>> {
            let result = SemanticSearchResult::new(query_text, 0.5);
            Ok(vec![result; desired_number_of_results])
        }
    }

    /// Returns a state with deterministic agents and one knowledge base.
    ///
    /// Agents: `echo`, `usage` (replies `ok`, usage 10/20), `silent` (no
    /// fragments), `scripted` (replies `Hello!`) and `router_agent` over
    /// `echo` and `scripted`.
    pub fn test_state() -> anyhow::Result<ServiceState> {
        let echo: Arc<dyn Agent> = Arc::new(EchoAgent::new("echo"));
        let scripted: Arc<dyn Agent> = Arc::new(Fixed {
            id: "scripted",
            fragments: &["Hel", "lo", "!"],
            usage: None,
        });
        let router = RouterAgent::new(vec![Arc::clone(&echo), Arc::clone(&scripted)])?;

        let agents: Vec<Arc<dyn Agent>> = vec![
            echo,
            Arc::new(Fixed {
                id: "usage",
                fragments: &["o", "k"],
                usage: Some(TokenUsage::new(10, 20)),
            }),
            Arc::new(Fixed {
                id: "silent",
                fragments: &[],
                usage: None,
            }),
            scripted,
            Arc::new(router),
        ];
        let knowledge_bases: Vec<Arc<dyn KnowledgeBase>> = vec![Arc::new(Mirror)];

        Ok(ServiceState::new(
            AgentRegistry::new("agent", agents)?,
            KnowledgeBaseRegistry::new("knowledge base", knowledge_bases)?,
        ))
    }

    /// Returns a new [`TestServer`] with the given router.
    pub fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let state = test_state()?;
        let app = router(state.clone())
            .with_state(state)
            .with_open_api(OpenApiConfig::default());
        Ok(TestServer::new(app)?)
    }

    /// Returns a new [`TestServer`] with all routes and the given state.
    pub fn create_test_server_with_state(state: ServiceState) -> anyhow::Result<TestServer> {
        let app = routes(state.clone())
            .with_state(state)
            .with_open_api(OpenApiConfig::default());
        Ok(TestServer::new(app)?)
    }

    /// Returns a new [`TestServer`] with all routes and the test state.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        create_test_server_with_state(test_state()?)
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server()?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/does-not-exist").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get(&OpenApiConfig::default().open_api_json).await;
        response.assert_status_ok();

        let document = response.json::<serde_json::Value>();
        let paths = &document["paths"];
        assert!(paths.get("/version").is_some());
        assert!(paths.get("/knowledge-base/{kbId}/semantic-search").is_some());
        assert!(paths.get("/openai-compatible/v1/chat/completions").is_some());
        assert!(paths.get("/agent/{agentId}/chat").is_some());
        Ok(())
    }
}
