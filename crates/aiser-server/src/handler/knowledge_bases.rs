//! Knowledge base handlers.

use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use aiser_core::KnowledgeBaseRegistry;
use axum::extract::State;
use axum::http::StatusCode;

use crate::extract::{Json, Path, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{KnowledgeBasePathParams, SemanticSearch};
use crate::handler::response::{ErrorResponse, SemanticSearchResults};
use crate::service::ServiceState;

/// Tracing target for knowledge base operations.
const TRACING_TARGET: &str = "aiser_server::handler::knowledge_bases";

/// Runs a semantic search against a registered knowledge base.
#[tracing::instrument(skip_all, fields(kb_id = %path_params.kb_id))]
async fn semantic_search(
    State(knowledge_bases): State<Arc<KnowledgeBaseRegistry>>,
    Path(path_params): Path<KnowledgeBasePathParams>,
    ValidateJson(request): ValidateJson<SemanticSearch>,
) -> Result<(StatusCode, Json<SemanticSearchResults>)> {
    let knowledge_base = knowledge_bases.resolve(&path_params.kb_id)?;

    let results = knowledge_base
        .perform_semantic_search(&request.text, request.num_results)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        requested = request.num_results,
        returned = results.len(),
        "Semantic search completed"
    );

    Ok((StatusCode::OK, Json(results.into())))
}

fn semantic_search_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Semantic search")
        .description("Returns the passages of the knowledge base most relevant to the query text.")
        .response::<200, Json<SemanticSearchResults>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<422, Json<ErrorResponse>>()
        .response::<426, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all knowledge base routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/knowledge-base/{kbId}/semantic-search",
            post_with(semantic_search, semantic_search_docs),
        )
        .with_path_items(|item| item.tag("Knowledge Bases"))
}
