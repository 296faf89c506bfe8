//! Native streaming chat handler.
//!
//! The reply is streamed as newline-delimited JSON records, one per reply
//! fragment, under the `text/event-stream` media type. Closing the
//! connection drops the body, which cancels the agent's reply stream.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use crate::extract::{Json, Path, ValidateJson};
use crate::handler::Result;
use crate::handler::request::{AgentChat, AgentPathParams};
use crate::handler::response::{AgentChatFragment, ErrorResponse};
use crate::service::{ApiPaths, ChatService, NativeStream, ServiceState};

/// Tracing target for native chat operations.
const TRACING_TARGET: &str = "aiser_server::handler::agents";

/// Media type of the native chat stream.
const EVENT_STREAM: &str = "text/event-stream";

/// Streamed native chat reply.
#[must_use]
pub struct AgentChatStream(NativeStream);

impl IntoResponse for AgentChatStream {
    fn into_response(self) -> Response {
        let mut response = Body::from_stream(self.0).into_response();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(EVENT_STREAM));
        response
    }
}

impl aide::OperationOutput for AgentChatStream {
    type Inner = AgentChatFragment;

    fn operation_response(
        _ctx: &mut aide::generate::GenContext,
        _operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Some(aide::openapi::Response {
            description: "Newline-delimited `{\"outputMessage\": {\"textContent\": ...}}` records, \
                one per reply fragment."
                .to_owned(),
            ..Default::default()
        })
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Self::operation_response(ctx, operation)
            .map(|response| vec![(Some(200), response)])
            .unwrap_or_default()
    }
}

/// Streams an agent's reply to the given conversation.
#[tracing::instrument(skip_all, fields(agent_id = %path_params.agent_id))]
async fn agent_chat(
    State(chat_service): State<ChatService>,
    Path(path_params): Path<AgentPathParams>,
    ValidateJson(request): ValidateJson<AgentChat>,
) -> Result<AgentChatStream> {
    tracing::debug!(
        target: TRACING_TARGET,
        messages = request.messages.len(),
        "Native chat requested"
    );

    let stream = chat_service.stream_native(&path_params.agent_id, request.messages)?;

    tracing::info!(target: TRACING_TARGET, "Native chat stream started");

    Ok(AgentChatStream(stream))
}

fn agent_chat_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Chat with an agent")
        .description(
            "Sends the conversation to the agent and streams its reply as newline-delimited \
            JSON records.",
        )
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<422, Json<ErrorResponse>>()
        .response::<426, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with the native chat route under `api_paths`.
///
/// [`Router`]: axum::routing::Router
pub fn routes(api_paths: &ApiPaths) -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(&api_paths.agent_chat(), post_with(agent_chat, agent_chat_docs))
        .with_path_items(|item| item.tag("Agents"))
}
