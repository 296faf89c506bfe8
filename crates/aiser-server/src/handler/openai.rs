//! OpenAI-compatible chat completions handler.
//!
//! The `model` field names the target agent. With `stream: true` the reply
//! is sent as server-sent events, one `data: <chunk>` record per chunk and
//! without a trailing `[DONE]` record; otherwise one completion object is
//! returned once the agent finished.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use futures::stream::BoxStream;

use crate::extract::{Json, ValidateJson};
use crate::handler::Result;
use crate::handler::request::ChatCompletion;
use crate::handler::response::{ChatCompletionResponse, ErrorResponse};
use crate::service::{ApiPaths, ChatService, CompletionStream, ServiceState};

/// Tracing target for OpenAI-compatible operations.
const TRACING_TARGET: &str = "aiser_server::handler::openai";

type EventStream = BoxStream<'static, Result<Event, axum::Error>>;

/// Either a buffered completion or a stream of completion chunks.
#[must_use]
pub enum ChatCompletionReply {
    /// The whole reply in one completion object.
    Buffered(ChatCompletionResponse),
    /// The reply as server-sent completion chunks.
    Streamed(Sse<EventStream>),
}

impl ChatCompletionReply {
    fn streamed(chunks: CompletionStream) -> Self {
        let events = chunks.map(|chunk| Event::default().json_data(chunk)).boxed();
        Self::Streamed(Sse::new(events))
    }
}

impl IntoResponse for ChatCompletionReply {
    fn into_response(self) -> Response {
        match self {
            Self::Buffered(completion) => Json(completion).into_response(),
            Self::Streamed(sse) => sse.into_response(),
        }
    }
}

impl aide::OperationOutput for ChatCompletionReply {
    type Inner = ChatCompletionResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ChatCompletionResponse>::operation_response(ctx, operation)
    }

    fn inferred_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        Json::<ChatCompletionResponse>::inferred_responses(ctx, operation)
    }
}

/// Creates a chat completion with the agent named by `model`.
#[tracing::instrument(skip_all, fields(model = %request.model, stream = request.stream))]
async fn chat_completions(
    State(chat_service): State<ChatService>,
    ValidateJson(request): ValidateJson<ChatCompletion>,
) -> Result<ChatCompletionReply> {
    let conversation = request.conversation();

    tracing::debug!(
        target: TRACING_TARGET,
        messages = conversation.len(),
        temperature = request.temperature,
        "Chat completion requested"
    );

    if request.stream {
        let chunks = chat_service.stream_completion(&request.model, conversation)?;
        tracing::info!(target: TRACING_TARGET, "Chat completion stream started");
        return Ok(ChatCompletionReply::streamed(chunks));
    }

    let completion = chat_service.complete(&request.model, conversation).await?;
    tracing::info!(target: TRACING_TARGET, "Chat completion created");
    Ok(ChatCompletionReply::Buffered(completion))
}

fn chat_completions_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create chat completion")
        .description(
            "OpenAI-compatible chat completion. `model` is the id of the target agent. With \
            `stream: true` the reply is streamed as server-sent `chat.completion.chunk` events: \
            a role chunk, one chunk per reply fragment, a stop chunk and a usage chunk. No \
            `[DONE]` event is sent.",
        )
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<422, Json<ErrorResponse>>()
        .response::<426, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with the chat completions route under `api_paths`.
///
/// [`Router`]: axum::routing::Router
pub fn routes(api_paths: &ApiPaths) -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            &api_paths.chat_completions(),
            post_with(chat_completions, chat_completions_docs),
        )
        .with_path_items(|item| item.tag("OpenAI Compatible"))
}
