//! Liveness and version handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;

use crate::extract::Json;
use crate::handler::response::{ErrorResponse, VersionInfo};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "aiser_server::handler::monitors";

/// Acknowledges that the server is up.
async fn liveness() -> &'static str {
    "ok"
}

fn liveness_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Liveness check")
        .description("Returns `ok` while the server is running. Requires no authentication.")
        .response_with::<200, String, _>(|res| res.description("Server is up."))
}

/// Returns the version of the running server.
#[tracing::instrument(skip_all)]
async fn version() -> (StatusCode, Json<VersionInfo>) {
    let version = VersionInfo::default();
    tracing::debug!(target: TRACING_TARGET, version = %version.version, "Version requested");
    (StatusCode::OK, Json(version))
}

fn version_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get server version")
        .description("Returns the semantic version of the running server.")
        .response::<200, Json<VersionInfo>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<426, Json<ErrorResponse>>()
}

/// Returns the unauthenticated liveness route.
pub fn public_routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/", get_with(liveness, liveness_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

/// Returns the version route.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/version", get_with(version, version_docs))
        .with_path_items(|item| item.tag("Monitors"))
}
