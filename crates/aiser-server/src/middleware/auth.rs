use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::Authenticated;

/// Requires the request to pass the [`AuthGate`] before reaching a handler.
///
/// ```rust,ignore
/// use axum::middleware::from_fn_with_state;
/// use aiser_server::middleware::require_authentication;
/// # fn layer(state: aiser_server::service::ServiceState) {
/// let _guard = from_fn_with_state(state, require_authentication);
/// # }
/// ```
///
/// [`AuthGate`]: crate::service::AuthGate
pub async fn require_authentication(
    Authenticated(_): Authenticated,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
