//! Authentication extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::handler::{Error, Result};
use crate::service::AuthGate;
use crate::utility::tracing_targets::AUTHENTICATION as TRACING_TARGET;

/// Proof that the request passed the [`AuthGate`].
///
/// Holds the authenticated subject when the authenticator identifies one.
/// The outcome is cached in the request extensions, so extracting it more
/// than once per request runs the authenticator only once.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(pub Option<String>);

impl Authenticated {
    /// Returns the authenticated subject, if any.
    #[inline]
    pub fn subject(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Sync + Send,
    AuthGate: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(authenticated) = parts.extensions.get::<Self>() {
            return Ok(authenticated.clone());
        }

        let auth_gate = AuthGate::from_ref(state);
        let subject = auth_gate.check(&parts.headers)?;

        tracing::debug!(
            target: TRACING_TARGET,
            subject = subject.as_deref().unwrap_or("<none>"),
            path = %parts.uri.path(),
            "Request authenticated"
        );

        let authenticated = Self(subject);
        parts.extensions.insert(authenticated.clone());
        Ok(authenticated)
    }
}

impl aide::OperationInput for Authenticated {}
