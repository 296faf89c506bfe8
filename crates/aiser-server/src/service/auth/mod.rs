//! Request authentication.
//!
//! An [`Authenticator`] inspects the request headers and either accepts the
//! request, optionally naming the authenticated subject, or rejects it with
//! an [`AuthError`]. The [`AuthGate`] pairs an authenticator with the set of
//! subjects it should accept and is what the router consults for every
//! protected request.

pub(crate) mod jwt;
mod noop;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;

pub use self::jwt::{JwtAlgorithm, JwtAuthenticator};
pub use self::noop::NoopAuthenticator;

/// Reasons an [`Authenticator`] rejects a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    #[error("missing authorization header")]
    MissingToken,
    /// The `Authorization` header is not a well-formed bearer token.
    #[error("authorization header is not a bearer token")]
    MalformedToken,
    /// The bearer token failed signature or claim validation.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    /// The token is valid but names a subject this server does not serve.
    #[error("subject '{0}' is not accepted")]
    UnknownSubject(String),
}

/// Decides whether a request may reach the protected endpoints.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticates the request described by `headers`.
    ///
    /// Returns the authenticated subject when the authenticator establishes
    /// one, `None` when it passes the request through without identifying
    /// the caller.
    fn authenticate(
        &self,
        headers: &HeaderMap,
        acceptable_subjects: &HashSet<String>,
    ) -> Result<Option<String>, AuthError>;
}

/// An [`Authenticator`] bound to the subjects it accepts.
#[derive(Clone)]
pub struct AuthGate {
    authenticator: Arc<dyn Authenticator>,
    acceptable_subjects: Arc<HashSet<String>>,
}

impl AuthGate {
    /// Creates a new gate around `authenticator`.
    pub fn new<A, I, S>(authenticator: A, acceptable_subjects: I) -> Self
    where
        A: Authenticator,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authenticator: Arc::new(authenticator),
            acceptable_subjects: Arc::new(
                acceptable_subjects.into_iter().map(Into::into).collect(),
            ),
        }
    }

    /// Creates a gate that lets every request through.
    pub fn pass_through() -> Self {
        Self::new(NoopAuthenticator, std::iter::empty::<String>())
    }

    /// Runs the authenticator against the request headers.
    #[inline]
    pub fn check(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        self.authenticator
            .authenticate(headers, &self.acceptable_subjects)
    }

    /// Returns the subjects this gate accepts.
    #[inline]
    pub fn acceptable_subjects(&self) -> &HashSet<String> {
        &self.acceptable_subjects
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("acceptable_subjects", &self.acceptable_subjects)
            .finish_non_exhaustive()
    }
}
