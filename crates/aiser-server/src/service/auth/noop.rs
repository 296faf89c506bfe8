use std::collections::HashSet;

use axum::http::HeaderMap;

use super::{AuthError, Authenticator};

/// Development authenticator that accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuthenticator;

impl Authenticator for NoopAuthenticator {
    #[inline]
    fn authenticate(
        &self,
        _headers: &HeaderMap,
        _acceptable_subjects: &HashSet<String>,
    ) -> Result<Option<String>, AuthError> {
        Ok(None)
    }
}
