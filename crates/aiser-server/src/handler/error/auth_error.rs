//! Authentication error to HTTP error conversion implementation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::AuthError;
use crate::utility::tracing_targets::AUTHENTICATION as TRACING_TARGET;

impl From<AuthError> for HttpError<'static> {
    fn from(error: AuthError) -> Self {
        tracing::warn!(
            target: TRACING_TARGET,
            error = %error,
            "Request rejected by authenticator"
        );

        let error = match error {
            AuthError::MissingToken => ErrorKind::MissingAuthToken
                .with_message("Authentication required")
                .with_context("Missing Authorization header with Bearer token")
                .with_suggestion("Send an 'Authorization: Bearer <token>' header"),
            AuthError::MalformedToken => ErrorKind::MalformedAuthToken
                .with_message("Invalid token format")
                .with_context("Authorization header must contain a valid Bearer token")
                .with_suggestion("Use the 'Bearer <token>' scheme with a single token"),
            AuthError::UnknownSubject(subject) => ErrorKind::Unauthorized
                .with_message("Authentication token is not valid for this service")
                .with_context(format!("Token subject '{subject}' is not served here")),
            AuthError::InvalidToken(error) => match error.kind() {
                JwtErrorKind::ExpiredSignature => ErrorKind::Unauthorized
                    .with_message("Authentication token has expired"),
                JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                    .with_message("Authentication token verification failed")
                    .with_context("Token signature could not be verified"),
                JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                    .with_message("Authentication token is not valid for this service")
                    .with_context("Token was issued for a different server"),
                JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                    .with_message("Authentication token is from an untrusted source")
                    .with_context("Token was not issued by the configured consumer"),
                JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                    .with_message("Authentication token is incomplete")
                    .with_context(format!("Token is missing required field: {claim}")),
                JwtErrorKind::InvalidToken
                | JwtErrorKind::InvalidAlgorithm
                | JwtErrorKind::Base64(_)
                | JwtErrorKind::Json(_)
                | JwtErrorKind::Utf8(_) => ErrorKind::MalformedAuthToken
                    .with_message("Authentication token is invalid")
                    .with_context(error.to_string()),
                _ => ErrorKind::Unauthorized
                    .with_message("Authentication failed")
                    .with_context(error.to_string()),
            },
        };

        error.with_resource("authentication")
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn auth_errors_are_unauthorized() {
        let cases = [
            (AuthError::MissingToken, ErrorKind::MissingAuthToken),
            (AuthError::MalformedToken, ErrorKind::MalformedAuthToken),
            (
                AuthError::UnknownSubject("ghost".to_owned()),
                ErrorKind::Unauthorized,
            ),
            (
                AuthError::InvalidToken(JwtErrorKind::ExpiredSignature.into()),
                ErrorKind::Unauthorized,
            ),
        ];

        for (auth_error, expected) in cases {
            let error: HttpError<'static> = auth_error.into();
            assert_eq!(error.kind(), expected);
            assert_eq!(error.kind().status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(error.resource(), Some("authentication"));
        }
    }

    #[test]
    fn header_problems_carry_suggestion() {
        let missing: HttpError<'static> = AuthError::MissingToken.into();
        assert!(missing.suggestion().is_some_and(|s| s.contains("Bearer")));

        let malformed: HttpError<'static> = AuthError::MalformedToken.into();
        assert!(malformed.suggestion().is_some());

        let expired: HttpError<'static> =
            AuthError::InvalidToken(JwtErrorKind::ExpiredSignature.into()).into();
        assert_eq!(expired.suggestion(), None);
    }
}
