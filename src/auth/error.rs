//! Session authentication errors.
//!
//! Every rejection produced by the token middleware, on HTTP requests and
//! WebSocket handshakes alike, is one of these codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::token::TokenError;
use crate::gateway::types::ErrorResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    /// No `Authorization` header
    MissingHeader,
    /// Header present but not `Bearer <token>`
    InvalidFormat,
    /// Bearer scheme with an empty token, or no handshake token
    MissingToken,
    /// Bad signature, malformed or expired
    InvalidToken,
    /// Token verified but carries no identity
    InvalidUser,
    InternalError,
}

impl AuthErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingHeader => "MISSING_HEADER",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidUser => "INVALID_USER",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidUser => StatusCode::UNAUTHORIZED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::FORBIDDEN,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::MissingHeader => "missing authorization header",
            Self::InvalidFormat => {
                "invalid authorization header; expected format: 'Authorization: Bearer [TOKEN]'"
            }
            Self::MissingToken => "missing authorization token",
            Self::InvalidToken => "token is invalid or expired",
            Self::InvalidUser => "invalid user",
            Self::InternalError => "internal server error",
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_code(code: AuthErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    /// Collapse client-facing detail into a single "unauthorized" message.
    /// Status codes are kept; internal errors are left untouched.
    pub fn coarse(self) -> Self {
        if self.code.http_status().is_client_error() {
            Self::new(self.code, "unauthorized")
        } else {
            self
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => Self::from_code(AuthErrorCode::InvalidToken),
            TokenError::MissingUser => Self::from_code(AuthErrorCode::InvalidUser),
            TokenError::MissingSecret | TokenError::Signing(_) => {
                tracing::error!(error = %err, "token service misconfigured");
                Self::from_code(AuthErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.code.http_status(),
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status() {
        assert_eq!(
            AuthErrorCode::MissingHeader.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthErrorCode::InvalidToken.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthErrorCode::InvalidUser.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_token_error() {
        assert_eq!(
            AuthError::from(TokenError::MissingUser).code,
            AuthErrorCode::InvalidUser
        );
        assert_eq!(
            AuthError::from(TokenError::MissingSecret).code,
            AuthErrorCode::InternalError
        );
    }

    #[test]
    fn test_coarse_keeps_status() {
        let err = AuthError::from_code(AuthErrorCode::InvalidFormat).coarse();
        assert_eq!(err.message, "unauthorized");
        assert_eq!(err.code.http_status(), StatusCode::FORBIDDEN);

        let internal = AuthError::from_code(AuthErrorCode::InternalError).coarse();
        assert_eq!(internal.message, "internal server error");
    }
}
