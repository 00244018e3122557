use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::error::{AuthError, AuthErrorCode};
use super::identity::Principal;
use super::token::TokenService;
use crate::gateway::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AuthError::from_code(AuthErrorCode::MissingHeader))?;
    let value = value
        .to_str()
        .map_err(|_| AuthError::from_code(AuthErrorCode::InvalidFormat))?;

    let Some(rest) = value.strip_prefix(BEARER_PREFIX) else {
        return Err(AuthError::from_code(AuthErrorCode::InvalidFormat));
    };

    match rest.split(' ').next() {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::from_code(AuthErrorCode::MissingToken)),
    }
}

/// Verification shared by HTTP requests and WebSocket handshakes.
pub fn authenticate(tokens: &TokenService, token: &str) -> Result<Principal, AuthError> {
    tokens.verify(token).map_err(AuthError::from)
}

/// Guards protected routes; inserts the [`Principal`] into request extensions.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let principal = extract_bearer(request.headers())
        .and_then(|token| authenticate(&state.tokens, token))
        .map_err(|e| {
            tracing::debug!(
                code = e.code.name(),
                path = %request.uri().path(),
                "request rejected"
            );
            state.auth_rejection(e)
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        map
    }

    #[test]
    fn test_missing_header() {
        let err = extract_bearer(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, AuthErrorCode::MissingHeader);
        assert_eq!(err.message, "missing authorization header");
    }

    #[test]
    fn test_wrong_scheme() {
        for value in ["Token abc", "bearer abc", "Bearer", "Basic dXNlcjpwYXNz"] {
            let err = extract_bearer(&headers(value)).unwrap_err();
            assert_eq!(err.code, AuthErrorCode::InvalidFormat, "{value}");
        }
    }

    #[test]
    fn test_empty_token() {
        for value in ["Bearer ", "Bearer  abc"] {
            let err = extract_bearer(&headers(value)).unwrap_err();
            assert_eq!(err.code, AuthErrorCode::MissingToken, "{value}");
            assert_eq!(err.message, "missing authorization token");
        }
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }
}
