use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::state::AppState;
use super::types::{ApiError, ApiResult, ErrorResponse, HealthResponse, TokenResponse};
use crate::auth::{Principal, SignInAssertion, validate_sign_in};

/// Exchange a sign-in assertion for a session token
///
/// The expected signature domain is the host of the `Origin` header.
#[utoipa::path(
    post,
    path = "/auth",
    request_body = SignInAssertion,
    params(
        ("Origin" = String, Header, description = "Origin of the signing page, e.g. http://localhost:5173")
    ),
    responses(
        (status = 200, description = "Session token issued", body = TokenResponse),
        (status = 400, description = "Missing or invalid Origin header, or malformed body", body = ErrorResponse),
        (status = 401, description = "Invalid signature", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn post_auth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<TokenResponse> {
    let origin = headers
        .get(header::ORIGIN)
        .ok_or_else(|| ApiError::bad_request("missing header: origin"))?;
    let domain = origin
        .to_str()
        .ok()
        .and_then(origin_domain)
        .ok_or_else(|| ApiError::bad_request("invalid header: origin"))?;

    let assertion = parse_assertion(&body)?;

    if !validate_sign_in(state.verifier.as_ref(), &domain, &assertion).await {
        tracing::info!(domain, fid = ?assertion.fid, "sign-in rejected");
        return Err(ApiError::unauthorized("invalid signature"));
    }

    let token = state.tokens.issue(&assertion).map_err(|e| {
        tracing::error!(error = %e, "/auth error");
        ApiError::internal()
    })?;

    tracing::info!(domain, fid = ?assertion.fid, "session token issued");
    Ok(Json(TokenResponse { token }))
}

/// Current identity
///
/// Returns the sign-in assertion carried by the bearer token.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated identity", body = SignInAssertion),
        (status = 401, description = "Token carries no user", body = ErrorResponse),
        (status = 403, description = "Missing, malformed, invalid or expired token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn get_me(principal: Option<Extension<Principal>>) -> ApiResult<SignInAssertion> {
    match principal {
        Some(Extension(principal)) => Ok(Json(principal.into_assertion())),
        None => {
            tracing::error!("missing principal after auth middleware; route is not guarded");
            Err(ApiError::internal())
        }
    }
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> Json<HealthResponse> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp_ms,
    })
}

/// An empty body is an empty assertion and fails validation; broken JSON is a 400.
fn parse_assertion(body: &[u8]) -> Result<SignInAssertion, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SignInAssertion::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejecting malformed /auth body");
        ApiError::bad_request("invalid request body")
    })
}

/// Host (with a non-default port) of an `Origin` value.
pub fn origin_domain(origin: &str) -> Option<String> {
    let url = reqwest::Url::parse(origin).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
