//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:6969/docs`
//! - OpenAPI JSON: `http://localhost:6969/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::SignInAssertion;
use crate::gateway::types::{ErrorResponse, HealthResponse, TokenResponse};

/// Bearer session token issued by `POST /auth`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "farstack API",
        version = "0.1.0",
        description = "Exchanges Sign In With Farcaster assertions for session tokens. \
            The WebSocket endpoint `GET /ws?token=<token>` is gated by the same token."
    ),
    servers(
        (url = "http://localhost:6969", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::post_auth,
        crate::gateway::handlers::get_me,
        crate::gateway::handlers::health_check,
    ),
    components(schemas(SignInAssertion, TokenResponse, ErrorResponse, HealthResponse)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-in and session identity"),
        (name = "System", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/auth"));
        assert!(paths.iter().any(|p| *p == "/me"));
        assert!(paths.iter().any(|p| *p == "/health"));
    }
}
