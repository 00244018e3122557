pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{SignInVerifier, TokenService, jwt_auth_middleware};
use crate::config::AppConfig;
use crate::websocket::ws_handler;
use state::AppState;

/// Build the gateway router: `POST /auth`, `GET /me`, `GET /ws`, `GET /health`, docs.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Routes behind the session token
    let protected_routes = Router::new()
        .route("/me", get(handlers::get_me))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/auth", post(handlers::post_auth))
        .route("/health", get(handlers::health_check))
        // Token checked during the upgrade handshake
        .route("/ws", get(ws_handler))
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        // Browser clients sign in from another origin
        .layer(CorsLayer::permissive())
}

/// Wire state from configuration and serve until the listener fails.
pub async fn run_server(
    config: Arc<AppConfig>,
    verifier: Arc<dyn SignInVerifier>,
) -> anyhow::Result<()> {
    let secret = config.auth.secret().unwrap_or_default();
    let ttl = config.auth.ttl()?;
    let tokens = TokenService::new(secret, ttl).context("failed to create token service")?;

    let host = config.gateway.host.clone();
    let port = config
        .gateway
        .port
        .ok_or(crate::config::ConfigError::MissingPort)?;

    let state = Arc::new(AppState::new(config, tokens, verifier));
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {} (port already in use?)", addr))?;

    tracing::info!(%addr, ttl_secs = ttl.num_seconds(), "Gateway listening");
    tracing::info!("WebSocket endpoint: ws://{}/ws?token=<token>", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .await
        .context("gateway server error")?;
    Ok(())
}
