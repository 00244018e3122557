use std::sync::Arc;

use crate::auth::{AuthError, SignInVerifier, TokenService};
use crate::config::AppConfig;
use crate::websocket::ConnectionManager;

/// Gateway state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Immutable startup configuration
    pub config: Arc<AppConfig>,
    /// Session token issuer/verifier
    pub tokens: TokenService,
    /// External sign-in signature verifier
    pub verifier: Arc<dyn SignInVerifier>,
    /// Open WebSocket connections
    pub ws_manager: Arc<ConnectionManager>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        tokens: TokenService,
        verifier: Arc<dyn SignInVerifier>,
    ) -> Self {
        Self {
            config,
            tokens,
            verifier,
            ws_manager: Arc::new(ConnectionManager::new()),
        }
    }

    /// Apply the configured rejection granularity to a middleware error.
    pub fn auth_rejection(&self, err: AuthError) -> AuthError {
        if self.config.auth.detailed_errors {
            err
        } else {
            err.coarse()
        }
    }
}
