//! farstack - Sign In With Farcaster gateway
//!
//! Exchanges a sign-in assertion produced by the Farcaster auth widget for a
//! short-lived session token, and gates HTTP and WebSocket access with it.
//!
//! # Modules
//!
//! - [`auth`] - Signature validation, session tokens, token middleware
//! - [`gateway`] - HTTP routes (`POST /auth`, `GET /me`) and server wiring
//! - [`websocket`] - Token-gated WebSocket channel and connection registry
//! - [`config`] - YAML + environment configuration
//! - [`logging`] - tracing subscriber setup

pub mod auth;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod websocket;

pub use auth::{Principal, SignInAssertion, SignInVerifier, TokenService};
pub use config::AppConfig;
pub use gateway::{build_router, run_server, state::AppState};
