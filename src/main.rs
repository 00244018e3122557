//! farstack gateway entry point
//!
//! ```text
//! widget ──signed message──▶ POST /auth ──▶ verifier ──▶ session token
//!                                                          │
//!        GET /me  (Authorization: Bearer <token>) ◀────────┤
//!        GET /ws?token=<token>                    ◀────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use farstack::auth::HttpSignInVerifier;
use farstack::config::AppConfig;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut config = AppConfig::load(&env).context("invalid configuration")?;
    if let Some(port) = get_port_override() {
        config.gateway.port = Some(port);
    }
    let _log_guard = farstack::logging::init_logging(&config);

    tracing::info!(
        env = %env,
        git_hash = env!("GIT_HASH"),
        "Starting farstack gateway"
    );

    let verifier = HttpSignInVerifier::new(
        config.verifier.url.clone(),
        Duration::from_secs(config.verifier.timeout_secs),
    )
    .context("failed to build verifier client")?;
    tracing::info!(url = verifier.url(), "Sign-in verifier configured");

    farstack::run_server(Arc::new(config), Arc::new(verifier)).await
}
