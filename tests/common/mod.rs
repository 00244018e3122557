#![allow(dead_code)]

use async_trait::async_trait;
use chrono::TimeDelta;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use farstack::auth::{
    SignInAssertion, SignInVerifier, TokenService, VerifierError, VerifyRequest, VerifyResponse,
};
use farstack::config::AppConfig;
use farstack::{AppState, build_router};

pub const SECRET: &str = "test-secret";
pub const ORIGIN: &str = "http://localhost:5173";
pub const GOOD_SIGNATURE: &str = "0xgood";

/// Accepts only `GOOD_SIGNATURE` and records every call.
#[derive(Default)]
pub struct StubVerifier {
    calls: Mutex<Vec<VerifyRequest>>,
}

impl StubVerifier {
    pub fn calls(&self) -> Vec<VerifyRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignInVerifier for StubVerifier {
    async fn verify_sign_in(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerifyResponse, VerifierError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(VerifyResponse {
            success: request.signature == GOOD_SIGNATURE,
        })
    }
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    pub tokens: TokenService,
    pub verifier: Arc<StubVerifier>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn ws_url(&self, query: &str) -> String {
        format!("ws://{}/ws{}", self.addr, query)
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some(SECRET.to_string());
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let tokens = TokenService::new(SECRET, TimeDelta::hours(1)).unwrap();
    let verifier = Arc::new(StubVerifier::default());
    let state = Arc::new(AppState::new(
        Arc::new(config),
        tokens.clone(),
        verifier.clone(),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        addr,
        state,
        tokens,
        verifier,
        client: reqwest::Client::new(),
    }
}

/// Poll the connection registry until it reports `expected` or a second passes.
pub async fn wait_for_stats(app: &TestApp, expected: (usize, usize)) -> (usize, usize) {
    let mut stats = app.state.ws_manager.stats();
    for _ in 0..50 {
        if stats == expected {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stats = app.state.ws_manager.stats();
    }
    stats
}

pub fn alice() -> SignInAssertion {
    SignInAssertion {
        state: Some("completed".into()),
        nonce: Some("abcd1234".into()),
        message: Some("localhost:5173 wants you to sign in with your Ethereum account".into()),
        signature: Some(GOOD_SIGNATURE.into()),
        fid: Some(3621),
        username: Some("alice".into()),
        display_name: Some("Alice".into()),
        pfp_url: Some("https://example.com/alice.png".into()),
        custody: Some("0xc0ffee".into()),
        verifications: vec!["0xbeef".into()],
        ..Default::default()
    }
}
