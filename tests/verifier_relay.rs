use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;

use farstack::SignInAssertion;
use farstack::auth::{HttpSignInVerifier, SignInVerifier, VerifierError, VerifyRequest, validate_sign_in};

/// Relay stand-in: accepts signature `0xgood` for domain `example.com`.
async fn spawn_relay() -> String {
    async fn verify(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["nonce"] == "boom" {
            return (StatusCode::BAD_GATEWAY, Json(json!({ "error": "upstream" })));
        }
        let success = body["signature"] == "0xgood" && body["domain"] == "example.com";
        (StatusCode::OK, Json(json!({ "success": success, "fid": 3621 })))
    }

    let app = Router::new().route("/verify", post(verify));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/verify", addr)
}

fn assertion(signature: &str, nonce: &str) -> SignInAssertion {
    SignInAssertion {
        message: Some("example.com wants you to sign in".into()),
        signature: Some(signature.into()),
        nonce: Some(nonce.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn relay_success_and_failure() {
    let url = spawn_relay().await;
    let verifier = HttpSignInVerifier::new(url, Duration::from_secs(5)).unwrap();

    assert!(validate_sign_in(&verifier, "example.com", &assertion("0xgood", "n1")).await);
    assert!(!validate_sign_in(&verifier, "example.com", &assertion("0xbad", "n1")).await);
    assert!(!validate_sign_in(&verifier, "evil.com", &assertion("0xgood", "n1")).await);
}

#[tokio::test]
async fn relay_error_status_is_an_error() {
    let url = spawn_relay().await;
    let verifier = HttpSignInVerifier::new(url, Duration::from_secs(5)).unwrap();

    let request = VerifyRequest {
        message: "m".into(),
        signature: "0xgood".into(),
        domain: "example.com".into(),
        nonce: "boom".into(),
    };
    let err = verifier.verify_sign_in(&request).await.unwrap_err();
    assert!(matches!(err, VerifierError::Status(502)));

    assert!(!validate_sign_in(&verifier, "example.com", &assertion("0xgood", "boom")).await);
}

#[tokio::test]
async fn unreachable_relay_counts_as_invalid() {
    // bind then drop to get a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verifier =
        HttpSignInVerifier::new(format!("http://{}/verify", addr), Duration::from_secs(2)).unwrap();
    assert!(!validate_sign_in(&verifier, "example.com", &assertion("0xgood", "n1")).await);
}
