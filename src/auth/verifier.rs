//! Sign-in signature validation.
//!
//! The cryptographic check (SIWE message signature against the custody
//! address registered for the fid) lives behind [`SignInVerifier`]. This
//! module only screens malformed input and folds every failure into `false`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::identity::SignInAssertion;

/// Arguments of a single verification call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyRequest {
    pub message: String,
    pub signature: String,
    pub domain: String,
    pub nonce: String,
}

/// Verifier answer; extra fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("verifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("verifier responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait SignInVerifier: Send + Sync {
    async fn verify_sign_in(&self, request: &VerifyRequest)
    -> Result<VerifyResponse, VerifierError>;
}

/// Verifier backed by an HTTP verification relay.
///
/// POSTs the request as JSON and expects `{"success": bool}` back.
pub struct HttpSignInVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpSignInVerifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, VerifierError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SignInVerifier for HttpSignInVerifier {
    async fn verify_sign_in(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerifyResponse, VerifierError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifierError::Status(status.as_u16()));
        }
        Ok(response.json::<VerifyResponse>().await?)
    }
}

/// Check a sign-in assertion for `domain`.
///
/// Returns false without calling the verifier when the domain is empty or
/// the assertion lacks a message, signature or nonce. Otherwise makes exactly
/// one verifier call; errors count as a failed verification.
pub async fn validate_sign_in(
    verifier: &dyn SignInVerifier,
    domain: &str,
    assertion: &SignInAssertion,
) -> bool {
    if domain.is_empty() {
        return false;
    }
    let Some((message, signature, nonce)) = assertion.signed_fields() else {
        tracing::debug!(fid = ?assertion.fid, "sign-in assertion is missing signed fields");
        return false;
    };

    let request = VerifyRequest {
        message: message.to_string(),
        signature: signature.to_string(),
        domain: domain.to_string(),
        nonce: nonce.to_string(),
    };

    match verifier.verify_sign_in(&request).await {
        Ok(response) => response.success,
        Err(e) => {
            tracing::warn!(error = %e, domain, "sign-in verification call failed");
            false
        }
    }
}
