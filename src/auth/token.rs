use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::{Principal, SignInAssertion};

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Verified sign-in assertion. Optional so that tokens without an
    /// identity decode and can be told apart from forged ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SignInAssertion>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token is invalid or expired: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token carries no user")]
    MissingUser,
}

/// Issues and verifies HS256 session tokens. Stateless: nothing is stored
/// server-side, so a token stays valid until it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
}

impl TokenService {
    pub fn new(secret: &str, ttl: TimeDelta) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Mint a token for a verified assertion, valid for the configured ttl.
    pub fn issue(&self, user: &SignInAssertion) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        user: &SignInAssertion,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user: Some(user.clone()),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, then require a non-empty user.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(TokenError::Invalid)?;
        match token_data.claims.user {
            Some(user) if !user.is_empty() => Ok(Principal(user)),
            _ => Err(TokenError::MissingUser),
        }
    }
}
