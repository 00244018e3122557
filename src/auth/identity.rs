//! Identity payloads: the sign-in assertion posted by the widget and the
//! principal attached to authenticated requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sign-in status payload produced by the Farcaster auth widget.
///
/// Every field is optional on the wire so that incomplete assertions reach
/// the validator and are rejected there instead of failing deserialization.
/// The same record is embedded as the `user` claim of session tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInAssertion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "completed")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Hex encoded, `0x` prefixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 3621)]
    pub fid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
    /// Custody address of the fid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custody: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verifications: Vec<String>,
}

impl SignInAssertion {
    /// `(message, signature, nonce)` when all three are present and non-empty.
    pub fn signed_fields(&self) -> Option<(&str, &str, &str)> {
        let message = non_empty(&self.message)?;
        let signature = non_empty(&self.signature)?;
        let nonce = non_empty(&self.nonce)?;
        Some((message, signature, nonce))
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

/// Decoded identity attached to a request or WebSocket connection after
/// its session token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub SignInAssertion);

impl Principal {
    /// Farcaster id, `0` when the assertion did not carry one.
    pub fn fid(&self) -> u64 {
        self.0.fid.unwrap_or_default()
    }

    pub fn assertion(&self) -> &SignInAssertion {
        &self.0
    }

    pub fn into_assertion(self) -> SignInAssertion {
        self.0
    }
}
