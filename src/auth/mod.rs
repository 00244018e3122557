//! Farcaster sign-in and session tokens.
//!
//! - [`verifier`] checks a widget sign-in assertion against the external verifier
//! - [`token`] issues and verifies stateless session tokens
//! - [`middleware`] gates HTTP routes and WebSocket handshakes with those tokens

pub mod error;
pub mod identity;
pub mod middleware;
pub mod token;
pub mod verifier;

pub use error::{AuthError, AuthErrorCode};
pub use identity::{Principal, SignInAssertion};
pub use middleware::{authenticate, extract_bearer, jwt_auth_middleware};
pub use token::{Claims, TokenError, TokenService};
pub use verifier::{
    HttpSignInVerifier, SignInVerifier, VerifierError, VerifyRequest, VerifyResponse,
    validate_sign_in,
};
