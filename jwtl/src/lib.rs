//! Minimal JSON Web Token issuance and verification for developer tooling.
//!
//! Signs tokens carrying a consumer identity with an RSA key pair (RS256)
//! and verifies/decodes them again:
//! - [`TokenService`] is built once from PEM key material and an issuer
//! - [`TokenService::generate_token`] signs a sanitised [`Consumer`]
//! - [`TokenService::validate_token`] checks algorithm, signature and expiry
//! - [`TokenService::inspect`] decodes claims and reports whether they are
//!   trusted
//!
//! [`keys::generate_key_pair`] produces fresh PEM key pairs for local use.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod config;
pub mod consumer;
pub mod error;
pub mod keys;
pub mod service;
pub mod token;

// Re-exports for convenience
pub use claims::Claims;
pub use config::{Clock, FixedClock, SystemClock, TokenServiceConfig};
pub use consumer::{AuthToken, Consumer, SanitisedConsumer};
pub use error::{ErrorCode, Result, TokenError};
pub use keys::{generate_key_pair, KeyPair};
pub use service::{Inspection, TokenService, Trust};
pub use token::{Token, TokenHeader, Unverified, Verified};
