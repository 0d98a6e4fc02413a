//! Type-state token with compile-time verification guarantees.
//!
//! A [`Token<Unverified>`] is only structurally decoded: its claims can be
//! peeked at but are not authenticated. A [`Token<Verified>`] can only be
//! produced by [`TokenService::verify`](crate::TokenService::verify), so
//! holding one means the algorithm, signature and validity window all
//! checked out.

use crate::claims::Claims;
use crate::consumer::SanitisedConsumer;
use crate::error::{Result, TokenError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::marker::PhantomData;

mod private {
    pub trait Sealed {}
}

/// Marker trait for token verification states.
pub trait TokenState: private::Sealed {
    /// Human-readable state name for debugging
    fn state_name() -> &'static str;
}

/// Decoded but not verified.
#[derive(Debug)]
pub struct Unverified;
impl private::Sealed for Unverified {}
impl TokenState for Unverified {
    fn state_name() -> &'static str {
        "Unverified"
    }
}

/// Algorithm, signature and validity window verified.
#[derive(Debug)]
pub struct Verified;
impl private::Sealed for Verified {}
impl TokenState for Verified {
    fn state_name() -> &'static str {
        "Verified"
    }
}

/// JOSE header fields this crate reads.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    /// Declared signing algorithm
    pub alg: String,
    /// Declared media type
    #[serde(default)]
    pub typ: Option<String>,
}

/// A decoded token in verification state `S`.
#[derive(Debug)]
pub struct Token<S: TokenState> {
    raw: String,
    header: TokenHeader,
    claims: Claims,
    _state: PhantomData<S>,
}

impl Token<Unverified> {
    /// Decode `header.payload.signature` without checking the signature.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenMalformed`] unless the input has exactly
    /// three base64url segments whose header and payload are JSON of the
    /// expected shape. An empty signature is left for verification to reject.
    pub fn parse(raw: &str) -> Result<Self> {
        let [header, payload, signature] = split_segments(raw)?;
        let header: TokenHeader = decode_json_segment(header, "header")?;
        let claims: Claims = decode_json_segment(payload, "payload")?;
        decode_segment(signature, "signature")?;

        Ok(Self {
            raw: raw.to_string(),
            header,
            claims,
            _state: PhantomData,
        })
    }

    /// Get read-only access to claims that have not been authenticated.
    pub fn peek_claims(&self) -> &Claims {
        &self.claims
    }
}

impl Token<Verified> {
    pub(crate) fn verified(raw: &str, header: TokenHeader, claims: Claims) -> Self {
        Self {
            raw: raw.to_string(),
            header,
            claims,
            _state: PhantomData,
        }
    }

    /// Authenticated claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Authenticated consumer.
    pub fn consumer(&self) -> &SanitisedConsumer {
        &self.claims.consumer
    }

    /// Get the issuer claim
    pub fn issuer(&self) -> &str {
        &self.claims.iss
    }

    /// Get the JWT ID
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

impl<S: TokenState> Token<S> {
    /// Get the current state name
    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }

    /// Algorithm declared in the header.
    pub fn algorithm(&self) -> &str {
        &self.header.alg
    }

    /// Get the token header
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Get the raw token string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Consume the token and return its claims, authenticated only in the
    /// [`Verified`] state.
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// Decode only the header. Payload and signature are checked against the
/// base64url alphabet but not decoded, so tampered content is left for the
/// signature check.
pub(crate) fn decode_header(raw: &str) -> Result<TokenHeader> {
    let [header, payload, signature] = split_segments(raw)?;
    ensure_base64url(payload, "payload")?;
    ensure_base64url(signature, "signature")?;
    decode_json_segment(header, "header")
}

/// Decode only the payload into `T`, ignoring the header and signature.
pub(crate) fn peek_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let [_, payload, _] = split_segments(raw)?;
    decode_json_segment(payload, "payload")
}

fn ensure_base64url(segment: &str, name: &str) -> Result<()> {
    match segment
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
    {
        Some(offset) => Err(TokenError::malformed(format!(
            "{name} is not base64url: invalid symbol at offset {offset}"
        ))),
        None => Ok(()),
    }
}

fn split_segments(raw: &str) -> Result<[&str; 3]> {
    let mut segments = raw.split('.');
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(TokenError::malformed("expected three dot-separated segments")),
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::malformed(format!("{name} is not base64url: {e}")))
}

fn decode_json_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T> {
    let bytes = decode_segment(segment, name)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::malformed(format!("{name} is not valid JSON: {e}")))
}
