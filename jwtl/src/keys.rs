//! RSA key material.
//!
//! Loads PEM-encoded keys into signing/verifying keys and generates fresh
//! key pairs for local development.
//!
//! Accepted encodings:
//! - Private keys: `RSA PRIVATE KEY` blocks holding PKCS#1 DER
//! - Public keys: `PUBLIC KEY` blocks holding SubjectPublicKeyInfo DER

use crate::error::{Result, TokenError};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// Size in bits of generated keys.
pub const KEY_SIZE: usize = 2048;

/// Smallest modulus accepted when loading keys.
pub const MIN_KEY_SIZE: usize = 2048;

/// PEM label of private keys.
pub const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label of public keys.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// PEM-encoded RSA key pair.
#[derive(Clone)]
pub struct KeyPair {
    private_pem: Zeroizing<Vec<u8>>,
    public_pem: Vec<u8>,
}

impl KeyPair {
    /// PKCS#1 private key PEM.
    #[must_use]
    pub fn private_pem(&self) -> &[u8] {
        &self.private_pem
    }

    /// SubjectPublicKeyInfo public key PEM.
    #[must_use]
    pub fn public_pem(&self) -> &[u8] {
        &self.public_pem
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_pem", &"[REDACTED]")
            .field("public_pem", &String::from_utf8_lossy(&self.public_pem))
            .finish()
    }
}

/// Generate an RSA-2048 key pair from the operating system's CSPRNG.
///
/// # Errors
///
/// Returns [`TokenError::KeyGeneration`] if the key cannot be generated or
/// encoded.
#[instrument]
pub fn generate_key_pair() -> Result<KeyPair> {
    let mut rng = rand::rngs::OsRng;
    let private = RsaPrivateKey::new(&mut rng, KEY_SIZE)
        .map_err(|e| TokenError::key_generation(e.to_string()))?;

    let private_pem = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| TokenError::key_generation(format!("PKCS#1 encoding failed: {e}")))?;
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| TokenError::key_generation(format!("SPKI encoding failed: {e}")))?;

    debug!(bits = KEY_SIZE, "generated key pair");

    Ok(KeyPair {
        private_pem: Zeroizing::new(private_pem.as_bytes().to_vec()),
        public_pem: public_pem.into_bytes(),
    })
}

/// Parse a PKCS#1 private key PEM.
///
/// # Errors
///
/// Returns [`TokenError::KeyParse`] for empty, malformed, mislabelled,
/// inconsistent or undersized keys.
pub fn parse_private_key_pem(pem: &[u8]) -> Result<RsaPrivateKey> {
    let text = pem_text(pem, "private")?;
    let key = RsaPrivateKey::from_pkcs1_pem(text).map_err(|e| {
        TokenError::key_parse(format!("private key is not a {PRIVATE_KEY_LABEL} block: {e}"))
    })?;
    key.validate()
        .map_err(|e| TokenError::key_parse(format!("private key is inconsistent: {e}")))?;
    ensure_key_size(key.size())?;
    Ok(key)
}

/// Parse a SubjectPublicKeyInfo public key PEM.
///
/// # Errors
///
/// Returns [`TokenError::KeyParse`] for empty, malformed, mislabelled,
/// non-RSA or undersized keys.
pub fn parse_public_key_pem(pem: &[u8]) -> Result<RsaPublicKey> {
    let text = pem_text(pem, "public")?;
    let key = RsaPublicKey::from_public_key_pem(text).map_err(|e| {
        TokenError::key_parse(format!("public key is not an RSA {PUBLIC_KEY_LABEL} block: {e}"))
    })?;
    ensure_key_size(key.size())?;
    Ok(key)
}

pub(crate) fn signing_key_from_pem(pem: &[u8]) -> Result<EncodingKey> {
    let key = parse_private_key_pem(pem)?;
    let der = key
        .to_pkcs1_der()
        .map_err(|e| TokenError::key_parse(format!("private key re-encoding failed: {e}")))?;
    Ok(EncodingKey::from_rsa_der(der.as_bytes()))
}

pub(crate) fn verifying_key_from_pem(pem: &[u8]) -> Result<DecodingKey> {
    let key = parse_public_key_pem(pem)?;
    let der = key
        .to_pkcs1_der()
        .map_err(|e| TokenError::key_parse(format!("public key re-encoding failed: {e}")))?;
    Ok(DecodingKey::from_rsa_der(der.as_bytes()))
}

fn pem_text<'a>(pem: &'a [u8], which: &str) -> Result<&'a str> {
    let text = std::str::from_utf8(pem)
        .map_err(|_| TokenError::key_parse(format!("{which} key PEM is not valid UTF-8")))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(TokenError::key_parse(format!("{which} key PEM is empty")));
    }
    Ok(text)
}

fn ensure_key_size(modulus_bytes: usize) -> Result<()> {
    let bits = modulus_bytes * 8;
    if bits < MIN_KEY_SIZE {
        return Err(TokenError::key_parse(format!(
            "RSA key of {bits} bits is below the {MIN_KEY_SIZE}-bit minimum"
        )));
    }
    Ok(())
}
