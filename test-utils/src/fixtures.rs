//! Test fixtures with sample key material and services.
//!
//! The PEM files under `fixtures/` were produced with
//! `openssl genrsa -traditional` and `openssl rsa -pubout`, matching the
//! encodings written by `jwtl setup`.

use chrono::{DateTime, Utc};
use jwtl::{Consumer, FixedClock, TokenService, TokenServiceConfig};
use std::sync::Arc;
use std::time::Duration;

/// PEM-encoded key pair fixture.
#[derive(Debug, Clone, Copy)]
pub struct PemPair {
    /// `RSA PRIVATE KEY` (PKCS#1) PEM
    pub private: &'static [u8],
    /// `PUBLIC KEY` (SPKI) PEM
    pub public: &'static [u8],
}

/// Issuer name used by fixture services.
pub const TEST_ISSUER: &str = "jwtl-tests";

/// First RSA-2048 key pair.
pub const PRIMARY: PemPair = PemPair {
    private: include_bytes!("../fixtures/primary.private.pem"),
    public: include_bytes!("../fixtures/primary.public.pem"),
};

/// Second, unrelated RSA-2048 key pair.
pub const SECONDARY: PemPair = PemPair {
    private: include_bytes!("../fixtures/secondary.private.pem"),
    public: include_bytes!("../fixtures/secondary.public.pem"),
};

/// RSA-1024 key pair, below the accepted minimum.
pub const UNDERSIZED: PemPair = PemPair {
    private: include_bytes!("../fixtures/undersized.private.pem"),
    public: include_bytes!("../fixtures/undersized.public.pem"),
};

/// Service over `pair` with the 24 hour default validity.
///
/// # Panics
///
/// Panics if the fixture keys fail to load.
#[must_use]
#[allow(clippy::expect_used)]
pub fn service(pair: PemPair) -> TokenService {
    TokenService::new(pair.private, pair.public, TEST_ISSUER).expect("fixture keys load")
}

/// Service over `pair` whose clock is pinned to `at`, issuing tokens valid
/// for `valid_for`.
///
/// # Panics
///
/// Panics if the fixture keys fail to load.
#[must_use]
#[allow(clippy::expect_used)]
pub fn service_at(pair: PemPair, at: DateTime<Utc>, valid_for: Duration) -> TokenService {
    let config = TokenServiceConfig::new(TEST_ISSUER)
        .with_valid_period(valid_for)
        .with_clock(Arc::new(FixedClock::new(at)));
    TokenService::with_config(pair.private, pair.public, config).expect("fixture keys load")
}

/// The consumer from the development scenario.
#[must_use]
pub fn dev_consumer() -> Consumer {
    Consumer::new(1, "dev", "dev", "en").with_grants(["read", "write"])
}
