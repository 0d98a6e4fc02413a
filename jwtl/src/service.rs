//! Token issuance and verification.

use crate::claims::Claims;
use crate::config::{TokenServiceConfig, FIXED_VALID_PERIOD};
use crate::consumer::{AuthToken, Consumer, SanitisedConsumer};
use crate::error::{Result, TokenError};
use crate::keys;
use crate::token::{decode_header, peek_payload, Token, Unverified, Verified};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument};

/// Algorithm every issued token is signed with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

/// Issues and verifies RS256 tokens for one key pair and issuer.
///
/// Holds only immutable key material after construction, so a single
/// instance can be shared across threads for issuance and verification.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: TokenServiceConfig,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("valid_period", &self.config.valid_period)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service that issues tokens valid for 24 hours.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::KeyParse`] if either PEM cannot be parsed.
    pub fn new(private_pem: &[u8], public_pem: &[u8], issuer: impl Into<String>) -> Result<Self> {
        let config = TokenServiceConfig::new(issuer).with_valid_period(FIXED_VALID_PERIOD);
        Self::with_config(private_pem, public_pem, config)
    }

    /// Create a service from PEM key material and an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfig`] if the configuration is rejected
    /// and [`TokenError::KeyParse`] if either PEM cannot be parsed.
    pub fn with_config(
        private_pem: &[u8],
        public_pem: &[u8],
        config: TokenServiceConfig,
    ) -> Result<Self> {
        config.validate()?;
        let encoding_key = keys::signing_key_from_pem(private_pem)?;
        let decoding_key = keys::verifying_key_from_pem(public_pem)?;

        debug!(issuer = %config.issuer, valid_period = ?config.valid_period, "token service ready");

        Ok(Self {
            encoding_key,
            decoding_key,
            config,
        })
    }

    /// Issuer written into every token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Sign a token for `consumer`.
    ///
    /// Roles and tokens held by the consumer are dropped; only the sanitised
    /// subset is signed.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if the signature cannot be produced.
    #[instrument(skip_all, fields(consumer_id = consumer.id))]
    pub fn generate_token(&self, consumer: &Consumer) -> Result<AuthToken> {
        let claims = Claims::new(
            consumer,
            self.config.issuer.clone(),
            self.config.clock.now(),
            self.config.valid_period_secs()?,
        );

        let value = encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::signing(e.to_string()))?;

        debug!(jti = %claims.jti, exp = claims.exp, "issued token");
        Ok(AuthToken::jwt(value))
    }

    /// Verify an encoded token and return it in the verified state.
    ///
    /// Checks run in order: structure, declared algorithm, signature,
    /// validity window.
    ///
    /// # Errors
    ///
    /// - [`TokenError::TokenMalformed`] for a structurally invalid token
    /// - [`TokenError::UnexpectedSigningMethod`] for a non-RSA algorithm
    /// - [`TokenError::TokenInvalid`] for a signature mismatch
    /// - [`TokenError::TokenExpired`] outside the `nbf`..=`exp` window
    pub fn verify(&self, token: &str) -> Result<Token<Verified>> {
        // Algorithm first, so a downgraded header never reaches key use.
        let header = decode_header(token)?;
        let algorithm = rsa_algorithm(&header.alg)?;

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        let now = self.config.clock.now().timestamp();
        if !claims.is_valid_at(now, self.config.leeway_secs()?) {
            return Err(TokenError::TokenExpired);
        }

        Ok(Token::<Verified>::verified(token, header, claims))
    }

    /// Validate an authentication token.
    ///
    /// The token is valid iff this returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns the rejection kind, as for [`TokenService::verify`].
    #[instrument(skip_all)]
    pub fn validate_token(&self, token: &AuthToken) -> Result<()> {
        self.verify(token.value()).map(|_| ()).map_err(|e| {
            debug!(code = e.code().as_str(), "token rejected");
            e
        })
    }

    /// Boolean form of [`TokenService::validate_token`].
    #[must_use]
    pub fn is_valid(&self, token: &AuthToken) -> bool {
        self.validate_token(token).is_ok()
    }

    /// Decode a token and report whether its claims can be trusted.
    ///
    /// Unlike [`TokenService::verify`], a token that decodes but fails
    /// verification still yields its claims, marked
    /// [`Trust::Unverified`] with the reason.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::TokenMalformed`] when the token cannot be
    /// decoded at all.
    pub fn inspect(&self, token: &AuthToken) -> Result<Inspection> {
        let parsed = Token::<Unverified>::parse(token.value())?;
        let trust = match self.verify(token.value()) {
            Ok(_) => Trust::Verified,
            Err(reason) => Trust::Unverified(reason),
        };
        Ok(Inspection {
            claims: parsed.into_claims(),
            trust,
        })
    }

    /// Consumer embedded in a token, or `None` if the payload has no
    /// readable `consumer`.
    ///
    /// Only the payload is decoded; other claims may be absent.
    ///
    /// The consumer is returned whether or not the token verifies. Call
    /// [`TokenService::validate_token`] first, or use
    /// [`TokenService::inspect`], before treating it as authenticated.
    #[must_use]
    pub fn token_consumer(&self, token: &AuthToken) -> Option<SanitisedConsumer> {
        peek_payload::<ConsumerClaim>(token.value())
            .ok()
            .map(|claim| claim.consumer)
    }

    /// Expiry of a token, or the Unix epoch if the token cannot be decoded.
    ///
    /// Like [`TokenService::token_consumer`], this does not require the
    /// token to verify.
    #[must_use]
    pub fn token_expiry(&self, token: &AuthToken) -> DateTime<Utc> {
        peek_payload::<ExpiryClaim>(token.value())
            .ok()
            .and_then(|claim| DateTime::from_timestamp(claim.exp, 0))
            .unwrap_or_default()
    }
}

/// Payload shape read by [`TokenService::token_consumer`].
#[derive(Deserialize)]
struct ConsumerClaim {
    consumer: SanitisedConsumer,
}

/// Payload shape read by [`TokenService::token_expiry`].
#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

fn rsa_algorithm(alg: &str) -> Result<Algorithm> {
    match alg {
        "RS256" => Ok(Algorithm::RS256),
        "RS384" => Ok(Algorithm::RS384),
        "RS512" => Ok(Algorithm::RS512),
        other => Err(TokenError::UnexpectedSigningMethod {
            alg: other.to_string(),
        }),
    }
}

/// Whether inspected claims were authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trust {
    /// Algorithm, signature and validity window all checked out.
    Verified,
    /// Decoded, but verification failed for the contained reason.
    Unverified(TokenError),
}

/// Decoded claims together with their verification verdict.
#[derive(Debug, Clone)]
pub struct Inspection {
    claims: Claims,
    trust: Trust,
}

impl Inspection {
    /// Decoded claims. Authenticated only if [`Inspection::is_verified`].
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Verification verdict.
    #[must_use]
    pub const fn trust(&self) -> &Trust {
        &self.trust
    }

    /// True when the claims are authenticated.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self.trust, Trust::Verified)
    }

    /// Claims, only if authenticated.
    #[must_use]
    pub const fn verified_claims(&self) -> Option<&Claims> {
        match self.trust {
            Trust::Verified => Some(&self.claims),
            Trust::Unverified(_) => None,
        }
    }

    /// Consume the inspection and return the decoded consumer.
    #[must_use]
    pub fn into_consumer(self) -> SanitisedConsumer {
        self.claims.consumer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedClock;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::time::Duration;

    const PRIVATE: &[u8] = include_bytes!("../../test-utils/fixtures/primary.private.pem");
    const PUBLIC: &[u8] = include_bytes!("../../test-utils/fixtures/primary.public.pem");

    fn service() -> TokenService {
        TokenService::new(PRIVATE, PUBLIC, "tests").unwrap()
    }

    fn consumer() -> Consumer {
        Consumer::new(1, "dev", "dev", "en").with_grants(["read"]).with_roles([3])
    }

    #[test]
    fn test_generate_and_verify() {
        let service = service();
        let token = service.generate_token(&consumer()).unwrap();

        assert_eq!(token.token_type(), "jwt");
        let verified = service.verify(token.value()).unwrap();
        assert_eq!(verified.state_name(), "Verified");
        assert_eq!(verified.issuer(), "tests");
        assert_eq!(verified.consumer(), &consumer().sanitised());
        assert_eq!(verified.algorithm(), "RS256");
    }

    #[test]
    fn test_default_validity_is_24_hours() {
        let at = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
        let config = TokenServiceConfig::new("tests")
            .with_valid_period(FIXED_VALID_PERIOD)
            .with_clock(Arc::new(FixedClock::new(at)));
        let service = TokenService::with_config(PRIVATE, PUBLIC, config).unwrap();

        let token = service.generate_token(&consumer()).unwrap();
        assert_eq!(service.token_expiry(&token), at + chrono::Duration::hours(24));
        assert_eq!(service.config().valid_period, Duration::from_secs(86_400));
    }

    #[test]
    fn test_invalid_config_rejected_before_keys() {
        let config = TokenServiceConfig::new("tests").with_valid_period(Duration::ZERO);
        let err = TokenService::with_config(b"", b"", config).unwrap_err();
        assert!(matches!(err, TokenError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rsa_algorithm_family() {
        assert_eq!(rsa_algorithm("RS256").unwrap(), Algorithm::RS256);
        assert_eq!(rsa_algorithm("RS512").unwrap(), Algorithm::RS512);
        for alg in ["none", "HS256", "PS256", "ES256", "rs256", ""] {
            assert_eq!(
                rsa_algorithm(alg).unwrap_err(),
                TokenError::UnexpectedSigningMethod { alg: alg.to_string() }
            );
        }
    }

    #[test]
    fn test_inspection_marks_expired_as_unverified() {
        let past = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let config = TokenServiceConfig::new("tests").with_clock(Arc::new(FixedClock::new(past)));
        let issuer = TokenService::with_config(PRIVATE, PUBLIC, config).unwrap();
        let token = issuer.generate_token(&consumer()).unwrap();

        let inspection = service().inspect(&token).unwrap();
        assert!(!inspection.is_verified());
        assert_eq!(inspection.trust(), &Trust::Unverified(TokenError::TokenExpired));
        assert!(inspection.verified_claims().is_none());
        assert_eq!(inspection.claims().consumer.id, 1);
    }

    #[test]
    fn test_debug_omits_keys() {
        let debug = format!("{:?}", service());
        assert!(debug.contains("tests"));
        assert!(!debug.contains("encoding_key"));
    }
}
