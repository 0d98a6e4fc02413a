//! Claims signed into every token.

use crate::consumer::{Consumer, SanitisedConsumer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed payload of a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Sanitised identity of the consumer.
    pub consumer: SanitisedConsumer,
    /// Expiry as Unix seconds.
    pub exp: i64,
    /// Issuer name.
    pub iss: String,
    /// Unique token identifier.
    pub jti: String,
    /// Not-before as Unix seconds. Never set on issued tokens, honoured when
    /// present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

impl Claims {
    /// Claims for `consumer` issued at `issued_at` and expiring
    /// `valid_for_secs` later, with a fresh random `jti`.
    pub fn new(
        consumer: &Consumer,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        valid_for_secs: i64,
    ) -> Self {
        Self {
            consumer: SanitisedConsumer::from(consumer),
            exp: issued_at.timestamp().saturating_add(valid_for_secs),
            iss: issuer.into(),
            jti: uuid::Uuid::new_v4().to_string(),
            nbf: None,
        }
    }

    /// Set the not-before claim.
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Expiry as an instant, or the Unix epoch if out of range.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// True once `timestamp` is past `exp` by more than `leeway` seconds.
    pub fn is_expired_at(&self, timestamp: i64, leeway: i64) -> bool {
        timestamp.saturating_sub(leeway) > self.exp
    }

    /// True when `timestamp` lies inside the `nbf`..=`exp` window.
    pub fn is_valid_at(&self, timestamp: i64, leeway: i64) -> bool {
        if let Some(nbf) = self.nbf {
            if timestamp.saturating_add(leeway) < nbf {
                return false;
            }
        }
        !self.is_expired_at(timestamp, leeway)
    }
}
