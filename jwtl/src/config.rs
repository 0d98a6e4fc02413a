//! Token service configuration.
//!
//! Issuer name, validity window and the clock used for issuance and
//! verification are an explicit value handed to
//! [`TokenService::with_config`](crate::TokenService::with_config).

use crate::error::{Result, TokenError};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Issuer name used by the developer command line.
pub const DEFAULT_ISSUER: &str = "Developer Command Line";

/// Validity window applied when no other period is configured.
pub const DEFAULT_VALID_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Validity window of [`TokenService::new`](crate::TokenService::new).
pub const FIXED_VALID_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Create a clock that always reports `at`.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Value of the `iss` claim
    pub issuer: String,
    /// Distance between issuance and the `exp` claim
    pub valid_period: Duration,
    /// Clock skew tolerated when checking `exp` and `nbf`
    pub leeway: Duration,
    /// Time source for issuance and verification
    pub clock: Arc<dyn Clock>,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            valid_period: DEFAULT_VALID_PERIOD,
            leeway: Duration::ZERO,
            clock: Arc::new(SystemClock),
        }
    }
}

impl TokenServiceConfig {
    /// Create config with the given issuer and default settings.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            ..Self::default()
        }
    }

    /// Set the validity window.
    #[must_use]
    pub const fn with_valid_period(mut self, period: Duration) -> Self {
        self.valid_period = period;
        self
    }

    /// Set the tolerated clock skew.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Set the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Check the configuration can produce tokens that expire in the future.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidConfig`] for a validity window shorter
    /// than one second or durations that overflow a Unix timestamp. Any
    /// issuer, including an empty one, is accepted.
    pub fn validate(&self) -> Result<()> {
        if self.valid_period.as_secs() == 0 {
            return Err(TokenError::config("valid period must be at least one second"));
        }
        self.valid_period_secs()?;
        self.leeway_secs()?;
        Ok(())
    }

    pub(crate) fn valid_period_secs(&self) -> Result<i64> {
        i64::try_from(self.valid_period.as_secs())
            .map_err(|_| TokenError::config("valid period is too large"))
    }

    pub(crate) fn leeway_secs(&self) -> Result<i64> {
        i64::try_from(self.leeway.as_secs()).map_err(|_| TokenError::config("leeway is too large"))
    }
}

/// Parse a duration written as a sequence of decimal numbers with unit
/// suffixes, such as `90s`, `60m`, `1.5h` or `1h30m`.
///
/// Supported units are `h`, `m`, `s`, `ms`, `us` (or `µs`) and `ns`. A
/// leading `+` and a bare `0` are accepted; negative durations are not.
///
/// # Errors
///
/// Returns [`TokenError::InvalidConfig`] when the text is empty, a number is
/// missing, a unit is unknown, or the total overflows.
pub fn parse_duration(text: &str) -> Result<Duration> {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    // Fraction digits beyond nanosecond precision of an hour are dropped.
    const MAX_FRACTION_DIGITS: usize = 18;

    let text = text.trim();
    if text.is_empty() {
        return Err(TokenError::config("empty duration"));
    }
    let invalid = || TokenError::config(format!("invalid duration: {text}"));

    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(invalid());
        }

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            _ => return Err(invalid()),
        };

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut part = whole.checked_mul(scale).ok_or_else(invalid)?;

        let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            let exponent = u32::try_from(fraction.len()).map_err(|_| invalid())?;
            part = part
                .checked_add(digits * scale / 10_u128.pow(exponent))
                .ok_or_else(invalid)?;
        }

        total = total.checked_add(part).ok_or_else(invalid)?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = u32::try_from(total % NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, nanos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_config() {
        let config = TokenServiceConfig::default();
        assert_eq!(config.issuer, DEFAULT_ISSUER);
        assert_eq!(config.valid_period, DEFAULT_VALID_PERIOD);
        assert_eq!(config.leeway, Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let config = TokenServiceConfig::new("tests")
            .with_valid_period(Duration::from_secs(90))
            .with_leeway(Duration::from_secs(5))
            .with_clock(Arc::new(FixedClock::new(at)));

        assert_eq!(config.issuer, "tests");
        assert_eq!(config.valid_period, Duration::from_secs(90));
        assert_eq!(config.leeway, Duration::from_secs(5));
        assert_eq!(config.clock.now(), at);
    }

    #[test]
    fn test_validate_rejects_sub_second_period() {
        let config = TokenServiceConfig::default().with_valid_period(Duration::from_millis(500));
        assert!(matches!(config.validate(), Err(TokenError::InvalidConfig { .. })));
    }

    #[test]
    fn test_validate_accepts_any_issuer() {
        assert!(TokenServiceConfig::new("").validate().is_ok());
        assert!(TokenServiceConfig::new("  ").validate().is_ok());
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("60m").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(86400));
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_duration_fractions_and_small_units() {
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5m").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("+2.25s").unwrap(), Duration::from_millis(2250));
        assert_eq!(parse_duration("1h0.5m").unwrap(), Duration::from_secs(3630));
        assert_eq!(parse_duration("250us").unwrap(), Duration::from_micros(250));
        assert_eq!(parse_duration("3µs").unwrap(), Duration::from_micros(3));
        assert_eq!(parse_duration("40ns").unwrap(), Duration::from_nanos(40));
        assert_eq!(parse_duration("1.000000001s").unwrap(), Duration::new(1, 1));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for text in ["", "m", "10", "10d", "1h-5m", "abc", ".", "1.2.3s", "-5m", "+"] {
            assert!(parse_duration(text).is_err(), "{text} should be rejected");
        }
    }
}
