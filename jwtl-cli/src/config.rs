//! Resolution of command line options into key locations and service
//! configuration.

use crate::cli::KeyOptions;
use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use jwtl::config::{parse_duration, DEFAULT_ISSUER};
use jwtl::{FixedClock, TokenServiceConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the key directory.
pub const KEYS_PATH_ENV: &str = "JWT_KEYS_PATH";
/// Environment variable holding the key pair name.
pub const KEYS_NAME_ENV: &str = "JWT_KEYS_NAME";
/// Environment variable holding the public key file.
pub const PUBLIC_KEY_ENV: &str = "JWT_PUBLIC_KEY_PATH";
/// Environment variable holding the private key file.
pub const PRIVATE_KEY_ENV: &str = "JWT_PRIVATE_KEY_PATH";
/// Environment variable holding the token validity period.
pub const VALID_PERIOD_ENV: &str = "JWT_VALID_PERIOD";

/// File name suffix of private keys.
pub const PRIVATE_KEY_SUFFIX: &str = "private_unencrypted";
/// File name suffix of public keys.
pub const PUBLIC_KEY_SUFFIX: &str = "public";

/// On-disk location of a named key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    /// Directory holding both keys
    pub dir: PathBuf,
    /// Name shared by both key files
    pub name: String,
    /// `<dir>/<name>.private_unencrypted.pem`
    pub private: PathBuf,
    /// `<dir>/<name>.public.pem`
    pub public: PathBuf,
}

impl KeyPaths {
    /// Key file locations for the pair `name` inside `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let dir = dir.into();
        let name = name.into();
        Self {
            private: key_file(&dir, &name, PRIVATE_KEY_SUFFIX),
            public: key_file(&dir, &name, PUBLIC_KEY_SUFFIX),
            dir,
            name,
        }
    }
}

fn key_file(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{name}.{suffix}.pem"))
}

/// Options resolved into concrete values.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Key pair location
    pub keys: KeyPaths,
    /// Validity period as written by the user
    pub valid_period_text: String,
    /// Parsed validity period
    pub valid_period: Duration,
    /// Pinned current time, if any
    pub valid_from: Option<DateTime<Utc>>,
}

impl CliConfig {
    /// Resolve the key directory, validity period and clock.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] when no key directory is given and the
    /// home directory is unknown, or when the period or timestamp cannot be
    /// parsed.
    pub fn from_options(options: &KeyOptions) -> Result<Self> {
        let dir = match &options.path {
            Some(path) => path.clone(),
            None => dirs::home_dir().ok_or_else(|| {
                CliError::Config(format!(
                    "cannot determine home directory, set --path or {KEYS_PATH_ENV}"
                ))
            })?,
        };

        let valid_period = parse_duration(&options.valid_period).map_err(|e| {
            CliError::Config(format!("cannot parse token valid period duration: {e}"))
        })?;

        let valid_from = options
            .valid_from
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Self {
            keys: KeyPaths::new(dir, options.name.clone()),
            valid_period_text: options.valid_period.clone(),
            valid_period,
            valid_from,
        })
    }

    /// Service configuration issuing as the developer command line.
    #[must_use]
    pub fn service_config(&self) -> TokenServiceConfig {
        let config = TokenServiceConfig::new(DEFAULT_ISSUER).with_valid_period(self.valid_period);
        match self.valid_from {
            Some(at) => config.with_clock(Arc::new(FixedClock::new(at))),
            None => config,
        }
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| CliError::Config(format!("cannot parse token valid from timestamp: {e}")))
}
