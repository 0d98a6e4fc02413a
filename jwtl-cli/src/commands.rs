//! Command implementations.
//!
//! Each command writes its result to the given writer and returns an error
//! instead of exiting, so `main` owns the process exit status.

use crate::cli::{Cli, Command, ConsumerArgs};
use crate::config::{
    CliConfig, KeyPaths, KEYS_NAME_ENV, KEYS_PATH_ENV, PRIVATE_KEY_ENV, PUBLIC_KEY_ENV,
    VALID_PERIOD_ENV,
};
use crate::error::{CliError, Result};
use jwtl::{generate_key_pair, AuthToken, Consumer, TokenService, Trust};
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Run the parsed command line.
///
/// # Errors
///
/// Returns the first failure of option resolution, file access, key loading,
/// issuance or verification.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = CliConfig::from_options(&cli.keys)?;
    match &cli.command {
        Command::Setup => setup(&config, out),
        Command::New(args) => new_token(&config, args, out),
        Command::Validate { token } => validate(&config, token, out),
        Command::Inspect { token } => inspect(&config, token, out),
    }
}

/// Generate a key pair into the configured directory.
///
/// Existing keys with the same name are overwritten.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the directory or key files cannot be written.
pub fn setup(config: &CliConfig, out: &mut impl Write) -> Result<()> {
    let keys = &config.keys;
    fs::create_dir_all(&keys.dir).map_err(|e| CliError::io("creating", &keys.dir, e))?;

    let pair = generate_key_pair()?;
    write_key(&keys.private, pair.private_pem(), true)?;
    write_key(&keys.public, pair.public_pem(), false)?;
    info!(name = %keys.name, dir = %keys.dir.display(), "generated key pair");

    writeln!(
        out,
        "Generated key pair\n  {}\n  {}\n",
        keys.private.display(),
        keys.public.display()
    )?;
    writeln!(
        out,
        "Please export this into your environment to reuse the configuration:\n"
    )?;
    writeln!(out, "export {KEYS_PATH_ENV}={}", keys.dir.display())?;
    writeln!(out, "export {KEYS_NAME_ENV}={}", keys.name)?;
    writeln!(out, "export {PUBLIC_KEY_ENV}={}", keys.public.display())?;
    writeln!(out, "export {PRIVATE_KEY_ENV}={}", keys.private.display())?;
    writeln!(out, "export {VALID_PERIOD_ENV}={}", config.valid_period_text)?;
    Ok(())
}

/// Issue a token for the consumer described by `args`.
///
/// # Errors
///
/// Returns [`CliError::MissingKey`] when the key pair has not been generated
/// and token errors from loading keys or signing.
pub fn new_token(config: &CliConfig, args: &ConsumerArgs, out: &mut impl Write) -> Result<()> {
    let service = load_service(config)?;
    let consumer = Consumer::new(
        args.uid,
        args.firstname.as_str(),
        args.lastname.as_str(),
        args.lang.as_str(),
    )
    .with_grants(args.grants.iter().map(String::as_str))
    .with_roles(args.roles.iter().copied());

    let token = service.generate_token(&consumer)?;
    writeln!(out, "{token}")?;
    Ok(())
}

/// Verify a token and print its expiry.
///
/// # Errors
///
/// Returns the rejection as a token error, so the exit status names the
/// reason.
pub fn validate(config: &CliConfig, token: &str, out: &mut impl Write) -> Result<()> {
    let service = load_service(config)?;
    let verified = service.verify(token.trim())?;
    writeln!(out, "valid until {}", verified.expires_at().to_rfc3339())?;
    Ok(())
}

/// Print the decoded claims of a token with their trust verdict.
///
/// A token that decodes but fails verification is still printed, marked
/// unverified.
///
/// # Errors
///
/// Returns [`jwtl::TokenError::TokenMalformed`] when the token cannot be
/// decoded.
pub fn inspect(config: &CliConfig, token: &str, out: &mut impl Write) -> Result<()> {
    let service = load_service(config)?;
    let inspection = service.inspect(&AuthToken::jwt(token.trim()))?;

    let report = match inspection.trust() {
        Trust::Verified => json!({
            "trust": "verified",
            "claims": inspection.claims(),
        }),
        Trust::Unverified(reason) => json!({
            "trust": "unverified",
            "reason": reason.to_string(),
            "code": reason.code().as_str(),
            "claims": inspection.claims(),
        }),
    };
    serde_json::to_writer_pretty(&mut *out, &report).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn load_service(config: &CliConfig) -> Result<TokenService> {
    let KeyPaths { private, public, .. } = &config.keys;
    let private_pem = read_key(private)?;
    let public_pem = read_key(public)?;
    debug!(private = %private.display(), public = %public.display(), "loading key pair");

    Ok(TokenService::with_config(&private_pem, &public_pem, config.service_config())?)
}

fn read_key(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(CliError::MissingKey {
            path: path.to_path_buf(),
        });
    }
    fs::read(path).map_err(|e| CliError::io("reading", path, e))
}

fn write_key(path: &Path, pem: &[u8], private: bool) -> Result<()> {
    fs::write(path, pem).map_err(|e| CliError::io("writing", path, e))?;
    if private {
        restrict_permissions(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| CliError::io("restricting", path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
