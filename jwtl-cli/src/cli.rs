//! Command line definition.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate RSA key pairs and development tokens.
#[derive(Debug, Parser)]
#[command(name = "jwtl", version, about)]
pub struct Cli {
    /// Key location and token lifetime options
    #[command(flatten)]
    pub keys: KeyOptions,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Where key pairs live and how long issued tokens last.
#[derive(Debug, Clone, Args)]
pub struct KeyOptions {
    /// Directory to use or generate the keys in [default: home directory]
    #[arg(long, env = "JWT_KEYS_PATH", global = true)]
    pub path: Option<PathBuf>,

    /// Name of the key pair inside the directory
    #[arg(long, env = "JWT_KEYS_NAME", default_value = "jwt", global = true)]
    pub name: String,

    /// How long issued tokens stay valid, e.g. 60m or 1h30m
    #[arg(long, env = "JWT_VALID_PERIOD", default_value = "60m", global = true)]
    pub valid_period: String,

    /// RFC 3339 timestamp used as the current time [default: now]
    #[arg(long, env = "JWT_VALID_FROM", global = true)]
    pub valid_from: Option<String>,
}

/// Commands of the developer command line.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new RSA key pair
    Setup,
    /// Generate a token signed with the key pair
    New(ConsumerArgs),
    /// Check a token against the key pair
    Validate {
        /// Encoded token
        token: String,
    },
    /// Decode a token and report whether it verifies
    Inspect {
        /// Encoded token
        token: String,
    },
}

/// Identity written into a new token.
#[derive(Debug, Clone, Args)]
pub struct ConsumerArgs {
    /// ID of the consumer
    #[arg(long, default_value_t = 1)]
    pub uid: i64,

    /// First name of the consumer
    #[arg(long, default_value = "John")]
    pub firstname: String,

    /// Last name of the consumer
    #[arg(long, default_value = "Doe")]
    pub lastname: String,

    /// Language of the consumer
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Grants of the consumer as a comma separated list
    #[arg(long, value_delimiter = ',', default_values = ["read", "write"])]
    pub grants: Vec<String>,

    /// Role IDs of the consumer as a comma separated list
    #[arg(long, value_delimiter = ',')]
    pub roles: Vec<i64>,
}
