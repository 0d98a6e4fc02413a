//! Developer command line for `jwtl`.
//!
//! Generates RSA key pairs on disk and issues, validates and inspects RS256
//! tokens with them. Key locations and token lifetimes come from flags, the
//! environment or a `.env` file.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::{Cli, Command, ConsumerArgs, KeyOptions};
pub use commands::run;
pub use config::{CliConfig, KeyPaths};
pub use error::{CliError, Result};
pub use logging::{init_tracing, LoggingConfig};
