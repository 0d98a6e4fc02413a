//! Command line errors and their exit statuses.

use jwtl::TokenError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for command line operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failure of a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error from token issuance or verification.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A key file is absent.
    #[error("missing {}, please generate keys first", .path.display())]
    MissingKey {
        /// Expected location of the key
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("failed {action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted
        action: &'static str,
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// An option value was rejected.
    #[error("{0}")]
    Config(String),

    /// Writing command output failed.
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// Token errors use the status of their [`jwtl::ErrorCode`]; the rest
    /// follow the BSD `sysexits` values.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Token(e) => e.code().exit_code(),
            Self::Config(_) => 2,
            Self::MissingKey { .. } => 66,
            Self::Io { .. } | Self::Output(_) => 74,
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
