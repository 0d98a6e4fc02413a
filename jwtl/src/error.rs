//! Error taxonomy for token issuance and verification.
//!
//! Every failure leaves the core as one variant of [`TokenError`]:
//! - Key material problems surface at construction time
//! - Signing problems surface at issuance
//! - Malformed, downgraded, expired and forged tokens surface at verification
//!
//! Library errors from `jsonwebtoken` are classified into the same closed set
//! so callers can match on the kind instead of inspecting messages.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Non-exhaustive error enum for forward compatibility.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// PEM input is empty, malformed, not RSA or not in the expected encoding.
    #[error("cannot parse key: {reason}")]
    KeyParse {
        /// Description of the parse failure
        reason: String,
    },

    /// A fresh key pair could not be generated or encoded.
    #[error("cannot generate key pair: {reason}")]
    KeyGeneration {
        /// Description of the generation failure
        reason: String,
    },

    /// The cryptographic signing step failed.
    #[error("cannot sign token: {reason}")]
    Signing {
        /// Description of the signing failure
        reason: String,
    },

    /// The token is not a well-formed `header.payload.signature` string.
    #[error("token malformed: {reason}")]
    TokenMalformed {
        /// Description of the malformation
        reason: String,
    },

    /// The header declares an algorithm outside the RSA family.
    #[error("unexpected signing method: {alg}")]
    UnexpectedSigningMethod {
        /// Algorithm named in the token header
        alg: String,
    },

    /// The token is past its expiry or before its not-before time.
    #[error("token expired or not yet valid")]
    TokenExpired,

    /// Signature mismatch or any other claim-validity failure.
    #[error("invalid token")]
    TokenInvalid,

    /// Service configuration was rejected.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration problem
        reason: String,
    },
}

/// Stable error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    KeyParse,
    KeyGeneration,
    Signing,
    TokenMalformed,
    UnexpectedSigningMethod,
    TokenExpired,
    TokenInvalid,
    InvalidConfig,
}

impl ErrorCode {
    /// Get the string representation of the error code
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KeyParse => "JWT_KEY_PARSE",
            Self::KeyGeneration => "JWT_KEY_GENERATION",
            Self::Signing => "JWT_SIGNING",
            Self::TokenMalformed => "JWT_TOKEN_MALFORMED",
            Self::UnexpectedSigningMethod => "JWT_UNEXPECTED_SIGNING_METHOD",
            Self::TokenExpired => "JWT_TOKEN_EXPIRED",
            Self::TokenInvalid => "JWT_TOKEN_INVALID",
            Self::InvalidConfig => "JWT_INVALID_CONFIG",
        }
    }

    /// Process exit status used when this error aborts a command.
    ///
    /// Every kind maps to a distinct non-zero value.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfig => 2,
            Self::KeyParse => 10,
            Self::KeyGeneration => 11,
            Self::Signing => 12,
            Self::TokenMalformed => 20,
            Self::UnexpectedSigningMethod => 21,
            Self::TokenExpired => 22,
            Self::TokenInvalid => 23,
        }
    }
}

impl TokenError {
    /// Get the error code for this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::KeyParse { .. } => ErrorCode::KeyParse,
            Self::KeyGeneration { .. } => ErrorCode::KeyGeneration,
            Self::Signing { .. } => ErrorCode::Signing,
            Self::TokenMalformed { .. } => ErrorCode::TokenMalformed,
            Self::UnexpectedSigningMethod { .. } => ErrorCode::UnexpectedSigningMethod,
            Self::TokenExpired => ErrorCode::TokenExpired,
            Self::TokenInvalid => ErrorCode::TokenInvalid,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// True for the kinds produced while verifying a presented token.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::TokenMalformed { .. }
                | Self::UnexpectedSigningMethod { .. }
                | Self::TokenExpired
                | Self::TokenInvalid
        )
    }

    pub(crate) fn key_parse(reason: impl Into<String>) -> Self {
        Self::KeyParse {
            reason: reason.into(),
        }
    }

    pub(crate) fn key_generation(reason: impl Into<String>) -> Self {
        Self::KeyGeneration {
            reason: reason.into(),
        }
    }

    pub(crate) fn signing(reason: impl Into<String>) -> Self {
        Self::Signing {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::TokenMalformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => Self::TokenExpired,
            ErrorKind::InvalidSignature => Self::TokenInvalid,
            ErrorKind::InvalidAlgorithm => Self::UnexpectedSigningMethod {
                alg: "unsupported".to_string(),
            },
            ErrorKind::InvalidToken
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::malformed(err.to_string()),
            _ => Self::TokenInvalid,
        }
    }
}
