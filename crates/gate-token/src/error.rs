//! # Token Errors
//!
//! Three disjoint families: construction failures (fatal at startup),
//! issuance failures, and validation failures (recoverable per request).

use thiserror::Error;

/// Fatal configuration failures raised while building the token service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A signing secret was empty. `position` is `None` for the current
    /// secret and `Some(i)` for the i-th retired secret.
    #[error("signing secret must be non-empty ({})", describe_position(*.position))]
    EmptySecret {
        /// Which secret was empty.
        position: Option<usize>,
    },

    /// Token lifetime must be strictly positive and representable.
    #[error("token lifetime must be a positive, representable number of hours, got {hours}h")]
    InvalidLifetime {
        /// The rejected lifetime in whole hours.
        hours: i64,
    },
}

fn describe_position(position: Option<usize>) -> String {
    match position {
        None => "current key".to_string(),
        Some(i) => format!("retired key #{i}"),
    }
}

/// Token issuance failure.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The claims could not be encoded or signed with the current key.
    #[error("token signing failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Token validation failure.
///
/// Ordered by the pipeline stage that produces it. The variants are mutually
/// exclusive: a token fails at exactly one stage.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenError {
    /// The token structure, header, or claims payload could not be parsed,
    /// or the header names an algorithm other than HS256.
    #[error("malformed token")]
    Malformed,

    /// No key in the ring (current or retired) verifies the signature.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// Signature is valid but the token's expiry is at or before now.
    #[error("token has expired")]
    Expired,

    /// Signature and freshness pass but the subject is not a user identifier.
    #[error("token subject is not a known identity")]
    UnknownSubject,
}

impl TokenError {
    /// Stable machine-readable reason, suitable for log fields and metrics labels.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::SignatureInvalid => "signature_invalid",
            Self::Expired => "expired",
            Self::UnknownSubject => "unknown_subject",
        }
    }
}
