//! # Validation Errors
//!
//! Errors raised when a domain primitive is built from untrusted text.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
///
/// Each variant carries the rejected input so that callers can report it
/// without re-deriving it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// User identifier is not a canonical unsigned decimal that fits in 64 bits.
    #[error("invalid user ID: \"{0}\" (expected an unsigned decimal integer)")]
    InvalidUserId(String),
}
