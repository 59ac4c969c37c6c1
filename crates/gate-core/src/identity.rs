//! # User Identity
//!
//! [`UserId`] is the only payload a session token carries. It is parsed once,
//! at the validation boundary, and is a distinct type everywhere after that:
//! handlers never see the raw subject string.
//!
//! ## Canonical Form
//!
//! The text form is plain ASCII decimal digits. Signs, whitespace, and
//! separators are rejected so that exactly one string maps to each identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Identifier of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Create a user identifier from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Access the numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    /// Parse the canonical decimal form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUserId`] for empty input, any
    /// non-digit character (including a leading `+`), or overflow.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidUserId(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidUserId(s.to_string()))
    }
}
