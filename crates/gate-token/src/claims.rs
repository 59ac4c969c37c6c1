//! # Token Claims
//!
//! The signed payload: issuer, subject, issued-at, and expiry. Timestamps are
//! JWT NumericDate values (whole seconds since the Unix epoch).

use chrono::{DateTime, Duration, Utc};
use gate_core::UserId;
use serde::{Deserialize, Serialize};

/// Registered claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer identity.
    pub iss: String,
    /// Subject: the canonical text form of a [`UserId`].
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Build claims for `subject`, valid from `issued_at` for `lifetime`.
    pub fn new(issuer: &str, subject: UserId, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(lifetime.num_seconds()),
        }
    }

    /// Issued-at as a UTC timestamp, if representable.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Expiry as a UTC timestamp, if representable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// A token is expired at `now` iff `exp <= now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}
