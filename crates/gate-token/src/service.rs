//! # Token Service
//!
//! Process-wide issuer and validator of session tokens. Constructed once at
//! startup from [`TokenConfig`] and shared as `Arc<TokenService>`.
//!
//! All operations are pure in-memory computations over an immutable
//! [`KeyRing`] snapshot; the service is `Send + Sync` and needs no external
//! locking. The only mutation is key rotation, which swaps the snapshot.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use gate_core::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use parking_lot::RwLock;

use crate::claims::TokenClaims;
use crate::error::{ConfigError, SigningError, TokenError};
use crate::key::{KeyRing, KeySlot, SigningSecret};

/// Issuer used when configuration does not name one.
pub const DEFAULT_ISSUER: &str = "tokengate";

/// Default token lifetime in hours.
pub const DEFAULT_LIFETIME_HOURS: i64 = 24;

// ── Configuration ───────────────────────────────────────────────────────────

/// Token service configuration.
///
/// Custom `Debug` redacts every secret.
#[derive(Clone)]
pub struct TokenConfig {
    /// Current signing secret. Required, non-empty.
    pub secret: String,
    /// Retired secrets still accepted for validation, newest first.
    pub retired_secrets: Vec<String>,
    /// Issuer written into every token.
    pub issuer: String,
    /// Token lifetime in whole hours.
    pub lifetime_hours: i64,
}

impl TokenConfig {
    /// Configuration with the given current secret and all other fields defaulted.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set the retired secrets (newest first).
    pub fn with_retired<I, S>(mut self, retired: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retired_secrets = retired.into_iter().map(Into::into).collect();
        self
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the lifetime in whole hours.
    pub fn with_lifetime_hours(mut self, hours: i64) -> Self {
        self.lifetime_hours = hours;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            retired_secrets: Vec::new(),
            issuer: DEFAULT_ISSUER.to_string(),
            lifetime_hours: DEFAULT_LIFETIME_HOURS,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("retired_secrets", &self.retired_secrets.len())
            .field("issuer", &self.issuer)
            .field("lifetime_hours", &self.lifetime_hours)
            .finish()
    }
}

// ── Results ─────────────────────────────────────────────────────────────────

/// A freshly issued token with the claims it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialized token (`header.claims.signature`).
    pub token: String,
    /// The signed claims.
    pub claims: TokenClaims,
}

/// A successfully validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    /// The resolved identity.
    pub user_id: UserId,
    /// The verified claims.
    pub claims: TokenClaims,
    /// Which key verified the signature.
    pub key: KeySlot,
}

// ── TokenService ────────────────────────────────────────────────────────────

/// Issues and validates HS256 session tokens against a rotatable key ring.
pub struct TokenService {
    keys: RwLock<Arc<KeyRing>>,
    issuer: String,
    lifetime: Duration,
    header: Header,
    validation: Validation,
}

impl TokenService {
    /// Build the service from configuration.
    ///
    /// # Errors
    ///
    /// Fails if any secret is empty or the lifetime is not a positive number
    /// of hours that fits in a `chrono::Duration`. Both are fatal startup
    /// conditions: the service cannot operate without them.
    pub fn new(config: TokenConfig) -> Result<Self, ConfigError> {
        let hours = config.lifetime_hours;
        let lifetime = Some(hours)
            .filter(|h| *h > 0)
            .and_then(Duration::try_hours)
            .ok_or(ConfigError::InvalidLifetime { hours })?;
        let ring = KeyRing::from_secrets(&config.secret, &config.retired_secrets)?;
        Ok(Self::with_key_ring(ring, config.issuer, lifetime))
    }

    /// Build the service from an already-constructed key ring.
    pub fn with_key_ring(ring: KeyRing, issuer: impl Into<String>, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an injectable clock after the signature.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: RwLock::new(Arc::new(ring)),
            issuer: issuer.into(),
            lifetime,
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    /// Issuer written into new tokens.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Lifetime of new tokens.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Current key ring snapshot.
    pub fn keys(&self) -> Arc<KeyRing> {
        Arc::clone(&self.keys.read())
    }

    // -- Issuance ------------------------------------------------------------

    /// Issue a token for `user`, valid from now for the configured lifetime.
    pub fn issue(&self, user: UserId) -> Result<IssuedToken, SigningError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` as if the current time were `now`.
    pub fn issue_at(&self, user: UserId, now: DateTime<Utc>) -> Result<IssuedToken, SigningError> {
        let claims = TokenClaims::new(&self.issuer, user, now, self.lifetime);
        let keys = self.keys();
        let token = jsonwebtoken::encode(&self.header, &claims, keys.encoding_key())?;
        Ok(IssuedToken { token, claims })
    }

    // -- Validation ----------------------------------------------------------

    /// Validate `token` against the current time and return its subject.
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as if the current time were `now` and return its subject.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        self.verify_at(token, now).map(|v| v.user_id)
    }

    /// Validate `token` as if the current time were `now`, returning the
    /// claims and the key slot that verified it.
    ///
    /// Stages run in order and the first failure wins:
    ///
    /// 1. The header must decode and name HS256. Anything else is
    ///    [`TokenError::Malformed`] and no key is tried.
    /// 2. The MAC is checked with the current key, then each retired key.
    ///    Only a MAC mismatch moves on to the next key; if none match, the
    ///    result is [`TokenError::SignatureInvalid`].
    /// 3. `exp <= now` is [`TokenError::Expired`].
    /// 4. A subject that is not a [`UserId`] is [`TokenError::UnknownSubject`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Validated, TokenError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::Malformed);
        }

        let keys = self.keys();
        let (claims, key) = self.verify_signature(token, &keys)?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .sub
            .parse::<UserId>()
            .map_err(|_| TokenError::UnknownSubject)?;

        Ok(Validated {
            user_id,
            claims,
            key,
        })
    }

    fn verify_signature(
        &self,
        token: &str,
        keys: &KeyRing,
    ) -> Result<(TokenClaims, KeySlot), TokenError> {
        for (slot, entry) in keys.verification_order() {
            match jsonwebtoken::decode::<TokenClaims>(token, entry.decoding_key(), &self.validation)
            {
                Ok(data) => return Ok((data.claims, slot)),
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => continue,
                Err(_) => return Err(TokenError::Malformed),
            }
        }
        Err(TokenError::SignatureInvalid)
    }

    // -- Rotation ------------------------------------------------------------

    /// Promote `next` to current and retire the previous current key.
    ///
    /// Tokens signed with the previous key keep validating until they expire.
    pub fn rotate(&self, next: SigningSecret) {
        let mut guard = self.keys.write();
        let rotated = guard.rotated(next);
        *guard = Arc::new(rotated);
    }

    /// Replace the whole key ring, e.g. after an operator reloads configuration.
    ///
    /// Tokens signed only by keys absent from `ring` stop validating.
    pub fn replace_keys(&self, ring: KeyRing) {
        *self.keys.write() = Arc::new(ring);
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &*self.keys.read())
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}
