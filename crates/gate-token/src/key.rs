//! # Signing Keys
//!
//! [`SigningSecret`] wraps raw HMAC secret bytes; [`KeyRing`] is the immutable
//! set of one current secret plus zero or more retired secrets.
//!
//! ## Security Invariant
//!
//! Secret bytes are zeroized on drop and never appear in `Debug` output.
//! Retired secrets verify tokens but are never used to sign.

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::ConfigError;

// ── SigningSecret ───────────────────────────────────────────────────────────

/// Opaque HMAC secret.
#[derive(Clone)]
pub struct SigningSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl SigningSecret {
    /// Wrap secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] (with no position) if `bytes` is empty.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ConfigError::EmptySecret { position: None });
        }
        Ok(Self {
            bytes: Zeroizing::new(bytes),
        })
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for SigningSecret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.as_slice().ct_eq(other.bytes.as_slice()).into()
    }
}

impl Eq for SigningSecret {}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningSecret").field(&"[REDACTED]").finish()
    }
}

// ── KeySlot ─────────────────────────────────────────────────────────────────

/// Which entry of the ring verified a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// The current signing key.
    Current,
    /// A retired key, by index into the retired list (0 = most recently retired).
    Retired(usize),
}

// ── KeyRing ─────────────────────────────────────────────────────────────────

/// A secret with its pre-built verification key.
#[derive(Clone)]
pub(crate) struct KeyEntry {
    secret: SigningSecret,
    decoding: DecodingKey,
}

impl KeyEntry {
    fn new(secret: SigningSecret) -> Self {
        let decoding = DecodingKey::from_secret(secret.as_bytes());
        Self { secret, decoding }
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Immutable key set: `{current} ++ retired`.
///
/// Never mutated in place. [`rotated`](Self::rotated) and
/// [`without`](Self::without) return new rings that the token service swaps
/// in wholesale.
#[derive(Clone)]
pub struct KeyRing {
    current: KeyEntry,
    encoding: EncodingKey,
    retired: Vec<KeyEntry>,
}

impl KeyRing {
    /// Build a ring from a current secret and retired secrets (newest first).
    pub fn new(current: SigningSecret, retired: Vec<SigningSecret>) -> Self {
        let encoding = EncodingKey::from_secret(current.as_bytes());
        Self {
            current: KeyEntry::new(current),
            encoding,
            retired: retired.into_iter().map(KeyEntry::new).collect(),
        }
    }

    /// Build a ring from raw secret strings, as read from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySecret`] naming the first empty secret.
    pub fn from_secrets<S: AsRef<str>>(current: &str, retired: &[S]) -> Result<Self, ConfigError> {
        let current = SigningSecret::new(current.as_bytes())?;
        let retired = retired
            .iter()
            .enumerate()
            .map(|(i, s)| {
                SigningSecret::new(s.as_ref().as_bytes())
                    .map_err(|_| ConfigError::EmptySecret { position: Some(i) })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(current, retired))
    }

    /// The secret used for issuance.
    pub fn current(&self) -> &SigningSecret {
        &self.current.secret
    }

    /// Retired secrets, newest first.
    pub fn retired(&self) -> impl ExactSizeIterator<Item = &SigningSecret> {
        self.retired.iter().map(|e| &e.secret)
    }

    /// Number of retired secrets still accepted for validation.
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    /// Entries in verification order: current first, then retired in list order.
    pub(crate) fn verification_order(&self) -> impl Iterator<Item = (KeySlot, &KeyEntry)> {
        std::iter::once((KeySlot::Current, &self.current)).chain(
            self.retired
                .iter()
                .enumerate()
                .map(|(i, e)| (KeySlot::Retired(i), e)),
        )
    }

    /// Promote `next` to current and push the previous current key to the
    /// front of the retired list.
    pub fn rotated(&self, next: SigningSecret) -> Self {
        let mut retired = Vec::with_capacity(self.retired.len() + 1);
        retired.push(self.current.secret.clone());
        retired.extend(self.retired().cloned());
        Self::new(next, retired)
    }

    /// Drop `secret` from the retired list. The current key is never removed.
    pub fn without(&self, secret: &SigningSecret) -> Self {
        let retired = self.retired().filter(|s| *s != secret).cloned().collect();
        Self::new(self.current.secret.clone(), retired)
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRing")
            .field("current", &"[REDACTED]")
            .field("retired", &self.retired.len())
            .finish()
    }
}
