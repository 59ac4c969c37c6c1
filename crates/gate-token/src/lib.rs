//! # gate-token: Session Token Service
//!
//! Issues and validates self-contained bearer tokens (compact JWS, HS256).
//! The service owns the signing key ring, the issuer identity, and the token
//! lifetime; nothing else in the workspace touches key material.
//!
//! ## Validation Pipeline
//!
//! ```text
//! header decode ─▶ alg == HS256 ─▶ MAC check (current, then retired) ─▶ exp > now ─▶ sub → UserId
//!      │                │                     │                             │              │
//!  Malformed        Malformed         SignatureInvalid                   Expired     UnknownSubject
//! ```
//!
//! Every stage short-circuits, and exactly one outcome is produced.
//!
//! ## Rotation
//!
//! The live [`KeyRing`] is an immutable snapshot. Rotation builds a new ring
//! and swaps the `Arc` under a write lock; validators clone the `Arc` and drop
//! the lock before any cryptography, so a validation observes either the old
//! ring or the new one, never a mix.
//!
//! ## Crate Policy
//!
//! - Emits no log events. Failures are returned as [`TokenError`] and the
//!   caller decides how to record them.
//! - No `.unwrap()` outside tests.

pub mod claims;
pub mod error;
pub mod key;
pub mod service;

pub use claims::TokenClaims;
pub use error::{ConfigError, SigningError, TokenError};
pub use key::{KeyRing, KeySlot, SigningSecret};
pub use service::{
    IssuedToken, TokenConfig, TokenService, Validated, DEFAULT_ISSUER, DEFAULT_LIFETIME_HOURS,
};
