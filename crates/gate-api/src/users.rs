//! # Login Collaborator
//!
//! The token core never sees passwords. Login resolves a username/password
//! pair to a [`UserId`] through a [`CredentialVerifier`], then asks the token
//! service to issue a token for that identity.
//!
//! [`StaticUserDirectory`] is the bundled verifier: an in-memory table loaded
//! from a JSON file of `{username, user_id, password_hash}` records, where
//! `password_hash` is an Argon2 PHC string (`$argon2id$v=19$...`).

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use gate_core::UserId;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use thiserror::Error;

/// Opaque credential check used by the login route.
pub trait CredentialVerifier: Send + Sync {
    /// Resolve credentials to a user, or `None` if they do not match.
    fn verify(&self, username: &str, password: &str) -> Option<UserId>;
}

/// One entry of the user directory file.
#[derive(Clone, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub user_id: UserId,
    /// Argon2 hash of the password in PHC string format.
    pub password_hash: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("user_id", &self.user_id)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Errors loading a user directory or hashing a password for one.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read user directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid user directory JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate username in user directory: {0}")]
    DuplicateUser(String),

    #[error("password hash for {username} is not a valid PHC string: {reason}")]
    InvalidHash { username: String, reason: String },

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash `password` with Argon2id under a fresh random salt, producing the
/// PHC string stored in the directory file.
pub fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);
    hash_with_salt(password, &salt)
}

fn hash_with_salt(password: &str, salt: &[u8]) -> Result<String, DirectoryError> {
    let salt = SaltString::encode_b64(salt).map_err(|e| DirectoryError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DirectoryError::Hashing(e.to_string()))
}

/// Hash checked when the username is unknown, so a miss costs the same as a
/// wrong password.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_with_salt("tokengate-dummy-password", &[0x5a; 16]).ok())
        .as_deref()
}

fn password_matches(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
        .is_ok()
}

/// In-memory username → record table.
#[derive(Debug, Default)]
pub struct StaticUserDirectory {
    users: HashMap<String, UserRecord>,
}

impl StaticUserDirectory {
    /// Build a directory from records.
    ///
    /// # Errors
    ///
    /// Rejects duplicate usernames and hashes that do not parse as PHC strings.
    pub fn new(records: Vec<UserRecord>) -> Result<Self, DirectoryError> {
        let mut users = HashMap::with_capacity(records.len());
        for record in records {
            if let Err(e) = PasswordHash::new(&record.password_hash) {
                return Err(DirectoryError::InvalidHash {
                    username: record.username,
                    reason: e.to_string(),
                });
            }
            if users.contains_key(&record.username) {
                return Err(DirectoryError::DuplicateUser(record.username));
            }
            users.insert(record.username.clone(), record);
        }
        Ok(Self { users })
    }

    /// Parse a JSON array of records.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DirectoryError> {
        let records: Vec<UserRecord> = serde_json::from_slice(bytes)?;
        Self::new(records)
    }

    /// Load a JSON array of records from `path`.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialVerifier for StaticUserDirectory {
    fn verify(&self, username: &str, password: &str) -> Option<UserId> {
        match self.users.get(username) {
            Some(record) => {
                password_matches(password, &record.password_hash).then_some(record.user_id)
            }
            None => {
                if let Some(dummy) = dummy_hash() {
                    password_matches(password, dummy);
                }
                None
            }
        }
    }
}
