//! # Application State
//!
//! Shared state for the Axum application, passed to route handlers via the
//! `State` extractor. Both members are process-wide and read-mostly.

use std::sync::Arc;

use gate_token::TokenService;

use crate::auth::AuthGate;
use crate::users::CredentialVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Token issuance and validation.
    pub tokens: Arc<TokenService>,
    /// Login credential check.
    pub users: Arc<dyn CredentialVerifier>,
}

impl AppState {
    /// Create state from a token service and a credential verifier.
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn CredentialVerifier>) -> Self {
        Self { tokens, users }
    }

    /// Auth gate backed by this state's token service.
    pub fn gate(&self) -> AuthGate {
        AuthGate::new(Arc::clone(&self.tokens))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("users", &"[dyn CredentialVerifier]")
            .finish()
    }
}
