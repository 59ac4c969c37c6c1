//! # Session Routes
//!
//! `POST /api/user/login` exchanges credentials for a bearer token.
//! `GET /api/user/me` returns the identity the auth gate resolved.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use gate_core::UserId;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: UserId,
}

/// Verify credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let user_id = state
        .users
        .verify(&req.username, &req.password)
        .ok_or_else(|| {
            tracing::info!(username = %req.username, "login rejected");
            AppError::InvalidLogin
        })?;

    let issued = state.tokens.issue(user_id)?;
    let expires_at = issued
        .claims
        .expires_at()
        .ok_or_else(|| AppError::Internal("token expiry out of range".into()))?;

    tracing::info!(user_id = %user_id, "user logged in");
    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at,
    }))
}

/// Return the authenticated caller's identity.
pub async fn me(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.user_id(),
    })
}
