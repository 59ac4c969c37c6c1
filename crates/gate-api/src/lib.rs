//! # gate-api: Axum Service Layer for tokengate
//!
//! Wires the token service and the auth gate into an HTTP application.
//!
//! ## API Surface
//!
//! | Route                  | Gate | Handler                    |
//! |------------------------|------|----------------------------|
//! | `POST /api/user/login` | no   | [`routes::session::login`] |
//! | `GET /api/user/me`     | yes  | [`routes::session::me`]    |
//! | `GET /health/liveness` | no   | [`liveness`]               |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware (protected routes only) → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod users;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use auth::{AuthGate, AuthRejection, AuthenticatedUser};
pub use config::{AppConfig, EnvConfigError};
pub use error::AppError;
pub use state::AppState;

/// Assemble the application router.
///
/// The auth gate is attached with `route_layer`, so it runs only for matched
/// protected routes; unknown paths still 404 and health checks stay open.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/user/me", get(routes::session::me))
        .route_layer(from_fn_with_state(state.gate(), auth::auth_middleware));

    let public = Router::new().route("/api/user/login", post(routes::session::login));

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .route("/health/liveness", get(liveness))
        .layer(TraceLayer::new_for_http())
}

/// Liveness check.
async fn liveness() -> &'static str {
    "ok"
}
