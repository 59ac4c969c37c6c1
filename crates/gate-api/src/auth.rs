//! # Authentication Gate
//!
//! Bearer token middleware in front of every protected route.
//!
//! ## Request State Machine
//!
//! ```text
//! Start ─▶ Authorization present? ─▶ "Bearer " prefix? ─▶ TokenService::verify_at
//!               │ no                       │ no                 │ ok          │ err
//!               ▼                          ▼                    ▼             ▼
//!        MissingCredential          MissingCredential     Authenticated  InvalidCredential
//! ```
//!
//! Rejections short-circuit with 401 before the inner service runs. There are
//! no retries within a request.
//!
//! ## AuthenticatedUser
//!
//! On success the gate inserts an [`AuthenticatedUser`] into the request
//! extensions. The type is the context key; handlers extract it via its
//! `FromRequestParts` impl.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use gate_core::UserId;
use gate_token::{KeySlot, TokenError, TokenService};
use thiserror::Error;

use crate::error::{AppError, ErrorBody};

/// Scheme prefix expected in the `Authorization` header. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

// ── AuthenticatedUser ───────────────────────────────────────────────────────

/// Identity resolved by the gate, available to downstream handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    /// The resolved user identifier.
    pub fn user_id(&self) -> UserId {
        self.0
    }
}

/// Extracts the identity that the auth middleware injected into extensions.
/// Returns 401 if no identity is present (the route is not behind the gate).
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no authenticated user in request context".into()))
    }
}

// ── Rejection ───────────────────────────────────────────────────────────────

/// Why the gate refused a request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header, a non-UTF-8 value, or a scheme other than Bearer.
    /// The token service was never consulted.
    #[error("missing bearer credential")]
    MissingCredential,

    /// A bearer token was presented and the token service rejected it.
    #[error("invalid bearer credential: {0}")]
    InvalidCredential(TokenError),
}

impl AuthRejection {
    /// Stable machine-readable reason for log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidCredential(e) => e.reason(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIALS",
            Self::InvalidCredential(_) => "INVALID_CREDENTIALS",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.code(), self.to_string());
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
            Json(body),
        )
            .into_response()
    }
}

// ── AuthGate ────────────────────────────────────────────────────────────────

/// Request filter that turns a bearer token into an [`AuthenticatedUser`].
///
/// Holds only a shared handle to the token service, so it is cheap to clone
/// and needs no locking. The service is a required constructor argument: a
/// gate without a token service cannot be built.
#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    /// Create a gate backed by `tokens`.
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Decide whether a request with these headers may proceed.
    pub fn intercept(&self, headers: &HeaderMap) -> Result<UserId, AuthRejection> {
        let token = extract_bearer(headers).ok_or(AuthRejection::MissingCredential)?;
        let verified = self
            .tokens
            .verify_at(token, Utc::now())
            .map_err(AuthRejection::InvalidCredential)?;

        if let KeySlot::Retired(index) = verified.key {
            tracing::debug!(
                user_id = %verified.user_id,
                retired_index = index,
                "token verified with retired signing key"
            );
        }
        Ok(verified.user_id)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Axum middleware wrapping [`AuthGate::intercept`].
///
/// Mount with `axum::middleware::from_fn_with_state(gate, auth_middleware)`.
pub async fn auth_middleware(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.intercept(request.headers()) {
        Ok(user_id) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser(user_id));
            next.run(request).await
        }
        Err(rejection) => {
            tracing::warn!(
                reason = rejection.reason(),
                path = %request.uri().path(),
                "authentication failed"
            );
            rejection.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use chrono::{DateTime, Duration};
    use gate_token::{SigningSecret, TokenConfig};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn tokens(secret: &str) -> Arc<TokenService> {
        Arc::new(TokenService::new(TokenConfig::new(secret).with_lifetime_hours(1)).unwrap())
    }

    /// Router whose protected handler counts its invocations.
    fn test_app(tokens: Arc<TokenService>, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/test",
                get(move |user: AuthenticatedUser| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        user.user_id().to_string()
                    }
                }),
            )
            .route_layer(from_fn_with_state(AuthGate::new(tokens), auth_middleware))
    }

    fn request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn error_code(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        err["error"]["code"].as_str().unwrap().to_string()
    }

    // ── intercept ────────────────────────────────────────────────

    #[test]
    fn intercept_accepts_valid_token() {
        let svc = tokens("s1");
        let token = svc.issue(UserId::new(42)).unwrap().token;
        let gate = AuthGate::new(svc);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(gate.intercept(&headers), Ok(UserId::new(42)));
    }

    #[test]
    fn intercept_without_header_is_missing_credential() {
        let gate = AuthGate::new(tokens("s1"));
        assert_eq!(
            gate.intercept(&HeaderMap::new()),
            Err(AuthRejection::MissingCredential)
        );
    }

    #[test]
    fn intercept_with_wrong_scheme_is_missing_credential() {
        let gate = AuthGate::new(tokens("s1"));
        for value in ["Basic xyz", "bearer abc", "Bearer", "Token abc"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(
                gate.intercept(&headers),
                Err(AuthRejection::MissingCredential),
                "header {value:?}"
            );
        }
    }

    #[test]
    fn intercept_with_non_utf8_header_is_missing_credential() {
        let gate = AuthGate::new(tokens("s1"));
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(
            gate.intercept(&headers),
            Err(AuthRejection::MissingCredential)
        );
    }

    #[test]
    fn intercept_preserves_specific_token_failure() {
        let svc = tokens("s1");
        let past = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
        let expired = svc.issue_at(UserId::new(1), past).unwrap().token;
        let gate = AuthGate::new(svc);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {expired}")).unwrap(),
        );
        let rejection = gate.intercept(&headers).unwrap_err();
        assert_eq!(rejection, AuthRejection::InvalidCredential(TokenError::Expired));
        assert_eq!(rejection.reason(), "expired");
    }

    #[test]
    fn intercept_accepts_token_from_retired_key() {
        let svc = tokens("s1");
        let token = svc.issue(UserId::new(9)).unwrap().token;
        svc.rotate(SigningSecret::new("s2").unwrap());
        let gate = AuthGate::new(svc);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(gate.intercept(&headers), Ok(UserId::new(9)));
    }

    // ── middleware ───────────────────────────────────────────────

    #[tokio::test]
    async fn valid_bearer_token_reaches_handler() {
        let svc = tokens("s1");
        let token = svc.issue(UserId::new(42)).unwrap().token;
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(svc, Arc::clone(&hits));

        let response = app
            .oneshot(request(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"42");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected_before_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(tokens("s1"), Arc::clone(&hits));

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(error_code(response).await, "MISSING_CREDENTIALS");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn basic_scheme_rejected_as_missing_credential() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(tokens("s1"), Arc::clone(&hits));

        let response = app.oneshot(request(Some("Basic xyz"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "MISSING_CREDENTIALS");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn garbage_bearer_token_rejected_as_invalid_credential() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(tokens("s1"), Arc::clone(&hits));

        let response = app
            .oneshot(request(Some("Bearer not-a-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "INVALID_CREDENTIALS");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn token_from_other_issuer_key_rejected() {
        let foreign = tokens("someone-else").issue(UserId::new(1)).unwrap().token;
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(tokens("s1"), Arc::clone(&hits));

        let response = app
            .oneshot(request(Some(&format!("Bearer {foreign}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "INVALID_CREDENTIALS");
        assert!(err["error"]["message"]
            .as_str()
            .unwrap()
            .contains("signature"));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_token_rejected_before_handler() {
        let svc = tokens("s1");
        let issued_at = Utc::now() - Duration::hours(2);
        let expired = svc.issue_at(UserId::new(3), issued_at).unwrap().token;
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(svc, Arc::clone(&hits));

        let response = app
            .oneshot(request(Some(&format!("Bearer {expired}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extractor_without_gate_is_unauthorized() {
        let app: Router = Router::new().route(
            "/open",
            get(|user: AuthenticatedUser| async move { user.user_id().to_string() }),
        );
        let response = app
            .oneshot(Request::builder().uri("/open").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "UNAUTHORIZED");
    }
}
