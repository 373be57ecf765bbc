//! Authentication and authorization middleware.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit_middleware (over quota? reject 429)
//!     → require_auth (Bearer token? verify, attach CurrentUser)
//!     → require_admin (admin routes only; CurrentUser.is_admin?)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Explicit ordered stages, each either continuing with context or
//!   short-circuiting with a response
//! - A token anywhere but `Authorization: Bearer` is treated as absent
//! - Refresh tokens never satisfy an access-only route
//! - Admin failure is reported only once identity is established: a
//!   missing or bad token is 401 even on admin-only routes
//! - Fail closed: if `require_admin` runs without an attached identity,
//!   the request is rejected as unauthenticated, never allowed through

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::http::error::ApiError;
use crate::security::token::{TokenKind, TokenService, Verification};

/// Identity derived from a verified token. Lives only in the request's
/// extension map; no handler may fabricate one.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

/// State the auth stage needs: just the token service.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// Base token check: extract, verify, attach identity.
pub async fn require_auth(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => return ApiError::MissingCredential.into_response(),
    };

    match state.tokens.verify(token) {
        Verification::Valid(claims) if claims.kind == TokenKind::Access => {
            request.extensions_mut().insert(CurrentUser {
                id: claims.sub,
                username: claims.username,
                is_admin: claims.is_admin,
            });
            next.run(request).await
        }
        // Refresh-kind, expired and tampered all collapse to one
        // rejection on the wire.
        outcome => {
            tracing::warn!(outcome = ?discriminant_name(&outcome), "rejected bearer token");
            ApiError::InvalidToken.into_response()
        }
    }
}

/// Admin stage, layered inside `require_auth`: evaluates the admin
/// claim of the already-attached identity.
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin => next.run(request).await,
        Some(user) => {
            tracing::warn!(user = %user.username, "admin route refused");
            ApiError::Forbidden.into_response()
        }
        None => ApiError::MissingCredential.into_response(),
    }
}

fn discriminant_name(outcome: &Verification) -> &'static str {
    match outcome {
        Verification::Valid(_) => "wrong_kind",
        Verification::Expired => "expired",
        Verification::Invalid => "invalid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::middleware;
    use axum::routing::get;
    use axum::{Extension, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            "guard-test-secret",
            Duration::from_secs(3600),
            Duration::from_secs(86400),
        ))
    }

    async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
        user.username
    }

    fn protected_app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route(
                "/admin",
                get(|| async { "ok" }).layer(middleware::from_fn(require_admin)),
            )
            .layer(middleware::from_fn_with_state(
                AuthState { tokens },
                require_auth,
            ))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 16 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get_request(path: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_authorization_required() {
        let app = protected_app(token_service());
        let response = app.oneshot(get_request("/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "authorization_required");
    }

    #[tokio::test]
    async fn non_bearer_placement_is_treated_as_absent() {
        let tokens = token_service();
        let jwt = tokens.issue(1, "alice", false, TokenKind::Access).unwrap();
        let app = protected_app(tokens);
        let response = app
            .oneshot(get_request("/me", Some(&format!("Token {jwt}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "authorization_required");
    }

    #[tokio::test]
    async fn valid_access_token_reaches_the_handler_with_identity() {
        let tokens = token_service();
        let jwt = tokens.issue(1, "alice", false, TokenKind::Access).unwrap();
        let app = protected_app(tokens);
        let response = app
            .oneshot(get_request("/me", Some(&format!("Bearer {jwt}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"alice");
    }

    #[tokio::test]
    async fn refresh_token_is_rejected_at_access_routes() {
        let tokens = token_service();
        let jwt = tokens.issue(1, "alice", false, TokenKind::Refresh).unwrap();
        let app = protected_app(tokens);
        let response = app
            .oneshot(get_request("/me", Some(&format!("Bearer {jwt}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_token");
    }

    #[tokio::test]
    async fn tampered_token_is_invalid_token() {
        let tokens = token_service();
        let jwt = tokens.issue(1, "alice", false, TokenKind::Access).unwrap();
        let tampered = format!("{}x", jwt);
        let app = protected_app(tokens);
        let response = app
            .oneshot(get_request("/me", Some(&format!("Bearer {tampered}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid_token");
    }

    #[tokio::test]
    async fn admin_route_is_403_for_plain_users_401_without_token() {
        let tokens = token_service();
        let user_jwt = tokens.issue(1, "alice", false, TokenKind::Access).unwrap();
        let admin_jwt = tokens.issue(2, "root", true, TokenKind::Access).unwrap();

        let response = protected_app(tokens.clone())
            .oneshot(get_request("/admin", Some(&format!("Bearer {user_jwt}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "forbidden");

        let response = protected_app(tokens.clone())
            .oneshot(get_request("/admin", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = protected_app(tokens)
            .oneshot(get_request("/admin", Some(&format!("Bearer {admin_jwt}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_stage_without_identity_fails_closed() {
        // require_admin layered WITHOUT require_auth outside it:
        // no identity can exist, so every request must bounce.
        let app = Router::new().route(
            "/admin",
            get(|| async { "ok" }).layer(middleware::from_fn(require_admin)),
        );
        let response = app.oneshot(get_request("/admin", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
