//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware in guard order: request ID and tracing outside,
//!   then per-route rate limiting, then authentication stages
//! - Bind the server to a listener and serve until shutdown
//!
//! # Design Decisions
//! - Quota checks run before authentication so brute-force login cost
//!   is bounded at the door
//! - Each route group stacks exactly the guard stages it needs; nothing
//!   is implicit

use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::{admin, auth};
use crate::config::AppConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::security::guard::{require_admin, require_auth, AuthState};
use crate::security::rate_limit::{
    rate_limit_middleware, FixedWindowStore, RateLimitState, RateLimitStore, AUTH_SCOPE,
};
use crate::security::token::TokenService;
use crate::store::{MemoryUserStore, UserStore};

/// Scope applied to authenticated API traffic.
const API_SCOPE: &str = "api";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
}

/// HTTP server for the memorial API's access-control surface.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server with a fresh in-memory user store.
    pub fn new(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryUserStore::new()))
    }

    /// Create a server over an existing user store (tests pre-seed one).
    pub fn with_store(config: AppConfig, users: Arc<dyn UserStore>) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.access_ttl(),
            config.auth.refresh_ttl(),
        ));
        let state = AppState { users, tokens };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the router with all guard stages in order.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let limiter: Arc<dyn RateLimitStore> = Arc::new(FixedWindowStore::new(
            config.rate_limit.scope_table(),
        ));
        let auth_state = AuthState {
            tokens: state.tokens.clone(),
        };

        // Credential endpoints: throttled hard, no token required.
        let mut credential_routes = Router::new()
            .route("/users", post(auth::register))
            .route("/users/login", post(auth::login))
            .route("/users/refresh", post(auth::refresh));
        if config.rate_limit.enabled {
            credential_routes = credential_routes.layer(middleware::from_fn_with_state(
                RateLimitState::new(limiter.clone(), AUTH_SCOPE),
                rate_limit_middleware,
            ));
        }

        // Token-guarded endpoints. Layer order is inside-out: the
        // rate limiter is added last so it runs first.
        let mut user_routes = Router::new().route("/users/me", get(auth::me)).layer(
            middleware::from_fn_with_state(auth_state.clone(), require_auth),
        );
        let mut admin_routes = Router::new()
            .route("/admin/users", get(admin::list_users))
            .layer(middleware::from_fn(require_admin))
            .layer(middleware::from_fn_with_state(auth_state, require_auth));
        if config.rate_limit.enabled {
            user_routes = user_routes.layer(middleware::from_fn_with_state(
                RateLimitState::new(limiter.clone(), API_SCOPE),
                rate_limit_middleware,
            ));
            admin_routes = admin_routes.layer(middleware::from_fn_with_state(
                RateLimitState::new(limiter.clone(), API_SCOPE),
                rate_limit_middleware,
            ));
        }

        Router::new()
            .route("/health", get(health))
            .nest(
                "/api/v1",
                credential_routes.merge(user_routes).merge(admin_routes),
            )
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Unauthenticated, unthrottled liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "message": "Memorial API is running",
    }))
}
