//! Fixed-window request rate limiting.
//!
//! # Responsibilities
//! - Count requests per (client key, scope) within fixed time windows
//! - Reject over-quota requests before any authentication work happens
//! - Keep counters in process memory; losing them on restart is fine
//!
//! # Design Decisions
//! - Store is behind a trait so the in-process map and a future shared
//!   counter backend are interchangeable at the route layer
//! - A scope may carry several windows (e.g. 50/hour AND 200/day); a
//!   request must be under quota in ALL of them
//! - Rejected attempts still count: hammering a closed door does not
//!   reopen it sooner
//! - One mutex over the bucket map serializes check-and-increment, so
//!   concurrent requests cannot slip past the quota via lost updates

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::http::error::ApiError;

/// Scope whose rejections read as login throttling rather than a
/// generic quota error.
pub const AUTH_SCOPE: &str = "auth";

/// Scope applied when a route names no scope of its own.
pub const DEFAULT_SCOPE: &str = "default";

/// How many checks elapse between opportunistic evictions of dead buckets.
const PURGE_INTERVAL: u64 = 1024;

/// Quota over one fixed window: at most `max_requests` per
/// `window_secs`-second interval.
#[derive(Debug, Clone, Copy)]
pub struct WindowRule {
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Check-and-increment interface for rate-limit storage.
///
/// Implementations must keep the operation atomic per (key, scope).
pub trait RateLimitStore: Send + Sync {
    /// Record one attempt and report whether it is within quota.
    fn check(&self, key: &str, scope: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct WindowBucket {
    window: u64,
    count: u32,
}

/// In-process fixed-window store: one counter per (key, scope, window).
///
/// A window is identified by `floor(now / window_secs)`; a bucket from a
/// previous window resets before the increment. Entries whose windows
/// have all elapsed are purged opportunistically.
pub struct FixedWindowStore {
    scopes: HashMap<String, Vec<WindowRule>>,
    buckets: Mutex<HashMap<(String, String), Vec<WindowBucket>>>,
    checks: AtomicU64,
}

impl FixedWindowStore {
    pub fn new(scopes: HashMap<String, Vec<WindowRule>>) -> Self {
        Self {
            scopes,
            buckets: Mutex::new(HashMap::new()),
            checks: AtomicU64::new(0),
        }
    }

    fn rules_for(&self, scope: &str) -> &[WindowRule] {
        self.scopes
            .get(scope)
            .or_else(|| self.scopes.get(DEFAULT_SCOPE))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Check-and-increment against an explicit clock. The trait method
    /// feeds in real time; tests feed in whatever instant they need.
    pub fn check_at(&self, key: &str, scope: &str, now_secs: u64) -> bool {
        let rules = self.rules_for(scope);
        if rules.is_empty() {
            return true;
        }

        if self.checks.fetch_add(1, Ordering::Relaxed) % PURGE_INTERVAL == PURGE_INTERVAL - 1 {
            self.purge_expired(now_secs);
        }

        let mut buckets = self.buckets.lock().expect("rate limit mutex poisoned");
        let entry = buckets
            .entry((key.to_string(), scope.to_string()))
            .or_insert_with(|| vec![WindowBucket { window: 0, count: 0 }; rules.len()]);

        let mut allowed = true;
        for (bucket, rule) in entry.iter_mut().zip(rules) {
            let window = now_secs / rule.window_secs;
            if bucket.window != window {
                bucket.window = window;
                bucket.count = 0;
            }
            bucket.count = bucket.count.saturating_add(1);
            if bucket.count > rule.max_requests {
                allowed = false;
            }
        }
        allowed
    }

    /// Drop entries whose every window has elapsed.
    pub fn purge_expired(&self, now_secs: u64) {
        let mut buckets = self.buckets.lock().expect("rate limit mutex poisoned");
        buckets.retain(|(_, scope), entry| {
            let rules = self
                .scopes
                .get(scope)
                .or_else(|| self.scopes.get(DEFAULT_SCOPE))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            entry
                .iter()
                .zip(rules)
                .any(|(bucket, rule)| bucket.window == now_secs / rule.window_secs)
        });
    }

    #[cfg(test)]
    fn bucket_count(&self) -> usize {
        self.buckets.lock().unwrap().len()
    }
}

impl RateLimitStore for FixedWindowStore {
    fn check(&self, key: &str, scope: &str) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.check_at(key, scope, now)
    }
}

/// Per-route state for the rate-limit middleware: which store, which
/// scope, and thereby how a rejection reads on the wire.
#[derive(Clone)]
pub struct RateLimitState {
    pub store: Arc<dyn RateLimitStore>,
    pub scope: String,
}

impl RateLimitState {
    pub fn new(store: Arc<dyn RateLimitStore>, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    fn rejection(&self) -> ApiError {
        if self.scope == AUTH_SCOPE {
            ApiError::TooManyAttempts
        } else {
            ApiError::RateLimited
        }
    }
}

/// Middleware stage run before authentication: reject early when the
/// client is over quota, keyed by remote address.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = addr.ip().to_string();
    if state.store.check(&key, &state.scope) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, scope = %state.scope, "rate limit exceeded");
        state.rejection().into_response()
    }
}
