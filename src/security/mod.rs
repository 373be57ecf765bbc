//! Access-control subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (check per-IP, per-scope quotas)
//!     → guard.rs (extract + verify bearer token, attach identity)
//!     → handler (may call password.rs on credential changes,
//!                sanitize.rs on free-text fields)
//!
//! Login:
//!     store lookup → password.rs verify → token.rs issue
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any check failure
//! - Stateless identity: everything a guard needs travels in the token
//! - The rate limiter owns the only shared mutable state in this layer

pub mod guard;
pub mod password;
pub mod rate_limit;
pub mod sanitize;
pub mod token;

pub use guard::{AuthState, CurrentUser};
pub use rate_limit::{FixedWindowStore, RateLimitState, RateLimitStore};
pub use token::{Claims, TokenKind, TokenService, Verification};
