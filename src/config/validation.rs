//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTL caps, positive quotas and windows)
//! - Detect duplicate rate-limit scopes
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::AppConfig;

/// Access tokens may live at most one hour.
const MAX_ACCESS_TTL_SECS: u64 = 3_600;

/// Refresh tokens may live at most thirty days.
const MAX_REFRESH_TTL_SECS: u64 = 30 * 86_400;

/// One semantic problem found in a config.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyBindAddress,
    EmptySecret,
    ZeroTtl(&'static str),
    AccessTtlTooLong(u64),
    RefreshTtlTooLong(u64),
    EmptyScopeName,
    DuplicateScope(String),
    ScopeWithoutWindows(String),
    ZeroWindow(String),
    ZeroQuota(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyBindAddress => write!(f, "server.bind_address is empty"),
            ValidationError::EmptySecret => write!(f, "auth.jwt_secret is empty"),
            ValidationError::ZeroTtl(which) => write!(f, "auth.{} must be positive", which),
            ValidationError::AccessTtlTooLong(got) => write!(
                f,
                "auth.access_ttl_secs is {} but access tokens are capped at {} seconds",
                got, MAX_ACCESS_TTL_SECS
            ),
            ValidationError::RefreshTtlTooLong(got) => write!(
                f,
                "auth.refresh_ttl_secs is {} but refresh tokens are capped at {} seconds",
                got, MAX_REFRESH_TTL_SECS
            ),
            ValidationError::EmptyScopeName => write!(f, "rate_limit scope with empty name"),
            ValidationError::DuplicateScope(name) => {
                write!(f, "rate_limit scope '{}' is defined twice", name)
            }
            ValidationError::ScopeWithoutWindows(name) => {
                write!(f, "rate_limit scope '{}' has no windows", name)
            }
            ValidationError::ZeroWindow(name) => {
                write!(f, "rate_limit scope '{}' has a zero-length window", name)
            }
            ValidationError::ZeroQuota(name) => {
                write!(f, "rate_limit scope '{}' has a zero-request quota", name)
            }
        }
    }
}

/// Check everything serde cannot, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.auth.jwt_secret.trim().is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.auth.access_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl("access_ttl_secs"));
    } else if config.auth.access_ttl_secs > MAX_ACCESS_TTL_SECS {
        errors.push(ValidationError::AccessTtlTooLong(config.auth.access_ttl_secs));
    }
    if config.auth.refresh_ttl_secs == 0 {
        errors.push(ValidationError::ZeroTtl("refresh_ttl_secs"));
    } else if config.auth.refresh_ttl_secs > MAX_REFRESH_TTL_SECS {
        errors.push(ValidationError::RefreshTtlTooLong(
            config.auth.refresh_ttl_secs,
        ));
    }

    let mut seen = HashSet::new();
    for scope in &config.rate_limit.scopes {
        if scope.name.trim().is_empty() {
            errors.push(ValidationError::EmptyScopeName);
            continue;
        }
        if !seen.insert(scope.name.clone()) {
            errors.push(ValidationError::DuplicateScope(scope.name.clone()));
        }
        if scope.windows.is_empty() {
            errors.push(ValidationError::ScopeWithoutWindows(scope.name.clone()));
        }
        for window in &scope.windows {
            if window.window_secs == 0 {
                errors.push(ValidationError::ZeroWindow(scope.name.clone()));
            }
            if window.max_requests == 0 {
                errors.push(ValidationError::ZeroQuota(scope.name.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
