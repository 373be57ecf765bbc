//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files,
//! with defaults matching a working development setup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::security::rate_limit::WindowRule;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings (bind address, timeouts).
    pub server: ServerConfig,

    /// Token signing and lifetime settings.
    pub auth: AuthConfig,

    /// Per-scope request quotas.
    pub rate_limit: RateLimitConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Token signing configuration.
///
/// The secret is process-wide; rotating it invalidates every
/// outstanding token. The `JWT_SECRET_KEY` environment variable
/// overrides whatever the file says (see the loader).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Symmetric signing secret. The default is for development only.
    pub jwt_secret: String,

    /// Access token lifetime in seconds (capped at one hour).
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds (capped at thirty days).
    pub refresh_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-secret-key-change-in-production".to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 30 * 86_400,
        }
    }
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

/// Rate limiting configuration: a table of named scopes, each with one
/// or more fixed windows that must ALL be satisfied.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Disable to run every route unthrottled (tests, local dev).
    pub enabled: bool,

    pub scopes: Vec<ScopeConfig>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scopes: vec![
                ScopeConfig {
                    name: "default".to_string(),
                    windows: vec![
                        WindowConfig {
                            max_requests: 200,
                            window_secs: 86_400,
                        },
                        WindowConfig {
                            max_requests: 50,
                            window_secs: 3_600,
                        },
                    ],
                },
                ScopeConfig {
                    name: "auth".to_string(),
                    windows: vec![WindowConfig {
                        max_requests: 5,
                        window_secs: 60,
                    }],
                },
                ScopeConfig {
                    name: "api".to_string(),
                    windows: vec![WindowConfig {
                        max_requests: 100,
                        window_secs: 60,
                    }],
                },
            ],
        }
    }
}

impl RateLimitConfig {
    /// Flatten into the store's scope table.
    pub fn scope_table(&self) -> HashMap<String, Vec<WindowRule>> {
        self.scopes
            .iter()
            .map(|scope| {
                (
                    scope.name.clone(),
                    scope
                        .windows
                        .iter()
                        .map(|w| WindowRule {
                            max_requests: w.max_requests,
                            window_secs: w.window_secs,
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

/// One named scope and its windows.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScopeConfig {
    pub name: String,
    pub windows: Vec<WindowConfig>,
}

/// One fixed window: at most `max_requests` per `window_secs` seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}
