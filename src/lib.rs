//! Memorial-sharing backend: access-control layer.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                MEMORIAL API                  │
//!                      │                                              │
//!   Client Request     │  ┌──────────┐   ┌───────────┐   ┌─────────┐ │
//!   ──────────────────▶│  │ rate     │──▶│ auth      │──▶│ api     │ │
//!                      │  │ limiter  │   │ guards    │   │ handlers│ │
//!                      │  └──────────┘   └───────────┘   └────┬────┘ │
//!                      │                                      │      │
//!                      │                              ┌───────▼────┐ │
//!                      │                              │ user store │ │
//!                      │                              └────────────┘ │
//!                      │  ┌────────────────────────────────────────┐ │
//!                      │  │         Cross-Cutting Concerns         │ │
//!                      │  │  config · observability · lifecycle    │ │
//!                      │  │  tokens · passwords · sanitization     │ │
//!                      │  └────────────────────────────────────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! The guards are stateless apart from the rate limiter's bucket map;
//! identity travels inside HS256-signed tokens and is reconstructed per
//! request. Domain persistence (memorials, memories, images) lives in a
//! separate service; this crate consumes only a user-identity lookup.

// Core subsystems
pub mod api;
pub mod config;
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
