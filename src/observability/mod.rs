//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; rejected requests log the client
//!   and the reason at warn level, never token material
//! - Request IDs flow through the fmt layer via the request-id
//!   middleware
//! - No metrics exposition here; the host platform scrapes logs

pub mod logging;
