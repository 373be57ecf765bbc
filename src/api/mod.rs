//! Resource handlers.
//!
//! The CRUD surface proper (memorials, memories, images) lives in the
//! persistence-backed service; this crate exposes only the identity
//! endpoints the access-control layer owns.

pub mod admin;
pub mod auth;
