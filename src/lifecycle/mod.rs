//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Build server → Bind → Serve
//!
//! Shutdown:
//!     SIGINT/SIGTERM or test trigger → broadcast → serve loop drains → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
