//! HTTP entry point subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → server.rs (axum router)
//!         → /clients...  → admin control API
//!         → everything else → proxy handler:
//!             derive client ID → admit → pick backend
//!             → rewrite URI → forward → relay response
//!     → response.rs (shared JSON error shape)
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer, X_API_KEY};
