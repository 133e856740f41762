//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGINT/SIGTERM (signals.rs)
//!     → Shutdown::begin_drain (shutdown.rs)
//!     → HTTP server stops accepting and drains
//!     → health monitor and limiter ticks exit at their next tick
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::wait_for_signal;
