//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request admitted by the limiter
//!     → pool.rs (ordered backends, immutable after startup)
//!     → Apply balancing strategy:
//!         - round_robin.rs (rotate through healthy backends)
//!         - least_conn.rs (fewest active connections wins)
//!     → backend.rs (acquire connection guard, forward)
//! ```
//!
//! # Design Decisions
//! - Pool membership is fixed at startup; only per-backend counters and
//!   health flags mutate
//! - Unhealthy backends are excluded from selection
//! - The active-connection count lives on the backend itself, so
//!   least-connections needs no state of its own

pub mod backend;
pub mod least_conn;
pub mod pool;
pub mod round_robin;

use std::sync::Arc;

use thiserror::Error;

use self::backend::Backend;

pub use self::backend::ConnectionGuard;
pub use self::least_conn::LeastConnections;
pub use self::pool::BackendPool;
pub use self::round_robin::RoundRobin;

/// A backend selection strategy.
///
/// Implementations scan the ordered pool slice and return the next
/// backend to receive a request, or `None` when no healthy backend
/// exists.
pub trait LoadBalancer: Send + Sync {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}

/// Error type for pool construction.
#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("unknown balancing algorithm: {0}")]
    UnknownAlgorithm(String),
}
