//! Backend pool management.
//!
//! # Responsibilities
//! - Parse configured origin URLs into backends, preserving order
//! - Hold the selected balancing strategy
//! - Select the next backend for a request

use std::sync::Arc;

use super::backend::Backend;
use super::least_conn::LeastConnections;
use super::round_robin::RoundRobin;
use super::{BalancerError, LoadBalancer};

/// The ordered, immutable set of origins plus the balancing strategy.
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
    strategy: Box<dyn LoadBalancer>,
}

impl std::fmt::Debug for BackendPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendPool")
            .field("backends", &self.backends)
            .finish_non_exhaustive()
    }
}

impl BackendPool {
    /// Build a pool from origin URLs and an algorithm name.
    ///
    /// Fails on a malformed URL or an unknown algorithm; both are fatal
    /// startup errors.
    pub fn new(origins: &[String], algorithm: &str) -> Result<Self, BalancerError> {
        let backends = origins
            .iter()
            .map(|origin| Backend::from_origin(origin).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        let strategy: Box<dyn LoadBalancer> = match algorithm {
            "round-robin" => Box::new(RoundRobin::new()),
            "least-connections" => Box::new(LeastConnections::new()),
            other => return Err(BalancerError::UnknownAlgorithm(other.to_string())),
        };

        Ok(Self { backends, strategy })
    }

    /// Select the next backend, or `None` when no healthy backend exists.
    pub fn pick(&self) -> Option<Arc<Backend>> {
        self.strategy.next_server(&self.backends)
    }

    /// The ordered backends (for health checking and introspection).
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }
}
