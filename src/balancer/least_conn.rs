//! Least-connections balancing strategy.

use std::sync::Arc;

use super::backend::Backend;
use super::LoadBalancer;

/// Selects the healthy backend with the fewest in-flight requests.
///
/// Stateless: the active counter already lives on each backend. The scan
/// is stable (ties go to the earliest backend in pool order), which
/// keeps picks deterministic when several backends sit at zero.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        let mut best: Option<&Arc<Backend>> = None;
        let mut best_count = usize::MAX;

        for backend in backends {
            if !backend.is_healthy() {
                continue;
            }
            let count = backend.active_count();
            if count < best_count {
                best_count = count;
                best = Some(backend);
            }
        }

        best.cloned()
    }
}
