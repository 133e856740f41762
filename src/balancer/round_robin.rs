//! Round-robin balancing strategy.
//!
//! # Algorithm
//! Rotate through the pool in configuration order, skipping unhealthy
//! backends. The cursor rests on the index of the last backend returned,
//! so consecutive picks continue where the previous one left off.

use std::sync::{Arc, Mutex};

use super::backend::Backend;
use super::LoadBalancer;

/// Rotating-cursor selector.
pub struct RoundRobin {
    /// Index of the last backend returned. Starts before index 0.
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            // wrapping_add(1) lands the first pick on index 0
            cursor: Mutex::new(usize::MAX),
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        let mut cursor = self.cursor.lock().expect("round robin cursor poisoned");

        for _ in 0..backends.len() {
            *cursor = cursor.wrapping_add(1) % backends.len();
            let backend = &backends[*cursor];
            if backend.is_healthy() {
                return Some(Arc::clone(backend));
            }
        }

        None
    }
}
