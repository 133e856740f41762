//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single origin server
//! - Track in-flight forwarded requests (for least-connections)
//! - Carry the health flag maintained by the health monitor

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::uri::{Authority, Scheme};
use axum::http::Uri;

use super::BalancerError;

/// A single origin server.
#[derive(Debug)]
pub struct Backend {
    /// URL scheme of the origin (`http` in practice).
    scheme: Scheme,
    /// Host and port of the origin.
    authority: Authority,
    /// Number of requests currently being forwarded to this origin.
    active_connections: AtomicUsize,
    /// Whether the origin is considered able to serve traffic.
    healthy: AtomicBool,
}

impl Backend {
    /// Parse an origin URL (`http://host:port`) into a backend.
    ///
    /// Backends start healthy; the health monitor demotes them.
    pub fn from_origin(origin: &str) -> Result<Self, BalancerError> {
        let uri: Uri = origin
            .parse()
            .map_err(|err| BalancerError::InvalidBackendUrl {
                url: origin.to_string(),
                reason: format!("{err}"),
            })?;

        let scheme = uri.scheme().cloned();
        let authority = uri.authority().cloned();
        match (scheme, authority) {
            (Some(scheme), Some(authority)) => Ok(Self {
                scheme,
                authority,
                active_connections: AtomicUsize::new(0),
                healthy: AtomicBool::new(true),
            }),
            _ => Err(BalancerError::InvalidBackendUrl {
                url: origin.to_string(),
                reason: "missing scheme or host".to_string(),
            }),
        }
    }

    /// URL scheme of the origin.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Host and port of the origin.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Current number of in-flight requests.
    pub fn active_count(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Whether the origin currently receives traffic.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Set the health flag, returning the previous value.
    ///
    /// The swap lets the caller log transitions exactly once even when
    /// probes race.
    pub fn set_healthy(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::Relaxed)
    }

}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// RAII guard for one in-flight request to a backend.
///
/// Acquiring increments the backend's active count; dropping decrements
/// it, on every exit path including forwarding errors.
#[derive(Debug)]
pub struct ConnectionGuard {
    backend: Arc<Backend>,
}

impl ConnectionGuard {
    pub fn acquire(backend: Arc<Backend>) -> Self {
        backend.active_connections.fetch_add(1, Ordering::Relaxed);
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<Backend> {
        &self.backend
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.backend.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
