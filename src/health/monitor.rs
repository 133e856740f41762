//! Active health checking.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::balancer::backend::Backend;
use crate::balancer::BackendPool;
use crate::config::HealthCheckConfig;
use crate::lifecycle::ShutdownSignal;

/// Per-probe timeout, independent of the poll interval.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodically probes every backend and maintains its health flag.
pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    config: HealthCheckConfig,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(pool: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            pool,
            config,
            client,
        }
    }

    /// Probe loop. The interval's first tick completes immediately, so an
    /// initial probe round runs at startup before the first full period
    /// elapses. Exits at the tick after draining begins.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        let mut ticker = tokio::time::interval(self.config.interval);

        tracing::info!(
            interval = ?self.config.interval,
            endpoint = %self.config.endpoint,
            backends = self.pool.backends().len(),
            "health monitor started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.probe_all(),
                _ = shutdown.wait() => {
                    tracing::info!("health monitor stopped");
                    break;
                }
            }
        }
    }

    /// Launch one probe task per backend.
    fn probe_all(&self) {
        for backend in self.pool.backends() {
            let backend = Arc::clone(backend);
            let client = self.client.clone();
            let endpoint = self.config.endpoint.clone();
            tokio::spawn(async move {
                probe_backend(&client, &backend, &endpoint).await;
            });
        }
    }
}

/// Probe one backend and record the outcome on its health flag.
///
/// Any transport error or non-200 status marks the backend unhealthy; a
/// 200 marks it healthy and the body is discarded. The transition is
/// logged only when the flag actually changes.
async fn probe_backend(client: &Client<HttpConnector, Body>, backend: &Backend, endpoint: &str) {
    let url = format!("{}://{}{}", backend.scheme(), backend.authority(), endpoint);

    let request = match Request::builder()
        .method(Method::GET)
        .uri(&url)
        .body(Body::empty())
    {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(backend = %backend, error = %err, "failed to build health probe");
            return;
        }
    };

    let outcome = tokio::time::timeout(PROBE_TIMEOUT, client.request(request)).await;

    match outcome {
        Ok(Ok(response)) if response.status() == StatusCode::OK => {
            let was_healthy = backend.set_healthy(true);
            if !was_healthy {
                tracing::info!(backend = %backend, "backend is available again");
            }
        }
        Ok(Ok(response)) => {
            let was_healthy = backend.set_healthy(false);
            if was_healthy {
                tracing::warn!(
                    backend = %backend,
                    status = %response.status(),
                    "backend marked unavailable"
                );
            }
        }
        Ok(Err(err)) => {
            let was_healthy = backend.set_healthy(false);
            if was_healthy {
                tracing::warn!(backend = %backend, error = %err, "backend marked unavailable");
            }
        }
        Err(_) => {
            let was_healthy = backend.set_healthy(false);
            if was_healthy {
                tracing::warn!(backend = %backend, "backend marked unavailable: probe timed out");
            }
        }
    }
}
