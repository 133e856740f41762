//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use loadgate::balancer::BackendPool;
use loadgate::config::HealthCheckConfig;
use loadgate::health::HealthMonitor;
use loadgate::lifecycle::Shutdown;
use loadgate::ratelimit::RateLimiter;
use loadgate::storage::MemoryStorage;
use loadgate::HttpServer;

/// Start a mock origin answering `200` with a fixed body on every path,
/// including the health endpoint. Returns its bound address.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_path| async move { (200, body.to_string()) }).await
}

/// Start a mock origin whose status and body are computed per request
/// from the request path.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(socket);

                        let mut request_line = String::new();
                        if reader.read_line(&mut request_line).await.is_err() {
                            return;
                        }
                        let path = request_line
                            .split_whitespace()
                            .nth(1)
                            .unwrap_or("/")
                            .to_string();

                        // Drain headers up to the blank line.
                        loop {
                            let mut line = String::new();
                            match reader.read_line(&mut line).await {
                                Ok(0) => break,
                                Ok(_) if line == "\r\n" || line == "\n" => break,
                                Ok(_) => continue,
                                Err(_) => return,
                            }
                        }

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let mut socket = reader.into_inner();
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A proxy instance bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.begin_drain();
    }
}

/// Spawn a full proxy (in-memory settings store) over the given origins.
/// Passing `probe_interval` also starts the health monitor.
pub async fn spawn_proxy(
    origins: &[SocketAddr],
    algorithm: &str,
    default_capacity: u32,
    default_refill_rate: f64,
    probe_interval: Option<Duration>,
) -> TestProxy {
    let origin_urls: Vec<String> = origins.iter().map(|addr| format!("http://{addr}")).collect();
    let pool = Arc::new(BackendPool::new(&origin_urls, algorithm).unwrap());
    let limiter = RateLimiter::new(
        default_capacity,
        default_refill_rate,
        Arc::new(MemoryStorage::new()),
    );

    let shutdown = Shutdown::new();

    if let Some(interval) = probe_interval {
        let monitor = HealthMonitor::new(
            Arc::clone(&pool),
            HealthCheckConfig {
                endpoint: "/health".to_string(),
                interval,
            },
        );
        tokio::spawn(monitor.run(shutdown.signal()));
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(pool, limiter);
    let server_shutdown = shutdown.signal();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy { addr, shutdown }
}

/// A reqwest client that ignores environment proxies.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
