//! HTTP server setup and the data-plane proxy handler.
//!
//! # Responsibilities
//! - Build the axum router: `/clients...` goes to the control API, every
//!   other path enters the data plane
//! - Derive the client identity for admission
//! - Forward admitted requests to the selected backend
//! - Map upstream failures to the proxy's own status codes

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::uri::PathAndQuery,
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin;
use crate::balancer::{BackendPool, ConnectionGuard};
use crate::http::response::error_response;
use crate::lifecycle::ShutdownSignal;
use crate::ratelimit::RateLimiter;

/// Header consulted for the client identity. The value is used verbatim;
/// requests without it fall back to `ip:<peer address>`.
pub const X_API_KEY: &str = "x-api-key";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub limiter: Arc<RateLimiter>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server multiplexing the control and data planes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(pool: Arc<BackendPool>, limiter: Arc<RateLimiter>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool,
            limiter,
            client,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Admin routes first; everything else falls through to the proxy.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .nest("/clients", admin::router())
            .fallback(proxy_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Serve until draining begins, then stop accepting and drain
    /// in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Data-plane handler: admit, pick, forward.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let client_id = client_id_from(&request, remote_addr);

    if !state.limiter.admit(&client_id).await {
        tracing::warn!(client_id = %client_id, "rate limit exceeded");
        return error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded");
    }

    let Some(backend) = state.pool.pick() else {
        tracing::warn!(path = %request.uri().path(), "no healthy backend available");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "All backends are unavailable",
        )
            .into_response();
    };

    // Held for the duration of the forward; drop decrements the count on
    // every exit path below.
    let _connection = ConnectionGuard::acquire(Arc::clone(&backend));

    let mut parts = request.uri().clone().into_parts();
    parts.scheme = Some(backend.scheme().clone());
    parts.authority = Some(backend.authority().clone());
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }

    match Uri::from_parts(parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(err) => {
            tracing::error!(backend = %backend, error = %err, "failed to rewrite request uri");
            return (StatusCode::INTERNAL_SERVER_ERROR, "URI rewrite failed").into_response();
        }
    }

    tracing::debug!(
        client_id = %client_id,
        backend = %backend,
        path = %request.uri().path(),
        "forwarding request"
    );

    match state.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(err) => {
            tracing::error!(backend = %backend, error = %err, "upstream request failed");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Derive the rate-limiter principal for a request.
fn client_id_from(request: &Request<Body>, remote_addr: SocketAddr) -> String {
    match request
        .headers()
        .get(X_API_KEY)
        .and_then(|value| value.to_str().ok())
    {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => format!("ip:{remote_addr}"),
    }
}
