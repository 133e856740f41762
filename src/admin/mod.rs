//! Control API for per-client limiter settings.
//!
//! Mounted under `/clients`. Mutations update the runtime admission
//! table and the settings store before reporting success; reads reflect
//! the runtime view.

pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::http::server::AppState;

use self::handlers::*;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/{client_id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        .fallback(not_found)
}
