//! Control API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::response::error_response;
use crate::http::server::AppState;

/// Request body for creating or updating a client limit.
#[derive(Debug, Deserialize)]
pub struct ClientLimitRequest {
    pub capacity: u32,
    pub refill_rate: f64,
}

/// Query parameters accepted by `POST /clients`.
#[derive(Debug, Deserialize)]
pub struct CreateClientParams {
    pub client_id: Option<String>,
}

/// Client limit record as returned by the API.
#[derive(Debug, Serialize)]
pub struct ClientLimitResponse {
    pub client_id: String,
    pub capacity: u32,
    pub refill_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /clients`: snapshot of every known client.
pub async fn list_clients(State(state): State<AppState>) -> Json<Vec<ClientLimitResponse>> {
    let clients = state
        .limiter
        .list_clients()
        .into_iter()
        .map(|snapshot| ClientLimitResponse {
            client_id: snapshot.client_id,
            capacity: snapshot.capacity,
            refill_rate: snapshot.refill_rate,
            message: None,
        })
        .collect();

    Json(clients)
}

/// `POST /clients?client_id=...`: install limits for a new client.
pub async fn create_client(
    State(state): State<AppState>,
    Query(params): Query<CreateClientParams>,
    body: Result<Json<ClientLimitRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    let Some(client_id) = params.client_id.filter(|id| !id.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "client_id is required");
    };

    state
        .limiter
        .set_limit(&client_id, request.capacity, request.refill_rate)
        .await;

    (
        StatusCode::CREATED,
        Json(ClientLimitResponse {
            client_id,
            capacity: request.capacity,
            refill_rate: request.refill_rate,
            message: Some("Client created successfully".to_string()),
        }),
    )
        .into_response()
}

/// `GET /clients/{client_id}`: read one client's limits.
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Response {
    match state.limiter.get_limit(&client_id) {
        Some(limit) => Json(ClientLimitResponse {
            client_id,
            capacity: limit.capacity,
            refill_rate: limit.refill_rate,
            message: None,
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Client not found"),
    }
}

/// `PUT /clients/{client_id}`: update an existing client's limits.
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    body: Result<Json<ClientLimitRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
    };

    if state.limiter.get_limit(&client_id).is_none() {
        return error_response(StatusCode::NOT_FOUND, "Client not found");
    }

    state
        .limiter
        .set_limit(&client_id, request.capacity, request.refill_rate)
        .await;

    Json(ClientLimitResponse {
        client_id,
        capacity: request.capacity,
        refill_rate: request.refill_rate,
        message: Some("Client updated successfully".to_string()),
    })
    .into_response()
}

/// `DELETE /clients/{client_id}`: drop a client's limits from runtime
/// and store.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Response {
    if state.limiter.get_limit(&client_id).is_none() {
        return error_response(StatusCode::NOT_FOUND, "Client not found");
    }

    match state.limiter.delete_limit(&client_id).await {
        Ok(()) => Json(json!({ "message": "Client deleted successfully" })).into_response(),
        Err(err) => {
            tracing::error!(client_id = %client_id, error = %err, "failed to delete client");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete client")
        }
    }
}

/// Fallback for unmatched paths under `/clients`.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
