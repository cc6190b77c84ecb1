use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use subtle::ConstantTimeEq;

use super::AppState;
use crate::edit::EditBatch;

const API_KEY_HEADER: &str = "x-api-key";

/// Liveness probe.
pub async fn ping() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Apply a batch of edits.
pub async fn edit_file(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let cors = state
        .origins
        .allowed_origin(&headers)
        .map(|origin| state.origins.response_headers(origin))
        .unwrap_or_default();

    if !api_key_matches(&headers, &state.api_key) {
        tracing::warn!("Rejected edit request with missing or wrong API key");
        return (StatusCode::UNAUTHORIZED, cors, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    let batch: EditBatch = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(e) => {
            let error = format!("Invalid request body: {}", e);
            return (StatusCode::BAD_REQUEST, cors, Json(json!({ "error": error }))).into_response();
        }
    };
    if batch.changes.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            cors,
            Json(json!({ "error": "No changes provided" })),
        )
            .into_response();
    }

    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || service.apply(batch.changes)).await {
        Ok(response) => (StatusCode::OK, cors, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Edit task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                cors,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Compare the `x-api-key` header against `expected` in constant time.
fn api_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(API_KEY_HEADER)
        .is_some_and(|provided| bool::from(provided.as_bytes().ct_eq(expected.as_bytes())))
}

/// CORS preflight for `/edit-file`.
pub async fn preflight(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.origins.allowed_origin(&headers) {
        Some(origin) => (StatusCode::OK, state.origins.preflight_headers(origin)).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}
