use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::app::AppState;

#[derive(Serialize)]
struct HealthBody {
    ok: bool,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ok = state.health.read().await.ok();
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthBody { ok }))
}

#[derive(Serialize)]
struct CreateRoomBody {
    #[serde(rename = "roomCode")]
    room_code: String,
}

/// Equivalent to the in-band `createRoom` event, for a client that wants a
/// room code before opening its WebSocket.
pub async fn create_room_handler(State(state): State<AppState>) -> impl IntoResponse {
    let room_code = state.registry.create_room();
    (StatusCode::CREATED, Json(CreateRoomBody { room_code }))
}
