//! Maps external WebSocket messages to room operations and emits outbound
//! frames. Built from `axum::extract::ws`'s own idiomatic API, kept
//! consistent with this crate's extractor/handler style
//! (`pacman-server/src/routes.rs`): a thin `State`-extracting handler
//! function per concern.
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use pacman_common::message::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::AppState;
use crate::room_actor::{self, RoomHandle};

/// Upgrades at `/ws/{room_code}`. The path's room code identifies which
/// room this connection is opened for in logs and spans; the connection
/// still joins via an in-band `joinRoom` message (which carries its own
/// `roomCode`, `username`, and `ghostIdentity`), since those fields have no
/// home in a GET path.
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(room_code): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state, room_code))
}

async fn handle_connection(socket: WebSocket, state: AppState, room_code: String) {
    let connection_id = format!("{:016x}", rand::random::<u64>());
    let span = tracing::info_span!("connection", connection_id = %connection_id, room_code = %room_code);
    let _enter = span.enter();
    info!("connection opened");

    let (mut sink, mut stream) = socket.split();
    let (outbox_tx, mut outbox_rx) = mpsc::unbounded_channel::<ServerMessage>();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut room_handle: Option<RoomHandle> = None;

    loop {
        let Some(Ok(message)) = stream.next().await else {
            break;
        };
        let Message::Text(text) = message else {
            continue;
        };
        let client_message: ClientMessage = match serde_json::from_str(&text) {
            Ok(msg) => msg,
            Err(err) => {
                debug!(error = %err, "rejected malformed client message");
                let _ = outbox_tx.send(ServerMessage::Error {
                    reason: malformed_message_reason(&text).to_string(),
                });
                continue;
            }
        };

        handle_client_message(&state, &connection_id, &outbox_tx, &mut room_handle, client_message).await;
    }

    send_task.abort();
    state.registry.handle_disconnect(&connection_id);
    info!("connection closed");
}

async fn handle_client_message(
    state: &AppState,
    connection_id: &str,
    outbox: &mpsc::UnboundedSender<ServerMessage>,
    room_handle: &mut Option<RoomHandle>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateRoom => {
            let room_code = state.registry.create_room();
            *room_handle = state.registry.get(&room_code).ok();
            let _ = outbox.send(ServerMessage::RoomCreated { room_code });
        }
        ClientMessage::JoinRoom {
            room_code,
            username,
            ghost_identity,
        } => {
            match state
                .registry
                .join_room(&room_code, connection_id.to_string(), username, ghost_identity, outbox.clone())
                .await
            {
                Ok(snapshot) => {
                    *room_handle = state.registry.get(&room_code).ok();
                    let _ = outbox.send(ServerMessage::GameState(snapshot));
                }
                Err(err) => {
                    let _ = outbox.send(ServerMessage::Error {
                        reason: join_error_reason(&err).to_string(),
                    });
                }
            }
        }
        other => {
            let Some(handle) = room_handle.as_ref() else {
                let _ = outbox.send(ServerMessage::Error {
                    reason: "NotInRoom".to_string(),
                });
                return;
            };
            room_actor::dispatch(handle, connection_id, outbox, other).await;
        }
    }
}

/// A `ClientMessage` failed to deserialize. Probes the raw JSON for a
/// `playerInput` envelope with a bad `direction` field so that case gets the
/// precise `InvalidDirection` reason; everything else (truncated JSON, an
/// unknown `type`, a missing required field) gets the generic catch-all.
fn malformed_message_reason(text: &str) -> &'static str {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) if value.get("type").and_then(|t| t.as_str()) == Some("playerInput") => "InvalidDirection",
        _ => "MalformedMessage",
    }
}

fn join_error_reason(err: &crate::registry::JoinError) -> &'static str {
    match err {
        crate::registry::JoinError::Registry(registry_err) => crate::errors::registry_error_reason(registry_err),
        crate::registry::JoinError::Room(room_err) => crate::errors::room_error_reason(room_err),
    }
}
