//! Wire message envelopes exchanged between a connection and its room.
//!
//! Every message is a JSON object tagged by `type`, one variant per inbound or
//! outbound event name in the external interface, using plain idiomatic
//! `serde` internally-tagged enums.
use serde::{Deserialize, Serialize};

use crate::ghost::{GhostIdentity, PlayerState};
use crate::mode::{GameMode, Winner};
use crate::position::Position;
use crate::Direction;

/// A message sent by a connection to its room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "createRoom")]
    CreateRoom,
    #[serde(rename = "joinRoom")]
    JoinRoom {
        #[serde(rename = "roomCode")]
        room_code: String,
        username: String,
        #[serde(rename = "ghostIdentity")]
        ghost_identity: GhostIdentity,
    },
    #[serde(rename = "toggleReady")]
    ToggleReady {
        #[serde(rename = "roomCode")]
        room_code: String,
    },
    #[serde(rename = "startGame")]
    StartGame {
        #[serde(rename = "roomCode")]
        room_code: String,
    },
    #[serde(rename = "restartGame")]
    RestartGame {
        #[serde(rename = "roomCode")]
        room_code: String,
    },
    #[serde(rename = "playerInput")]
    PlayerInput {
        #[serde(rename = "roomCode")]
        room_code: String,
        direction: Direction,
    },
    #[serde(rename = "requestGameState")]
    RequestGameState {
        #[serde(rename = "roomCode")]
        room_code: String,
    },
}

/// A connection-facing view of one ghost player, used in both full snapshots
/// and delta frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
    pub position: Position,
    pub direction: Direction,
    pub state: PlayerState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacmanView {
    pub position: Position,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emote: Option<String>,
}

/// The complete state of a room, sent on join / explicit request / game start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub pacman: PacmanView,
    pub players: Vec<PlayerView>,
    pub score: u32,
    #[serde(rename = "captureCount")]
    pub capture_count: u32,
    pub mode: GameMode,
    pub dots: Vec<Position>,
    #[serde(rename = "powerPellets")]
    pub power_pellets: Vec<Position>,
}

/// A tick's worth of change. Every field but `pacman`/`players` is omitted
/// from the wire payload when unchanged since the previous broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameUpdateDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacman: Option<PacmanView>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub players: Vec<PlayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(rename = "captureCount", skip_serializing_if = "Option::is_none")]
    pub capture_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<GameMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dots: Option<Vec<Position>>,
    #[serde(rename = "powerPellets", skip_serializing_if = "Option::is_none")]
    pub power_pellets: Option<Vec<Position>>,
}

/// A message sent by a room to its connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Acknowledges a `createRoom` request with the newly allocated room
    /// code.
    #[serde(rename = "roomCreated")]
    RoomCreated {
        #[serde(rename = "roomCode")]
        room_code: String,
    },
    #[serde(rename = "gameState")]
    GameState(GameStateSnapshot),
    #[serde(rename = "gameUpdate")]
    GameUpdate(GameUpdateDelta),
    #[serde(rename = "timerUpdate")]
    TimerUpdate {
        #[serde(rename = "timeRemainingMs")]
        time_remaining_ms: u64,
    },
    #[serde(rename = "gameOver")]
    GameOver {
        winner: Winner,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        score: u32,
    },
    #[serde(rename = "gameStarted")]
    GameStarted,
    #[serde(rename = "gameRestarted")]
    GameRestarted,
    #[serde(rename = "playerLeft")]
    PlayerLeft {
        #[serde(rename = "connectionId")]
        connection_id: String,
    },
    #[serde(rename = "error")]
    Error { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_input_round_trips() {
        let msg = ClientMessage::PlayerInput {
            room_code: "AB12".into(),
            direction: Direction::Up,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"playerInput\""));
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        match back {
            ClientMessage::PlayerInput {
                room_code,
                direction,
            } => {
                assert_eq!(room_code, "AB12");
                assert_eq!(direction, Direction::Up);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn delta_omits_unchanged_fields() {
        let delta = GameUpdateDelta::default();
        let json = serde_json::to_value(&delta).unwrap();
        assert!(json.get("score").is_none());
        assert!(json.get("mode").is_none());
    }
}
