//! A human-controlled ghost player within one room.
use std::time::Instant;

use pacman_common::{Direction, GhostIdentity, PlayerState, Position};

/// One connected human. Owned exclusively by the `GameRoom` that holds them;
/// brains never see this type directly (they consult `GhostObservation`,
/// §`observation.rs`).
#[derive(Debug, Clone)]
pub struct Player {
    pub connection_id: String,
    pub name: String,
    pub ghost_identity: GhostIdentity,
    pub position: Position,
    pub facing: Direction,
    /// A requested direction not yet applied; adopted on the next tick once
    /// its target cell is walkable.
    pub buffered_direction: Option<Direction>,
    pub ready: bool,
    pub state: PlayerState,
    pub respawn_deadline: Option<Instant>,
}

impl Player {
    pub fn new(
        connection_id: impl Into<String>,
        name: impl Into<String>,
        ghost_identity: GhostIdentity,
        spawn: Position,
    ) -> Self {
        Player {
            connection_id: connection_id.into(),
            name: name.into(),
            ghost_identity,
            position: spawn,
            facing: Direction::Up,
            buffered_direction: None,
            ready: false,
            state: PlayerState::Active,
            respawn_deadline: None,
        }
    }

    /// A respawning player is never considered for movement or collisions.
    pub fn is_collidable(&self) -> bool {
        matches!(self.state, PlayerState::Active | PlayerState::Frightened)
    }
}
