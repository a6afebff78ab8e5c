//! Centralized error types for the simulation core.
//!
//! A top-level enum wraps each subsystem's own error type via `#[from]`,
//! plus a `GameResult` alias used pervasively.
//!
//! The variants are grouped to match the four-way taxonomy this project's
//! error handling design calls for: client protocol errors (surfaced to
//! callers, never abort a room), transient integration faults (logged and
//! swallowed), internal invariant violations (abort only the affected room),
//! and brain-decision failures (fall back to the current facing, never
//! propagated as a hard error at all — see `brains::controller`).

/// Primary error type for the simulation core.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("maze error: {0}")]
    Maze(#[from] MazeError),

    #[error("pathfinding error: {0}")]
    Pathfinding(#[from] PathfindingError),

    #[error("room error: {0}")]
    Room(#[from] RoomError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised while building or querying the maze.
#[derive(thiserror::Error, Debug)]
pub enum MazeError {
    #[error("unknown tile character: {0}")]
    UnknownCharacter(char),

    #[error("invalid maze configuration: {0}")]
    InvalidConfig(String),

    #[error("teleport pair references an out-of-bounds position: {0:?}")]
    TeleportOutOfBounds(pacman_common::Position),
}

/// Errors raised by the A* pathfinder, generalized from graph node ids to
/// grid positions.
#[derive(thiserror::Error, Debug)]
pub enum PathfindingError {
    #[error("source position is not walkable: {0:?}")]
    SourceNotWalkable(pacman_common::Position),

    #[error("destination position is not walkable: {0:?}")]
    DestinationNotWalkable(pacman_common::Position),

    #[error("no path exists between {from:?} and {to:?}")]
    Unreachable {
        from: pacman_common::Position,
        to: pacman_common::Position,
    },
}

/// Client protocol errors: always surfaced to the caller, never abort a room.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room has already started")]
    RoomStarted,

    #[error("room is full")]
    RoomFull,

    #[error("ghost identity is already taken: {0}")]
    GhostTaken(pacman_common::GhostIdentity),

    #[error("not every player is ready")]
    NotAllReady,

    #[error("room is not in a state that can be restarted")]
    NotGameOver,

    #[error("no such player in this room")]
    UnknownPlayer,

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

/// Client protocol errors surfaced by the registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no room with this code exists")]
    RoomNotFound,

    #[error("failed to allocate a unique room code after repeated attempts")]
    CodeExhausted,
}

/// Transient integration faults around the tabular policy: logged and
/// swallowed, never propagated to a room or a client.
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse policy file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized position/state key {0:?} in policy file")]
    InvalidKey(String),
}

/// Result type for core simulation operations.
pub type GameResult<T> = Result<T, GameError>;
