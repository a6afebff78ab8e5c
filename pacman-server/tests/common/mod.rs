use std::sync::Arc;
use std::time::Duration;

use pacman_core::maze::StartingPositions;
use pacman_core::{Maze, RoomConfig};
use pacman_server::app::{create_router, AppState};
use pacman_server::directory::NoopDirectory;
use pacman_server::registry::RoomRegistry;

/// A tiny maze, good enough to hold a room through join/start/tick without
/// exercising maze generation itself (that belongs to `pacman-core`).
pub fn test_maze() -> Arc<Maze> {
    let starting_positions = StartingPositions {
        pacman: pacman_common::Position::new(1, 1),
        ghost_house: pacman_common::Position::new(1, 1),
        blinky: pacman_common::Position::new(1, 1),
        pinky: pacman_common::Position::new(1, 1),
        inky: pacman_common::Position::new(1, 1),
        clyde: pacman_common::Position::new(1, 1),
    };
    Arc::new(Maze::from_layout(&["#####", "#...#", "#.#.#", "#...#", "#####"], starting_positions).unwrap())
}

pub fn test_app_state() -> AppState {
    let registry = RoomRegistry::new(
        test_maze(),
        RoomConfig::default(),
        Duration::from_secs(3600),
        Arc::new(NoopDirectory),
    );
    AppState::new(registry)
}

pub fn test_router() -> axum::Router {
    create_router(test_app_state())
}
