//! Pure simulation engine for the inverted Pac-Man server: the maze,
//! pathfinder, Pac-Man brains, and the per-match `GameRoom` state machine.
//! No networking, no async runtime — `pacman-server` drives this crate from
//! a tick loop and forwards its output over the wire.

pub mod brains;
pub mod error;
pub mod maze;
pub mod observation;
pub mod pathfinder;
pub mod player;
pub mod room;

pub use error::{GameError, GameResult, MazeError, PathfindingError, PolicyError, RegistryError, RoomError};
pub use maze::{Maze, StartingPositions};
pub use observation::{GhostObservation, Observation};
pub use player::Player;
pub use room::{GameRoom, RoomConfig, TickOutput};
