//! Shared domain and wire types for the Pac-Man simulation core and server
//! process. Every type that must agree between `pacman-core`'s simulation and
//! `pacman-server`'s transport layer lives here.

pub mod cell;
pub mod direction;
pub mod ghost;
pub mod message;
pub mod mode;
pub mod position;

pub use cell::Cell;
pub use direction::Direction;
pub use ghost::{GhostIdentity, PlayerState};
pub use mode::{GameMode, Winner};
pub use position::Position;
