//! The view of the world a Pac-Man brain is allowed to see each tick. Kept
//! deliberately narrower than `room::GameRoom`'s full internal state — a
//! brain never touches player identities, timers, or scoring directly, only
//! the maze and each ghost's position and state.
use std::collections::HashSet;

use pacman_common::{Direction, GameMode, Position};

use crate::maze::Maze;
use crate::pathfinder;

/// A single ghost's externally visible state, as seen by a brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostObservation {
    pub position: Position,
    pub direction: Direction,
    pub frightened: bool,
}

/// Everything a brain needs to pick Pac-Man's next direction.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub pacman_position: Position,
    pub pacman_facing: Direction,
    pub dots: &'a HashSet<Position>,
    pub power_pellets: &'a HashSet<Position>,
    pub ghosts: &'a [GhostObservation],
    pub mode: GameMode,
    /// Milliseconds remaining in the current frightened window, or `None`
    /// when `mode` is not `Frightened`. Drives `PacmanController`'s
    /// hunter-vs-defensive priority.
    pub frightened_remaining_ms: Option<u64>,
}

impl<'a> Observation<'a> {
    /// Ranks by the same teleport-aware heuristic `astar` uses, so "nearest"
    /// here agrees with what a path to that ghost would actually cost.
    pub fn nearest_non_frightened_ghost(&self, maze: &Maze) -> Option<GhostObservation> {
        self.ghosts
            .iter()
            .filter(|g| !g.frightened)
            .min_by_key(|g| pathfinder::heuristic(maze, g.position, self.pacman_position))
            .copied()
    }

    pub fn nearest_frightened_ghost(&self, maze: &Maze) -> Option<GhostObservation> {
        self.ghosts
            .iter()
            .filter(|g| g.frightened)
            .min_by_key(|g| pathfinder::heuristic(maze, g.position, self.pacman_position))
            .copied()
    }

    pub fn nearest_food(&self, maze: &Maze) -> Option<Position> {
        self.dots
            .iter()
            .chain(self.power_pellets.iter())
            .min_by_key(|p| pathfinder::heuristic(maze, *p, self.pacman_position))
            .copied()
    }

    pub fn total_food_remaining(&self) -> usize {
        self.dots.len() + self.power_pellets.len()
    }
}
