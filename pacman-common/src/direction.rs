//! This module defines the `Direction` enum, which is used to represent the
//! direction of an entity moving across the maze grid.
use glam::IVec2;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// An enum representing the direction of an entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the grid offset of the direction as a unit `IVec2`.
    pub fn offset(&self) -> IVec2 {
        match self {
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Up => IVec2::new(0, -1),
        }
    }

    /// Returns the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
        }
    }

    /// Returns the cardinal direction pointing from `from` to an orthogonally
    /// adjacent `to`. Ties (equal absolute delta on both axes) prefer horizontal,
    /// matching `Pathfinder::direction_toward`'s contract.
    pub fn between(from: IVec2, to: IVec2) -> Option<Direction> {
        let delta = to - from;
        if delta == IVec2::ZERO {
            return None;
        }
        if delta.x.abs() >= delta.y.abs() {
            Some(if delta.x > 0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if delta.y > 0 {
                Direction::Down
            } else {
                Direction::Up
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involutive() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn between_prefers_horizontal_on_tie() {
        let from = IVec2::new(5, 5);
        let to = IVec2::new(6, 6);
        assert_eq!(Direction::between(from, to), Some(Direction::Right));
    }

    #[test]
    fn between_same_point_is_none() {
        let p = IVec2::new(3, 3);
        assert_eq!(Direction::between(p, p), None);
    }
}
