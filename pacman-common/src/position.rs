//! Integer grid positions and the Manhattan-distance helpers the brains and
//! pathfinder share.
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A cell coordinate on the maze grid. Thin newtype over `glam::IVec2` so that
/// wire serialization stays `{x, y}` regardless of how `glam` chooses to
/// serialize its own types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn to_ivec2(self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

impl From<IVec2> for Position {
    fn from(v: IVec2) -> Self {
        Position::new(v.x, v.y)
    }
}

impl From<Position> for IVec2 {
    fn from(p: Position) -> Self {
        IVec2::new(p.x, p.y)
    }
}

impl std::ops::Add<IVec2> for Position {
    type Output = Position;

    fn add(self, rhs: IVec2) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}
