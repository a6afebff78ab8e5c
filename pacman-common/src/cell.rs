//! Maze tile types.
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// A single tile of the maze grid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Cell {
    Wall,
    Dot,
    PowerPellet,
    GhostHouse,
}

impl Cell {
    /// Non-wall cells are walkable by both Pac-Man and ghosts.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Cell::Wall)
    }

    /// Parses the reference layout's single-character tile codes. Unknown
    /// characters are rejected with the offending char rather than silently
    /// falling back to a wall or empty space.
    pub fn from_code(code: char) -> Result<Cell, char> {
        match code {
            '0' | '#' => Ok(Cell::Wall),
            '1' | '.' => Ok(Cell::Dot),
            '2' | 'o' => Ok(Cell::PowerPellet),
            '3' | 'g' => Ok(Cell::GhostHouse),
            ' ' | '_' => Ok(Cell::Dot),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_is_not_walkable() {
        assert!(!Cell::Wall.is_walkable());
    }

    #[test]
    fn dot_pellet_house_are_walkable() {
        assert!(Cell::Dot.is_walkable());
        assert!(Cell::PowerPellet.is_walkable());
        assert!(Cell::GhostHouse.is_walkable());
    }

    #[test]
    fn unknown_code_is_an_error() {
        assert_eq!(Cell::from_code('?'), Err('?'));
    }
}
