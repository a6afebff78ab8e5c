//! The maze: an immutable 2-D grid of tiles plus a teleport table.
//!
//! This simulation is tick-granular and grid-addressed, so movement is
//! tracked over a flat cell array and a teleport lookup table rather than
//! a continuous node/edge graph. Parsing a character grid produces a typed
//! `MazeError::UnknownCharacter` on garbage input rather than silently
//! discarding it.
use std::collections::HashMap;

use pacman_common::{Cell, Position};

use crate::error::MazeError;

pub const REFERENCE_WIDTH: i32 = 28;
pub const REFERENCE_HEIGHT: i32 = 35;

/// Named starting positions baked into the reference maze.
#[derive(Debug, Clone, Copy)]
pub struct StartingPositions {
    pub pacman: Position,
    pub ghost_house: Position,
    pub blinky: Position,
    pub pinky: Position,
    pub inky: Position,
    pub clyde: Position,
}

/// An immutable maze: a cell grid, a teleport table, and the reference
/// starting positions. Constructed once per process and shared across rooms
/// via `Arc<Maze>` (see `room::GameRoom`).
#[derive(Debug, Clone)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    /// Entry -> exit. Built bidirectionally by `from_layout` for every tunnel
    /// pair so that stepping into either mouth teleports to the other.
    teleports: HashMap<Position, Position>,
    starting_positions: StartingPositions,
}

impl Maze {
    /// Parses a rectangular character grid into a `Maze`. Every row must have
    /// the same length. `'T'` characters mark tunnel mouths; rows are scanned
    /// left to right, top to bottom, and tunnel mouths are paired up in the
    /// order encountered (first with second, third with fourth, ...), mirroring
    /// the "ordered list of teleport pairs" the external spec describes.
    pub fn from_layout(
        rows: &[impl AsRef<str>],
        starting_positions: StartingPositions,
    ) -> Result<Maze, MazeError> {
        if rows.is_empty() {
            return Err(MazeError::InvalidConfig("maze layout is empty".into()));
        }
        let height = rows.len() as i32;
        let width = rows[0].as_ref().chars().count() as i32;

        let mut cells = Vec::with_capacity((width * height) as usize);
        let mut tunnel_mouths = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() as i32 != width {
                return Err(MazeError::InvalidConfig(format!(
                    "row {y} has inconsistent width"
                )));
            }
            for (x, ch) in row.chars().enumerate() {
                if ch == 'T' {
                    tunnel_mouths.push(Position::new(x as i32, y as i32));
                    cells.push(Cell::Dot);
                    continue;
                }
                let cell = Cell::from_code(ch).map_err(MazeError::UnknownCharacter)?;
                cells.push(cell);
            }
        }

        if tunnel_mouths.len() % 2 != 0 {
            return Err(MazeError::InvalidConfig(
                "tunnel mouths must come in pairs".into(),
            ));
        }

        let mut teleports = HashMap::new();
        for pair in tunnel_mouths.chunks_exact(2) {
            let (a, b) = (pair[0], pair[1]);
            teleports.insert(a, b);
            teleports.insert(b, a);
        }

        Ok(Maze {
            width,
            height,
            cells,
            teleports,
            starting_positions,
        })
    }

    /// The reference 28x35 maze used by default: a perimeter wall, isolated
    /// interior pillars spaced on a 4-cell grid (never disconnecting the
    /// corridor network since each pillar's neighbors remain walkable on
    /// every other side), a central ghost house, power pellets at the four
    /// interior corners, and a single tunnel pair at the midline row.
    pub fn reference() -> Maze {
        let width = REFERENCE_WIDTH;
        let height = REFERENCE_HEIGHT;
        let tunnel_row = height / 2;

        let mut rows: Vec<String> = Vec::with_capacity(height as usize);
        for y in 0..height {
            let mut row = String::with_capacity(width as usize);
            for x in 0..width {
                let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let is_pillar = x % 4 == 0 && y % 4 == 0 && !on_border;
                let in_ghost_house =
                    (11..=16).contains(&x) && (tunnel_row - 2..=tunnel_row + 2).contains(&y);

                let ch = if on_border && y == tunnel_row && (x == 0 || x == width - 1) {
                    'T'
                } else if on_border {
                    '#'
                } else if in_ghost_house {
                    'g'
                } else if is_pillar {
                    '#'
                } else if (x == 2 && y == 2)
                    || (x == width - 3 && y == 2)
                    || (x == 2 && y == height - 3)
                    || (x == width - 3 && y == height - 3)
                {
                    'o'
                } else {
                    '.'
                };
                row.push(ch);
            }
            rows.push(row);
        }

        let starting_positions = StartingPositions {
            pacman: Position::new(width / 2, height - 4),
            ghost_house: Position::new(width / 2, tunnel_row),
            blinky: Position::new(width / 2 - 1, tunnel_row - 1),
            pinky: Position::new(width / 2, tunnel_row - 1),
            inky: Position::new(width / 2 - 1, tunnel_row),
            clyde: Position::new(width / 2, tunnel_row + 1),
        };

        Maze::from_layout(&rows, starting_positions)
            .expect("the generated reference layout is always well-formed")
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn starting_positions(&self) -> StartingPositions {
        self.starting_positions
    }

    /// The reference spawn cell for a given ghost identity.
    pub fn starting_position_for(&self, ghost: pacman_common::GhostIdentity) -> Position {
        use pacman_common::GhostIdentity;
        match ghost {
            GhostIdentity::Blinky => self.starting_positions.blinky,
            GhostIdentity::Pinky => self.starting_positions.pinky,
            GhostIdentity::Inky => self.starting_positions.inky,
            GhostIdentity::Clyde => self.starting_positions.clyde,
        }
    }

    fn in_bounds(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn cell_at(&self, p: Position) -> Option<Cell> {
        if !self.in_bounds(p) {
            return None;
        }
        self.cells.get((p.y * self.width + p.x) as usize).copied()
    }

    pub fn is_walkable(&self, p: Position) -> bool {
        self.cell_at(p).map(|c| c.is_walkable()).unwrap_or(false)
    }

    /// If `p` is a tunnel mouth, returns its paired exit; otherwise returns
    /// `p` unchanged.
    pub fn apply_teleport(&self, p: Position) -> Position {
        self.teleports.get(&p).copied().unwrap_or(p)
    }

    /// Up to 4 in-bounds, walkable orthogonal neighbors of `p`, teleport exits
    /// substituted for their entry mouth.
    pub fn neighbors(&self, p: Position) -> smallvec::SmallVec<[Position; 4]> {
        let mut out = smallvec::SmallVec::new();
        for direction in pacman_common::Direction::ALL {
            let raw = p + direction.offset();
            let resolved = self.apply_teleport(raw);
            if self.is_walkable(resolved) {
                out.push(resolved);
            }
        }
        out
    }

    /// All dot positions in the maze (initial dot set).
    pub fn dot_positions(&self) -> Vec<Position> {
        self.positions_of(Cell::Dot)
    }

    /// All power pellet positions in the maze (initial pellet set).
    pub fn power_pellet_positions(&self) -> Vec<Position> {
        self.positions_of(Cell::PowerPellet)
    }

    fn positions_of(&self, target: Cell) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Position::new(x, y);
                if self.cell_at(p) == Some(target) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// An intersection is any walkable cell with 3 or more walkable
    /// neighbors, used by `DefensiveBrain`'s choke-point evaluation.
    pub fn is_intersection(&self, p: Position) -> bool {
        self.is_walkable(p) && self.neighbors(p).len() >= 3
    }

    pub fn teleport_pairs(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.teleports.iter().map(|(&a, &b)| (a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_starting_positions() -> StartingPositions {
        StartingPositions {
            pacman: Position::new(1, 1),
            ghost_house: Position::new(1, 1),
            blinky: Position::new(1, 1),
            pinky: Position::new(1, 1),
            inky: Position::new(1, 1),
            clyde: Position::new(1, 1),
        }
    }

    #[test]
    fn rejects_unknown_characters() {
        let rows = vec!["###", "#?#", "###"];
        let err = Maze::from_layout(&rows, toy_starting_positions()).unwrap_err();
        assert!(matches!(err, MazeError::UnknownCharacter('?')));
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = vec!["###", "#.#", "##"];
        let err = Maze::from_layout(&rows, toy_starting_positions()).unwrap_err();
        assert!(matches!(err, MazeError::InvalidConfig(_)));
    }

    #[test]
    fn walkability_matches_tile() {
        let rows = vec!["###", "#.#", "###"];
        let maze = Maze::from_layout(&rows, toy_starting_positions()).unwrap();
        assert!(maze.is_walkable(Position::new(1, 1)));
        assert!(!maze.is_walkable(Position::new(0, 0)));
        assert!(!maze.is_walkable(Position::new(5, 5)));
    }

    #[test]
    fn tunnel_pair_teleports_both_ways() {
        let rows = vec!["TT.", "...", "..."];
        let maze = Maze::from_layout(&rows, toy_starting_positions()).unwrap();
        assert_eq!(
            maze.apply_teleport(Position::new(0, 0)),
            Position::new(1, 0)
        );
        assert_eq!(
            maze.apply_teleport(Position::new(1, 0)),
            Position::new(0, 0)
        );
    }

    #[test]
    fn reference_maze_is_fully_connected() {
        let maze = Maze::reference();
        let dots = maze.dot_positions();
        assert!(!dots.is_empty());

        let start = maze.starting_positions().pacman;
        let mut seen = std::collections::HashSet::new();
        let mut queue = std::collections::VecDeque::new();
        seen.insert(start);
        queue.push_back(start);
        while let Some(p) = queue.pop_front() {
            for n in maze.neighbors(p) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        for dot in &dots {
            assert!(
                seen.contains(dot),
                "dot at {dot:?} is unreachable from pacman start"
            );
        }
    }

    #[test]
    fn reference_maze_dots_and_pellets_disjoint() {
        let maze = Maze::reference();
        let dots: std::collections::HashSet<_> = maze.dot_positions().into_iter().collect();
        let pellets: std::collections::HashSet<_> =
            maze.power_pellet_positions().into_iter().collect();
        assert!(dots.is_disjoint(&pellets));
    }
}
