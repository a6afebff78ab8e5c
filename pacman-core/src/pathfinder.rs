//! A* search over the maze grid, with a teleport-aware heuristic and an
//! optional ghost-avoidance cost inflation.
//!
//! The external interface this project targets requires an exact FIFO
//! tie-break among equal-`f` frontier nodes and a heuristic that accounts
//! for teleports, so this module hand-rolls the search with a `BinaryHeap`
//! rather than reaching for a generic pathfinding crate, and reports
//! failure through `PathfindingError`.
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use pacman_common::{Direction, Position};

use crate::error::PathfindingError;
use crate::maze::Maze;

/// Penalty applied per tile of remaining "danger radius" when a ghost lies
/// within `radius` tiles of a candidate cell, for the ghost-avoidance variant.
const DEFAULT_AVOIDANCE_RADIUS: i32 = 4;
const DEFAULT_AVOIDANCE_PENALTY: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    f_cost: i32,
    sequence: u64,
    position: Position,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse f_cost so the smallest f pops
        // first, and break ties by sequence (FIFO: earlier-enqueued wins).
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Manhattan distance, accounting for teleport shortcuts: for every teleport
/// pair, a path through the pair costs `manhattan(a, entry) + 1 + manhattan(exit, b)`.
/// The heuristic is the minimum of the direct distance and every teleport
/// detour, which stays admissible since it never overestimates the true cost.
pub fn heuristic(maze: &Maze, a: Position, b: Position) -> i32 {
    let mut best = a.manhattan(b);
    for (entry, exit) in maze.teleport_pairs() {
        let via = a.manhattan(entry) + 1 + exit.manhattan(b);
        if via < best {
            best = via;
        }
    }
    best
}

/// Finds a shortest path from `src` to `dst`, inclusive of both endpoints.
/// When `avoid_ghosts` is non-empty, cells within `DEFAULT_AVOIDANCE_RADIUS`
/// of any listed ghost position have their g-cost inflated by
/// `(radius - distance) * DEFAULT_AVOIDANCE_PENALTY`, biasing the search away
/// from danger without forbidding it outright.
pub fn astar(
    maze: &Maze,
    src: Position,
    dst: Position,
    avoid_ghosts: &[Position],
) -> Result<Vec<Position>, PathfindingError> {
    if !maze.is_walkable(src) {
        return Err(PathfindingError::SourceNotWalkable(src));
    }
    if !maze.is_walkable(dst) {
        return Err(PathfindingError::DestinationNotWalkable(dst));
    }
    if src == dst {
        return Ok(vec![src]);
    }

    let mut open = BinaryHeap::new();
    let mut sequence_counter: u64 = 0;
    let mut g_cost: HashMap<Position, i32> = HashMap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();

    g_cost.insert(src, 0);
    open.push(Frontier {
        f_cost: heuristic(maze, src, dst),
        sequence: sequence_counter,
        position: src,
    });

    while let Some(Frontier { position, .. }) = open.pop() {
        if position == dst {
            return Ok(reconstruct_path(&came_from, src, dst));
        }

        let current_g = *g_cost.get(&position).unwrap_or(&i32::MAX);

        for neighbor in maze.neighbors(position) {
            let mut step_cost = 1;
            if let Some(danger) = avoidance_penalty(neighbor, avoid_ghosts) {
                step_cost += danger;
            }
            let tentative_g = current_g + step_cost;

            if tentative_g < *g_cost.get(&neighbor).unwrap_or(&i32::MAX) {
                g_cost.insert(neighbor, tentative_g);
                came_from.insert(neighbor, position);
                sequence_counter += 1;
                open.push(Frontier {
                    f_cost: tentative_g + heuristic(maze, neighbor, dst),
                    sequence: sequence_counter,
                    position: neighbor,
                });
            }
        }
    }

    Err(PathfindingError::Unreachable { from: src, to: dst })
}

fn avoidance_penalty(p: Position, ghosts: &[Position]) -> Option<i32> {
    ghosts
        .iter()
        .filter_map(|&g| {
            let d = p.manhattan(g);
            if d < DEFAULT_AVOIDANCE_RADIUS {
                Some((DEFAULT_AVOIDANCE_RADIUS - d) * DEFAULT_AVOIDANCE_PENALTY)
            } else {
                None
            }
        })
        .max()
}

fn reconstruct_path(
    came_from: &HashMap<Position, Position>,
    src: Position,
    dst: Position,
) -> Vec<Position> {
    let mut path = vec![dst];
    let mut current = dst;
    while current != src {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}

/// The cardinal direction from `path[0]` toward `path[1]`, i.e. the first
/// step of a path returned by `astar`. Returns `None` for a zero- or
/// one-length path (already at the destination).
pub fn first_step_direction(path: &[Position]) -> Option<Direction> {
    if path.len() < 2 {
        return None;
    }
    Direction::between(path[0], path[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::StartingPositions;

    fn toy_maze(rows: &[&str]) -> Maze {
        let starting_positions = StartingPositions {
            pacman: Position::new(1, 1),
            ghost_house: Position::new(1, 1),
            blinky: Position::new(1, 1),
            pinky: Position::new(1, 1),
            inky: Position::new(1, 1),
            clyde: Position::new(1, 1),
        };
        Maze::from_layout(rows, starting_positions).unwrap()
    }

    #[test]
    fn straight_corridor() {
        let maze = toy_maze(&["#####", "#...#", "#####"]);
        let path = astar(&maze, Position::new(1, 1), Position::new(3, 1), &[]).unwrap();
        assert_eq!(
            path,
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(3, 1)
            ]
        );
    }

    #[test]
    fn unreachable_returns_error() {
        let maze = toy_maze(&["#####", "#.#.#", "#####"]);
        let err = astar(&maze, Position::new(1, 1), Position::new(3, 1), &[]).unwrap_err();
        assert!(matches!(err, PathfindingError::Unreachable { .. }));
    }

    #[test]
    fn same_position_is_trivial_path() {
        let maze = toy_maze(&["###", "#.#", "###"]);
        let path = astar(&maze, Position::new(1, 1), Position::new(1, 1), &[]).unwrap();
        assert_eq!(path, vec![Position::new(1, 1)]);
    }

    #[test]
    fn heuristic_prefers_teleport_shortcut() {
        let maze = toy_maze(&["T.....T"]);
        let direct = Position::new(0, 0).manhattan(Position::new(6, 0));
        let via_teleport = heuristic(&maze, Position::new(0, 0), Position::new(6, 0));
        assert!(via_teleport <= direct);
        assert_eq!(via_teleport, 1);
    }

    #[test]
    fn avoidance_routes_around_danger() {
        // A 3-wide corridor; a ghost sits in the middle lane at the midpoint,
        // the avoidance penalty should make the path prefer an outer lane
        // when one is available.
        let maze = toy_maze(&["#####", "#...#", "#...#", "#...#", "#####"]);
        let ghost = vec![Position::new(2, 2)];
        let path = astar(&maze, Position::new(1, 1), Position::new(3, 3), &ghost).unwrap();
        assert!(!path.contains(&Position::new(2, 2)));
    }

    #[test]
    fn first_step_direction_matches_path() {
        let path = vec![Position::new(1, 1), Position::new(2, 1)];
        assert_eq!(first_step_direction(&path), Some(Direction::Right));
        assert_eq!(first_step_direction(&[Position::new(1, 1)]), None);
    }
}
