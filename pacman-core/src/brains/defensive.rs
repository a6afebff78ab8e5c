//! Bounded-depth predictive lookahead with alpha-beta pruning: Pac-Man's
//! primary decision module whenever no frightened ghost is worth chasing.
//!
//! Structurally this is the same alpha-beta shape as
//! `other_examples/14552acb_batconjurer-hammerhead__src-alpha_beta-heuristic.rs.rs`
//! (a terminal-state sentinel, a cached/summed multi-component heuristic, a
//! `compare_children`-style argmax), adapted from that file's adversarial
//! two-player minimax to a Max-only search: Pac-Man branches on every
//! direction, but ghosts collapse to one deterministic projected move per
//! ply rather than an adversary searching its own branches.
use std::collections::{HashSet, VecDeque};

use pacman_common::{Direction, Position};

use crate::maze::Maze;
use crate::observation::{GhostObservation, Observation};
use crate::pathfinder;

/// Returned by a min node (or a leaf reached via one) when a non-frightened
/// ghost occupies or swaps into Pac-Man's cell this ply. Distinct from the
/// `f64::NEG_INFINITY`-style terminal loss score: this sentinel marks "this
/// branch dies at this specific ply," which matters for how far down the
/// tree the alpha-beta cutoff propagates.
const INSTANT_DEATH_SENTINEL: f64 = -100_000.0;
const WIN_SCORE: f64 = 1_000_000.0;

const W_DANGER: f64 = -2500.0;
const W_PROGRESS: f64 = 200.0;
const W_DIST: f64 = -3.0;
const W_FRIGHTBONUS: f64 = 1200.0;
const W_URGENCY: f64 = 6000.0;
const W_EXPLORE: f64 = 150.0;
const W_POSITIONAL: f64 = 80.0;
const W_CHOKE: f64 = -800.0;

const SAFE_EXPLORATION_DANGER_RADIUS: i32 = 12;
const EXPLORE_NO_FOOD_RADIUS: i32 = 6;
const EXPLORE_NO_DANGER_RADIUS: i32 = 8;
const URGENCY_DANGER_RADIUS: i32 = 8;
const GHOST_REROUTE_SLACK: i32 = 5;
const ANTI_DITHER_EXPLORE_DANGER_RADIUS: i32 = 10;
const ANTI_DITHER_EXPLORE_FOOD_RADIUS: i32 = 8;
const ANTI_DITHER_EXPLORE_BONUS: f64 = 0.15;
const ANTI_DITHER_CLOSE_BONUS: f64 = 0.05;
const POSITIONAL_FLOOD_DEPTH: i32 = 6;
const POSITIONAL_SAFE_RADIUS: i32 = 4;
const CHOKE_WINDOW_RADIUS: i32 = 7;

/// A lightweight copy of the game state a search node mutates as it
/// simulates moves, independent of `room::GameRoom`'s real bookkeeping
/// (respawn timers, scoring, player identities never enter the search).
#[derive(Clone)]
struct SimState {
    pacman: Position,
    previous_pacman: Position,
    ghosts: Vec<GhostObservation>,
    dots: HashSet<Position>,
    power_pellets: HashSet<Position>,
}

pub struct DefensiveBrain {
    search_depth: u8,
}

impl DefensiveBrain {
    pub fn new(search_depth: u8) -> Self {
        DefensiveBrain {
            search_depth: clamp_depth(search_depth),
        }
    }

    /// Clamps to `[1, 20]`, the search-depth contract this project settles
    /// on (see `DESIGN.md`).
    pub fn set_search_depth(&mut self, depth: u8) {
        self.search_depth = clamp_depth(depth);
    }

    pub fn search_depth(&self) -> u8 {
        self.search_depth
    }

    /// Picks Pac-Man's next direction given the current observation and the
    /// match's initial food count (used by the `progress` heuristic
    /// component).
    pub fn find_best_direction(&self, maze: &Maze, obs: &Observation, initial_food_count: usize) -> Direction {
        if let Some(direction) = self.safe_exploration_direction(maze, obs) {
            return direction;
        }

        let state = SimState {
            pacman: obs.pacman_position,
            previous_pacman: obs.pacman_position,
            ghosts: obs.ghosts.to_vec(),
            dots: obs.dots.clone(),
            power_pellets: obs.power_pellets.clone(),
        };

        let mut scored: Vec<(Direction, f64)> = Vec::with_capacity(4);
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;

        for direction in Direction::ALL {
            let Some(mut candidate) = apply_pacman_move(maze, &state, direction) else {
                continue;
            };

            let score = match apply_ghost_projections(maze, &mut candidate) {
                true => INSTANT_DEATH_SENTINEL,
                false => {
                    let depth_value = self.search(maze, &candidate, self.search_depth.saturating_sub(1), alpha, beta, initial_food_count);
                    depth_value + tier2_bonus(maze, candidate.pacman, &candidate.ghosts)
                }
            };

            scored.push((direction, score));
            if score > alpha {
                alpha = score;
            }
        }

        if scored.is_empty() {
            // No walkable direction at all; stay put by repeating the
            // current facing. This cannot happen on a well-formed maze, but
            // a brain that panics on a degenerate map is worse than one that
            // idles.
            return obs.pacman_facing;
        }

        let best_score = scored
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);

        self.apply_anti_dithering(maze, obs, obs.pacman_facing, best_score, &scored)
    }

    fn safe_exploration_direction(&self, maze: &Maze, obs: &Observation) -> Option<Direction> {
        if obs.total_food_remaining() == 0 {
            return None;
        }
        let min_danger = obs
            .ghosts
            .iter()
            .filter(|g| !g.frightened)
            .map(|g| pathfinder::heuristic(maze, g.position, obs.pacman_position))
            .min()
            .unwrap_or(i32::MAX);
        if min_danger <= SAFE_EXPLORATION_DANGER_RADIUS {
            return None;
        }
        let target = obs.nearest_food(maze)?;
        let path = pathfinder::astar(maze, obs.pacman_position, target, &[]).ok()?;
        pathfinder::first_step_direction(&path)
    }

    fn apply_anti_dithering(
        &self,
        maze: &Maze,
        obs: &Observation,
        fallback: Direction,
        best_score: f64,
        scored: &[(Direction, f64)],
    ) -> Direction {
        if scored.len() == 1 {
            return scored[0].0;
        }

        let min_danger = obs
            .ghosts
            .iter()
            .filter(|g| !g.frightened)
            .map(|g| pathfinder::heuristic(maze, g.position, obs.pacman_position))
            .min()
            .unwrap_or(i32::MAX);
        let min_food = obs
            .nearest_food(maze)
            .map(|f| pathfinder::heuristic(maze, obs.pacman_position, f))
            .unwrap_or(i32::MAX);
        let exploring = min_danger >= ANTI_DITHER_EXPLORE_DANGER_RADIUS
            && min_food >= ANTI_DITHER_EXPLORE_FOOD_RADIUS;

        let magnitude = best_score.abs();
        let mut adjusted: Vec<(Direction, f64)> = scored.to_vec();

        if let Some(entry) = adjusted.iter_mut().find(|(d, _)| *d == obs.pacman_facing) {
            if exploring {
                entry.1 += ANTI_DITHER_EXPLORE_BONUS * magnitude;
            } else if (best_score - entry.1).abs() < ANTI_DITHER_CLOSE_BONUS * magnitude {
                entry.1 += ANTI_DITHER_CLOSE_BONUS * magnitude;
            }
        }

        adjusted
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(d, _)| d)
            .unwrap_or(fallback)
    }

    fn search(&self, maze: &Maze, state: &SimState, depth: u8, mut alpha: f64, beta: f64, initial_food_count: usize) -> f64 {
        if depth == 0 || (state.dots.is_empty() && state.power_pellets.is_empty()) {
            return evaluate(maze, state, initial_food_count);
        }

        let mut best = f64::NEG_INFINITY;
        let mut any = false;

        for direction in Direction::ALL {
            let Some(mut candidate) = apply_pacman_move(maze, state, direction) else {
                continue;
            };
            any = true;

            let value = if apply_ghost_projections(maze, &mut candidate) {
                INSTANT_DEATH_SENTINEL
            } else {
                self.search(maze, &candidate, depth - 1, alpha, beta, initial_food_count)
            };

            if value > best {
                best = value;
            }
            if best > alpha {
                alpha = best;
            }
            if beta <= alpha {
                break;
            }
        }

        if !any {
            return evaluate(maze, state, initial_food_count);
        }

        best
    }
}

fn clamp_depth(depth: u8) -> u8 {
    depth.clamp(1, 20)
}

fn apply_pacman_move(maze: &Maze, state: &SimState, direction: Direction) -> Option<SimState> {
    let raw = state.pacman + direction.offset();
    if !maze.is_walkable(raw) {
        return None;
    }
    let resolved = maze.apply_teleport(raw);

    let mut next = state.clone();
    next.previous_pacman = state.pacman;
    next.pacman = resolved;
    if next.dots.remove(&resolved) {
        // consumed, tier-1 `progress` picks this up via dots.len() shrinking
    }
    if next.power_pellets.remove(&resolved) {
        for ghost in next.ghosts.iter_mut() {
            ghost.frightened = true;
        }
    }
    Some(next)
}

/// Projects every ghost's next move and resolves same-cell/swap collisions.
/// Returns `true` if a non-frightened ghost catches Pac-Man this ply.
fn apply_ghost_projections(maze: &Maze, state: &mut SimState) -> bool {
    let pacman_before = state.previous_pacman;
    let pacman_after = state.pacman;

    for ghost in state.ghosts.iter_mut() {
        let continued_raw = ghost.position + ghost.direction.offset();
        let continued = maze.apply_teleport(continued_raw);
        let continues_is_valid = maze.is_walkable(continued_raw)
            && pathfinder::heuristic(maze, continued, pacman_after)
                <= pathfinder::heuristic(maze, ghost.position, pacman_after) + GHOST_REROUTE_SLACK;

        let next_position = if continues_is_valid {
            continued
        } else {
            maze.neighbors(ghost.position)
                .into_iter()
                .min_by_key(|p| pathfinder::heuristic(maze, *p, pacman_after))
                .unwrap_or(ghost.position)
        };

        if let Some(direction) = Direction::between(ghost.position, next_position) {
            ghost.direction = direction;
        }

        let ghost_before = ghost.position;
        ghost.position = next_position;

        if !ghost.frightened {
            let same_cell = ghost.position == pacman_after;
            let swap = ghost_before == pacman_after && ghost.position == pacman_before;
            if same_cell || swap {
                return true;
            }
        }
    }
    false
}

fn evaluate(maze: &Maze, state: &SimState, initial_food_count: usize) -> f64 {
    let remaining_food = state.dots.len() + state.power_pellets.len();
    if remaining_food == 0 {
        return WIN_SCORE;
    }

    let min_danger = state
        .ghosts
        .iter()
        .filter(|g| !g.frightened)
        .map(|g| pathfinder::heuristic(maze, g.position, state.pacman))
        .min();

    if min_danger == Some(0) {
        return -WIN_SCORE;
    }

    let danger_term = min_danger
        .map(|d| W_DANGER / (d as f64 + 1.0))
        .unwrap_or(0.0);

    let progress_term = (initial_food_count.saturating_sub(remaining_food)) as f64 * W_PROGRESS;

    let nearest_food_dist = state
        .dots
        .iter()
        .chain(state.power_pellets.iter())
        .map(|p| pathfinder::heuristic(maze, state.pacman, *p))
        .min()
        .unwrap_or(0);
    let dist_term = nearest_food_dist as f64 * W_DIST;

    let min_frightened = state
        .ghosts
        .iter()
        .filter(|g| g.frightened)
        .map(|g| pathfinder::heuristic(maze, g.position, state.pacman))
        .min();
    let frightbonus_term = min_frightened
        .map(|d| W_FRIGHTBONUS / (d as f64 + 1.0))
        .unwrap_or(0.0);

    let on_pellet = state.power_pellets.contains(&state.pacman);
    let urgency_term = if on_pellet && min_danger.unwrap_or(i32::MAX) <= URGENCY_DANGER_RADIUS {
        W_URGENCY / (min_danger.unwrap_or(0) as f64 + 1.0)
    } else {
        0.0
    };

    let explore_term = if nearest_food_dist > EXPLORE_NO_FOOD_RADIUS
        && min_danger.unwrap_or(i32::MAX) > EXPLORE_NO_DANGER_RADIUS
    {
        W_EXPLORE
    } else {
        0.0
    };

    danger_term + progress_term + dist_term + frightbonus_term + urgency_term + explore_term
}

/// Root-only expensive components: positional advantage (a breadth-first
/// flood counting tiles that stay safely distant from every ghost) and
/// choke-point danger (intersections near the candidate cell that a ghost
/// could exploit).
fn tier2_bonus(maze: &Maze, candidate: Position, ghosts: &[GhostObservation]) -> f64 {
    positional_advantage(maze, candidate, ghosts) + choke_point_danger(maze, candidate, ghosts)
}

fn positional_advantage(maze: &Maze, candidate: Position, ghosts: &[GhostObservation]) -> f64 {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(candidate);
    queue.push_back((candidate, 0));

    let mut safe_tiles = 0;
    while let Some((pos, depth)) = queue.pop_front() {
        let min_ghost_dist = ghosts
            .iter()
            .filter(|g| !g.frightened)
            .map(|g| pathfinder::heuristic(maze, pos, g.position))
            .min()
            .unwrap_or(i32::MAX);
        if min_ghost_dist >= POSITIONAL_SAFE_RADIUS {
            safe_tiles += 1;
        }
        if depth >= POSITIONAL_FLOOD_DEPTH {
            continue;
        }
        for neighbor in maze.neighbors(pos) {
            if visited.insert(neighbor) {
                queue.push_back((neighbor, depth + 1));
            }
        }
    }

    safe_tiles as f64 * W_POSITIONAL
}

fn choke_point_danger(maze: &Maze, candidate: Position, ghosts: &[GhostObservation]) -> f64 {
    let mut total = 0.0;
    for dy in -CHOKE_WINDOW_RADIUS..=CHOKE_WINDOW_RADIUS {
        for dx in -CHOKE_WINDOW_RADIUS..=CHOKE_WINDOW_RADIUS {
            let cell = Position::new(candidate.x + dx, candidate.y + dy);
            if cell.manhattan(candidate) > CHOKE_WINDOW_RADIUS {
                continue;
            }
            if !maze.is_intersection(cell) {
                continue;
            }
            for ghost in ghosts.iter().filter(|g| !g.frightened) {
                let d = cell.manhattan(ghost.position);
                total += W_CHOKE / (d as f64 + 1.0);
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::StartingPositions;
    use pacman_common::GameMode;

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
    fn clamps_search_depth() {
        let mut brain = DefensiveBrain::new(100);
        assert_eq!(brain.search_depth(), 20);
        brain.set_search_depth(0);
        assert_eq!(brain.search_depth(), 1);
    }

    #[test]
    fn avoids_adjacent_non_frightened_ghost_when_alternative_exists() {
        // A small cross-shaped corridor. Pac-Man at the center has a ghost
        // one step to the right; left, up, and down remain open and lead
        // toward food, so moving right (straight at the ghost) must never be
        // selected.
        let maze = toy_maze(&[
            "#######",
            "#..#..#",
            "#..#..#",
            "#.....#",
            "#..#..#",
            "#..#..#",
            "#######",
        ]);
        let pacman = Position::new(3, 3);
        let ghosts = vec![GhostObservation {
            position: Position::new(4, 3),
            direction: Direction::Left,
            frightened: false,
        }];
        let dots: HashSet<Position> = maze.dot_positions().into_iter().collect();
        let power_pellets: HashSet<Position> = HashSet::new();
        let obs = Observation {
            pacman_position: pacman,
            pacman_facing: Direction::Up,
            dots: &dots,
            power_pellets: &power_pellets,
            ghosts: &ghosts,
            mode: GameMode::Chase,
            frightened_remaining_ms: None,
        };

        let brain = DefensiveBrain::new(4);
        let chosen = brain.find_best_direction(&maze, &obs, dots.len());
        assert_ne!(chosen, Direction::Right);
    }

    #[test]
    fn deterministic_given_identical_inputs() {
        let maze = Maze::reference();
        let dots: HashSet<Position> = maze.dot_positions().into_iter().collect();
        let power_pellets: HashSet<Position> = maze.power_pellet_positions().into_iter().collect();
        let ghosts = vec![GhostObservation {
            position: maze.starting_positions().blinky,
            direction: Direction::Up,
            frightened: false,
        }];
        let obs = Observation {
            pacman_position: maze.starting_positions().pacman,
            pacman_facing: Direction::Up,
            dots: &dots,
            power_pellets: &power_pellets,
            ghosts: &ghosts,
            mode: GameMode::Chase,
            frightened_remaining_ms: None,
        };
        let brain = DefensiveBrain::new(4);
        let a = brain.find_best_direction(&maze, &obs, dots.len());
        let b = brain.find_best_direction(&maze, &obs, dots.len());
        assert_eq!(a, b);
    }

    #[test]
    fn safe_exploration_heads_toward_nearest_food() {
        let maze = Maze::reference();
        let dots: HashSet<Position> = maze.dot_positions().into_iter().collect();
        let power_pellets: HashSet<Position> = HashSet::new();
        // No ghosts at all: every direction is "safe," so the fast path
        // should engage and match a direct A* step toward the nearest food.
        let ghosts: Vec<GhostObservation> = Vec::new();
        let pacman_position = maze.starting_positions().pacman;
        let obs = Observation {
            pacman_position,
            pacman_facing: Direction::Up,
            dots: &dots,
            power_pellets: &power_pellets,
            ghosts: &ghosts,
            mode: GameMode::Chase,
            frightened_remaining_ms: None,
        };
        let brain = DefensiveBrain::new(4);
        let chosen = brain.find_best_direction(&maze, &obs, dots.len());

        let target = obs.nearest_food(&maze).unwrap();
        let path = pathfinder::astar(&maze, pacman_position, target, &[]).unwrap();
        let expected = pathfinder::first_step_direction(&path).unwrap();
        assert_eq!(chosen, expected);
    }
}
