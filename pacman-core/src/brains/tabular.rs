//! A pre-trained tabular value-function policy, loaded once at startup and
//! consulted as a drop-in replacement for `DefensiveBrain`/`HunterBrain`.
//!
//! A missing or corrupt file is a transient integration fault, not a reason
//! to refuse to start a room: startup falls back to the other brains and
//! logs a warning rather than aborting. The aggregation follows the
//! external "general value function" contract: per-ghost value estimates
//! are summed across ghosts for each candidate direction.
use std::collections::HashMap;
use std::sync::Arc;

use pacman_common::{Direction, Position};
use serde::Deserialize;

use crate::error::PolicyError;
use crate::maze::Maze;
use crate::observation::Observation;

const WEIGHT_DOT: f64 = 10.0;
const WEIGHT_POWER_PELLET: f64 = 50.0;
const WEIGHT_NON_FRIGHTENED_GHOST: f64 = -1000.0;
const WEIGHT_FRIGHTENED_GHOST: f64 = 1000.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    position_key: String,
    value_table: Vec<(String, [f64; 4])>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFile {
    #[allow(dead_code)]
    alpha: f64,
    #[allow(dead_code)]
    gamma: f64,
    #[allow(dead_code)]
    total_actions: u64,
    #[allow(dead_code)]
    exploration_mode_changed: bool,
    entries: Vec<RawEntry>,
}

/// A flat, allocation-free-on-lookup index from a semantic target position to
/// that target's per-state 4-vector table. `q` indices follow
/// `Direction::ALL`'s order (`[UP, DOWN, LEFT, RIGHT]`).
/// Cheap to clone: the index itself is `Arc`-shared and read-only after
/// load, so every room that installs the same loaded policy points at one
/// allocation.
#[derive(Debug, Default, Clone)]
pub struct TabularPolicy {
    tables: Arc<HashMap<Position, HashMap<(Position, Direction), [f64; 4]>>>,
}

impl TabularPolicy {
    /// Reads and parses a policy file, building the in-memory index. Any
    /// structural or key-format failure is returned to the caller rather than
    /// partially loaded; the caller decides whether to degrade to the
    /// heuristic brains (see `PacmanController`).
    pub fn load(path: &str) -> Result<TabularPolicy, PolicyError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &str) -> Result<TabularPolicy, PolicyError> {
        let raw: RawFile = serde_json::from_str(text).map_err(|source| PolicyError::Parse {
            path: path.to_string(),
            source,
        })?;

        let mut tables = HashMap::with_capacity(raw.entries.len());
        for entry in raw.entries {
            let target = parse_position_key(&entry.position_key)
                .ok_or_else(|| PolicyError::InvalidKey(entry.position_key.clone()))?;
            let mut state_table = HashMap::with_capacity(entry.value_table.len());
            for (state_key, values) in entry.value_table {
                let state = parse_state_key(&state_key)
                    .ok_or_else(|| PolicyError::InvalidKey(state_key.clone()))?;
                state_table.insert(state, values);
            }
            tables.insert(target, state_table);
        }

        Ok(TabularPolicy {
            tables: Arc::new(tables),
        })
    }

    /// Picks a direction by aggregating every semantic target currently on
    /// the board (dots, power pellets, ghosts) weighted by kind, plus a
    /// ghost-adjacency shaping term, then arg-maxing over walkable actions.
    /// Unseen targets contribute the zero vector rather than being rejected.
    pub fn select_action(&self, maze: &Maze, obs: &Observation) -> Direction {
        let state = (obs.pacman_position, obs.pacman_facing);
        let mut totals = [0.0f64; 4];

        for &dot in obs.dots {
            self.accumulate(&mut totals, dot, state, WEIGHT_DOT);
        }
        for &pellet in obs.power_pellets {
            self.accumulate(&mut totals, pellet, state, WEIGHT_POWER_PELLET);
        }
        for ghost in obs.ghosts {
            let weight = if ghost.frightened {
                WEIGHT_FRIGHTENED_GHOST
            } else {
                WEIGHT_NON_FRIGHTENED_GHOST
            };
            self.accumulate(&mut totals, ghost.position, state, weight);
        }

        for (i, direction) in Direction::ALL.iter().enumerate() {
            let candidate = maze.apply_teleport(obs.pacman_position + direction.offset());
            for ghost in obs.ghosts.iter().filter(|g| !g.frightened) {
                totals[i] += adjacency_shaping(candidate.manhattan(ghost.position));
            }
        }

        Direction::ALL
            .iter()
            .enumerate()
            .filter(|(_, direction)| maze.is_walkable(obs.pacman_position + direction.offset()))
            .max_by(|(a, _), (b, _)| {
                totals[*a]
                    .partial_cmp(&totals[*b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(_, direction)| *direction)
            .unwrap_or(obs.pacman_facing)
    }

    fn accumulate(
        &self,
        totals: &mut [f64; 4],
        target: Position,
        state: (Position, Direction),
        weight: f64,
    ) {
        let Some(value_table) = self.tables.get(&target) else {
            return;
        };
        let Some(values) = value_table.get(&state) else {
            return;
        };
        for (total, value) in totals.iter_mut().zip(values.iter()) {
            *total += weight * value;
        }
    }
}

/// Decaying penalty for a candidate cell's proximity to a non-frightened
/// ghost: sharpest right next to it, tapering off to nothing past 8 tiles.
fn adjacency_shaping(distance: i32) -> f64 {
    match distance {
        1 => -500.0,
        2 => -250.0,
        3..=4 => -100.0 / distance as f64,
        5..=8 => -50.0 / distance as f64,
        _ => 0.0,
    }
}

fn parse_position_key(key: &str) -> Option<Position> {
    let mut parts = key.split(',');
    let x: i32 = parts.next()?.trim().parse().ok()?;
    let y: i32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Position::new(x, y))
}

fn parse_state_key(key: &str) -> Option<(Position, Direction)> {
    let mut parts = key.split(',');
    let x: i32 = parts.next()?.trim().parse().ok()?;
    let y: i32 = parts.next()?.trim().parse().ok()?;
    let facing = match parts.next()?.trim().to_uppercase().as_str() {
        "UP" => Direction::Up,
        "DOWN" => Direction::Down,
        "LEFT" => Direction::Left,
        "RIGHT" => Direction::Right,
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((Position::new(x, y), facing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::StartingPositions;
    use crate::observation::GhostObservation;
    use pacman_common::GameMode;
    use std::collections::HashSet;

    fn toy_maze() -> Maze {
        let starting_positions = StartingPositions {
            pacman: Position::new(1, 1),
            ghost_house: Position::new(1, 1),
            blinky: Position::new(1, 1),
            pinky: Position::new(1, 1),
            inky: Position::new(1, 1),
            clyde: Position::new(1, 1),
        };
        Maze::from_layout(&["#####", "#...#", "#####"], starting_positions).unwrap()
    }

    #[test]
    fn parses_minimal_file() {
        let json = r#"{
            "alpha": 0.1,
            "gamma": 0.9,
            "totalActions": 42,
            "explorationModeChanged": false,
            "entries": [
                {
                    "positionKey": "3,1",
                    "valueTable": [["1,1,RIGHT", [0.0, 0.0, 0.0, 5.0]]]
                }
            ]
        }"#;
        let policy = TabularPolicy::parse(json, "test").unwrap();
        assert_eq!(policy.tables.len(), 1);
    }

    #[test]
    fn rejects_malformed_key() {
        let json = r#"{
            "alpha": 0.1, "gamma": 0.9, "totalActions": 0, "explorationModeChanged": false,
            "entries": [{"positionKey": "nope", "valueTable": []}]
        }"#;
        let err = TabularPolicy::parse(json, "test").unwrap_err();
        assert!(matches!(err, PolicyError::InvalidKey(_)));
    }

    #[test]
    fn unseen_target_contributes_nothing_and_prefers_walkable_dot_direction() {
        let maze = toy_maze();
        let json = r#"{
            "alpha": 0.1, "gamma": 0.9, "totalActions": 0, "explorationModeChanged": false,
            "entries": [
                {"positionKey": "3,1", "valueTable": [["1,1,RIGHT", [-1.0, -1.0, -1.0, 10.0]]]}
            ]
        }"#;
        let policy = TabularPolicy::parse(json, "test").unwrap();
        let dots: HashSet<Position> = [Position::new(3, 1)].into_iter().collect();
        let pellets = HashSet::new();
        let ghosts = Vec::new();
        let obs = Observation {
            pacman_position: Position::new(1, 1),
            pacman_facing: Direction::Right,
            dots: &dots,
            power_pellets: &pellets,
            ghosts: &ghosts,
            mode: GameMode::Chase,
            frightened_remaining_ms: None,
        };
        let direction = policy.select_action(&maze, &obs);
        assert_eq!(direction, Direction::Right);
    }
}
