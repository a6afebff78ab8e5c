//! The power-pellet-phase brain: chases the nearest frightened ghost via A*,
//! falling back to a ghost-house patrol once every ghost has been eaten or
//! has already started respawning.
use pacman_common::{Direction, Position};

use crate::maze::Maze;
use crate::observation::Observation;
use crate::pathfinder;

const ANTI_DITHER_DISTANCE_THRESHOLD: i32 = 5;
const ANTI_DITHER_SLACK: i32 = 1;

pub struct HunterBrain;

impl HunterBrain {
    pub fn new() -> Self {
        HunterBrain
    }

    pub fn decide(&self, maze: &Maze, obs: &Observation, ghost_house: Position) -> Direction {
        match obs.nearest_frightened_ghost(maze) {
            Some(ghost) => self.chase(maze, obs, ghost.position),
            None => self.patrol(maze, obs, ghost_house),
        }
    }

    fn chase(&self, maze: &Maze, obs: &Observation, target: Position) -> Direction {
        let Ok(path) = pathfinder::astar(maze, obs.pacman_position, target, &[]) else {
            return obs.pacman_facing;
        };
        let Some(best_direction) = pathfinder::first_step_direction(&path) else {
            return obs.pacman_facing;
        };

        let distance = obs.pacman_position.manhattan(target);
        if distance > ANTI_DITHER_DISTANCE_THRESHOLD {
            if let Some(current_step) = self.step(maze, obs.pacman_position, obs.pacman_facing) {
                let current_distance = current_step.manhattan(target);
                let best_distance = path.get(1).map(|p| p.manhattan(target)).unwrap_or(i32::MAX);
                if current_distance - best_distance <= ANTI_DITHER_SLACK {
                    return obs.pacman_facing;
                }
            }
        }

        best_direction
    }

    fn patrol(&self, maze: &Maze, obs: &Observation, ghost_house: Position) -> Direction {
        if obs.pacman_position == ghost_house {
            if self.step(maze, obs.pacman_position, obs.pacman_facing).is_some() {
                return obs.pacman_facing;
            }
            return maze
                .neighbors(obs.pacman_position)
                .into_iter()
                .find_map(|n| Direction::between(obs.pacman_position, n))
                .unwrap_or(obs.pacman_facing);
        }

        let Ok(path) = pathfinder::astar(maze, obs.pacman_position, ghost_house, &[]) else {
            return obs.pacman_facing;
        };
        pathfinder::first_step_direction(&path).unwrap_or(obs.pacman_facing)
    }

    fn step(&self, maze: &Maze, from: Position, direction: Direction) -> Option<Position> {
        let raw = from + direction.offset();
        if maze.is_walkable(raw) {
            Some(maze.apply_teleport(raw))
        } else {
            None
        }
    }
}

impl Default for HunterBrain {
    fn default() -> Self {
        Self::new()
    }
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
            ghost_house: Position::new(5, 1),
            blinky: Position::new(1, 1),
            pinky: Position::new(1, 1),
            inky: Position::new(1, 1),
            clyde: Position::new(1, 1),
        };
        Maze::from_layout(&["#######", "#.....#", "#######"], starting_positions).unwrap()
    }

    #[test]
    fn chases_nearest_frightened_ghost() {
        let maze = toy_maze();
        let dots = HashSet::new();
        let pellets = HashSet::new();
        let ghosts = vec![GhostObservation {
            position: Position::new(4, 1),
            direction: Direction::Left,
            frightened: true,
        }];
        let obs = Observation {
            pacman_position: Position::new(1, 1),
            pacman_facing: Direction::Right,
            dots: &dots,
            power_pellets: &pellets,
            ghosts: &ghosts,
            mode: GameMode::Frightened,
            frightened_remaining_ms: Some(5000),
        };
        let hunter = HunterBrain::new();
        let direction = hunter.decide(&maze, &obs, Position::new(5, 1));
        assert_eq!(direction, Direction::Right);
    }

    #[test]
    fn patrols_ghost_house_when_no_targets_remain() {
        let maze = toy_maze();
        let dots = HashSet::new();
        let pellets = HashSet::new();
        let ghosts: Vec<GhostObservation> = Vec::new();
        let obs = Observation {
            pacman_position: Position::new(1, 1),
            pacman_facing: Direction::Right,
            dots: &dots,
            power_pellets: &pellets,
            ghosts: &ghosts,
            mode: GameMode::Frightened,
            frightened_remaining_ms: Some(5000),
        };
        let hunter = HunterBrain::new();
        let direction = hunter.decide(&maze, &obs, Position::new(5, 1));
        assert_eq!(direction, Direction::Right);
    }
}
