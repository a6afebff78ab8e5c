//! Wraps the three brains and picks one direction for Pac-Man each tick.
//!
//! One `tick` entry point fans into per-state behavior in priority order:
//! the tabular policy first when loaded and selected, then the hunter brain
//! during a power-pellet phase with enough time left to be worth committing
//! to a chase, then the defensive brain as the default.
use pacman_common::{Direction, GameMode, Position};

use crate::brains::{defensive::DefensiveBrain, hunter::HunterBrain, tabular::TabularPolicy};
use crate::maze::Maze;
use crate::observation::Observation;

/// Hunter brain only takes over with at least this much frightened time left;
/// below this threshold there isn't enough runway to commit to a chase.
const HUNTER_MIN_REMAINING_MS: u64 = 1000;

pub struct PacmanController {
    defensive: DefensiveBrain,
    hunter: HunterBrain,
    tabular: Option<TabularPolicy>,
    use_tabular: bool,
}

impl PacmanController {
    pub fn new(search_depth: u8) -> Self {
        PacmanController {
            defensive: DefensiveBrain::new(search_depth),
            hunter: HunterBrain::new(),
            tabular: None,
            use_tabular: false,
        }
    }

    /// Installs (or replaces) the tabular policy and selects it for this
    /// controller. Rooms start without one and "upgrade" once the model
    /// file finishes loading, without ever blocking a tick.
    pub fn install_tabular_policy(&mut self, policy: TabularPolicy) {
        self.tabular = Some(policy);
        self.use_tabular = true;
    }

    pub fn has_tabular_policy(&self) -> bool {
        self.tabular.is_some()
    }

    pub fn set_search_depth(&mut self, depth: u8) {
        self.defensive.set_search_depth(depth);
    }

    pub fn search_depth(&self) -> u8 {
        self.defensive.search_depth()
    }

    pub fn decide(
        &self,
        maze: &Maze,
        obs: &Observation,
        ghost_house: Position,
        initial_food_count: usize,
    ) -> Direction {
        if self.use_tabular {
            if let Some(policy) = &self.tabular {
                return policy.select_action(maze, obs);
            }
        }

        if obs.mode == GameMode::Frightened {
            if let Some(remaining) = obs.frightened_remaining_ms {
                if remaining > HUNTER_MIN_REMAINING_MS {
                    return self.hunter.decide(maze, obs, ghost_house);
                }
            }
        }

        self.defensive
            .find_best_direction(maze, obs, initial_food_count)
    }
}
