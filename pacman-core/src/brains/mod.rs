//! The Pac-Man decision modules: a defensive predictive-lookahead evaluator,
//! a power-pellet-phase hunter, an optional pre-trained tabular policy, and
//! the controller that picks among them each tick.

pub mod controller;
pub mod defensive;
pub mod hunter;
pub mod tabular;

pub use controller::PacmanController;
pub use defensive::DefensiveBrain;
pub use hunter::HunterBrain;
pub use tabular::TabularPolicy;
