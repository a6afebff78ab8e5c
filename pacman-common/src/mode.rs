//! Match-wide game mode.
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Chase,
    Frightened,
    GameOver,
}

/// Who won a finished match, and why.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Ghosts,
    Pacman,
}
