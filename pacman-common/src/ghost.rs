//! Ghost identities. Each identity names the slot a human player occupies,
//! rather than an AI-controlled entity.
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum GhostIdentity {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostIdentity {
    pub const ALL: [GhostIdentity; 4] = [
        GhostIdentity::Blinky,
        GhostIdentity::Pinky,
        GhostIdentity::Inky,
        GhostIdentity::Clyde,
    ];
}

/// Lifecycle state of a ghost player within a match.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Active,
    Frightened,
    Respawning,
}
