//! Game modes and oracle difficulty.

use serde::{Deserialize, Serialize};

/// Who supplies moves. Affects turn gating only, never the board rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameMode {
    /// Two players at one console.
    Local,
    /// One local player against a remote peer.
    Online,
    /// One local player against the move oracle.
    AgainstOracle,
}

/// How hard the automated player tries.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random legal moves; the oracle is never consulted.
    Easy,
    /// Oracle asked to favour moves that flip many discs.
    #[default]
    Medium,
    /// Oracle asked to play like an expert: corners and stable discs.
    Hard,
}

impl Difficulty {
    /// Whether this tier consults the oracle at all.
    pub fn consults_oracle(self) -> bool {
        !matches!(self, Difficulty::Easy)
    }
}
