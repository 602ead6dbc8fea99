//! Turn phases and final outcomes.

use super::Color;
use serde::{Deserialize, Serialize};

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The color holding strictly more discs.
    Winner(Color),
    /// Equal disc counts.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Winner(color) => Some(*color),
            Outcome::Draw => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(color) => write!(f, "{} wins", color.name()),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Observable state of the turn machine between moves.
///
/// Passing is transient: a side with no legal move is skipped while the
/// controller resolves, and the skip is reported on the resulting
/// [`MoveReport`](super::MoveReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for `Color` to place a disc; it has at least one legal move.
    AwaitingMove(Color),
    /// Neither side can move. Absorbing.
    Terminal(Outcome),
}

/// Disc counts for both colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("Black {} - White {}", black, white)]
pub struct Score {
    /// Black discs.
    pub black: usize,
    /// White discs.
    pub white: usize,
}
