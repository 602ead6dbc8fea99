//! First-class move type and rule errors.
//!
//! Moves are domain events: a color placing a disc at a position. They can be
//! validated before application, logged, and replayed.

use super::{Color, Position};
use serde::{Deserialize, Serialize};

/// A color placing a disc at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[display("{} -> {}", color.name(), position)]
pub struct Move {
    /// The color placing the disc.
    pub color: Color,
    /// Where the disc goes.
    pub position: Position,
}

impl Move {
    /// Creates a new move.
    pub fn new(color: Color, position: Position) -> Self {
        Self { color, position }
    }
}

/// Why a move was not applied.
///
/// These are ordinary gameplay outcomes, not faults: the board is never
/// mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The target cell already holds a disc.
    #[display("Cell {} is already occupied", _0)]
    Occupied(Position),

    /// Placing at the target flips no discs in any direction.
    #[display("Placing at {} flips no discs", _0)]
    NoFlips(Position),

    /// The color is not the one to move.
    #[display("It is not {}'s turn", _0.name())]
    WrongTurn(Color),

    /// The game has reached its terminal state.
    #[display("Game is already over")]
    GameOver,

    /// A postcondition check failed.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}
