//! Player trait and implementations.

mod human;
mod oracle;

pub use human::HumanPlayer;
pub use oracle::OraclePlayer;

use anyhow::Result;
use strictly_othello::{Position, TurnController};

/// What a player decided on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerChoice {
    /// Place a disc here. Legality is checked by the orchestrator.
    Place(Position),
    /// Abandon the match.
    Quit,
}

/// Trait for players that can make moves.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Chooses a move for the side to move.
    async fn choose_move(&mut self, controller: &TurnController) -> Result<PlayerChoice>;

    /// Returns the player's display name.
    fn name(&self) -> &str;
}
