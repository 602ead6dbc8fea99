//! Phase consistency invariant.

use super::super::rules;
use super::super::{TurnController, TurnPhase};
use super::Invariant;

/// Invariant: the side on turn has a legal move, and a terminal game has
/// none for either side with the outcome matching the disc majority.
pub struct PhaseConsistentInvariant;

impl Invariant<TurnController> for PhaseConsistentInvariant {
    fn holds(controller: &TurnController) -> bool {
        let board = controller.board();
        match controller.phase() {
            TurnPhase::AwaitingMove(color) => !rules::legal_moves(board, color).is_empty(),
            TurnPhase::Terminal(outcome) => {
                rules::legal_moves(board, crate::Color::Black).is_empty()
                    && rules::legal_moves(board, crate::Color::White).is_empty()
                    && rules::outcome(board) == outcome
            }
        }
    }

    fn description() -> &'static str {
        "Side on turn can move; terminal games are fully blocked"
    }
}
