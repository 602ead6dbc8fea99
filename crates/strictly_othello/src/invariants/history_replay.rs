//! History replay invariant: the board is exactly what the history produces.

use super::super::controller::settle;
use super::super::rules;
use super::super::{TurnController, TurnPhase};
use super::Invariant;

/// Invariant: replaying the move history from the starting board, with pass
/// resolution between moves, reproduces the current board and phase.
///
/// This catches out-of-turn moves, illegal placements and partial flips.
pub struct HistoryReplayInvariant;

impl Invariant<TurnController> for HistoryReplayInvariant {
    fn holds(controller: &TurnController) -> bool {
        let mut board = controller.origin().clone();
        let (mut phase, _) = settle(&board, controller.first_to_move());

        for mov in controller.history() {
            if phase != TurnPhase::AwaitingMove(mov.color) {
                return false;
            }
            if rules::apply_move(&mut board, mov.position, mov.color).is_err() {
                return false;
            }
            phase = settle(&board, mov.color.opponent()).0;
        }

        board == *controller.board() && phase == controller.phase()
    }

    fn description() -> &'static str {
        "Replaying history reproduces the board and phase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Color, GameMode, Position};

    #[test]
    fn test_holds_after_moves() {
        let mut controller = TurnController::new(GameMode::Local);
        controller
            .apply_move(Color::Black, Position::new(5, 4).unwrap())
            .unwrap();
        controller
            .apply_move(Color::White, Position::new(5, 5).unwrap())
            .unwrap();
        assert!(HistoryReplayInvariant::holds(&controller));
    }

    #[test]
    fn test_flipped_disc_violates() {
        let mut controller = TurnController::new(GameMode::Local);
        controller
            .apply_move(Color::Black, Position::new(5, 4).unwrap())
            .unwrap();
        controller
            .board_mut()
            .set(Position::new(4, 4).unwrap(), Cell::Disc(Color::White));
        assert!(!HistoryReplayInvariant::holds(&controller));
    }
}
