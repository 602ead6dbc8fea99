//! Disc count invariant: each committed move adds exactly one disc.

use super::super::TurnController;
use super::Invariant;

/// Invariant: discs on the board equal the starting discs plus one per move.
///
/// Flips only change ownership; placement is the only way a disc appears.
pub struct DiscCountInvariant;

impl Invariant<TurnController> for DiscCountInvariant {
    fn holds(controller: &TurnController) -> bool {
        controller.board().disc_count() == controller.origin().disc_count() + controller.history().len()
    }

    fn description() -> &'static str {
        "Disc count grows by exactly one per committed move"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Color, GameMode, Position};

    #[test]
    fn test_holds_through_opening() {
        let mut controller = TurnController::new(GameMode::Local);
        assert!(DiscCountInvariant::holds(&controller));
        controller
            .apply_move(Color::Black, Position::new(4, 5).unwrap())
            .unwrap();
        assert!(DiscCountInvariant::holds(&controller));
    }

    #[test]
    fn test_removed_disc_violates() {
        let mut controller = TurnController::new(GameMode::Local);
        controller
            .board_mut()
            .set(Position::new(3, 3).unwrap(), Cell::Empty);
        assert!(!DiscCountInvariant::holds(&controller));
    }
}
