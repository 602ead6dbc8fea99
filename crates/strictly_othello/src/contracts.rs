//! Contract-based validation for moves.
//!
//! Contracts formalize Hoare-style reasoning, `{P} action {Q}`: preconditions
//! are always checked, postconditions in debug builds.

use super::action::{Move, MoveError};
use super::controller::TurnController;
use super::invariants::{InvariantSet, OthelloInvariants};
use super::phases::TurnPhase;
use super::rules;
use tracing::{instrument, warn};

/// Preconditions and postconditions for a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

/// Precondition: the game is still running and `mov.color` is on turn.
pub struct ColorsTurn;

impl ColorsTurn {
    /// Checks the precondition.
    #[instrument(skip(controller))]
    pub fn check(mov: &Move, controller: &TurnController) -> Result<(), MoveError> {
        match controller.phase() {
            TurnPhase::Terminal(_) => Err(MoveError::GameOver),
            TurnPhase::AwaitingMove(color) if color != mov.color => Err(MoveError::WrongTurn(mov.color)),
            TurnPhase::AwaitingMove(_) => Ok(()),
        }
    }
}

/// Precondition: the target is empty and flips at least one disc.
pub struct FlipsSomething;

impl FlipsSomething {
    /// Checks the precondition.
    #[instrument(skip(controller))]
    pub fn check(mov: &Move, controller: &TurnController) -> Result<(), MoveError> {
        let board = controller.board();
        if !board.is_empty(mov.position) {
            return Err(MoveError::Occupied(mov.position));
        }
        if rules::flips_for(board, mov.position, mov.color).is_empty() {
            return Err(MoveError::NoFlips(mov.position));
        }
        Ok(())
    }
}

/// Contract for placing a disc.
///
/// Preconditions:
/// - the game is not over and it is the mover's turn
/// - the target is empty and flips at least one disc
///
/// Postconditions:
/// - exactly one disc was added to the board
/// - every [`OthelloInvariants`] member holds
pub struct MoveContract;

impl Contract<TurnController, Move> for MoveContract {
    fn pre(controller: &TurnController, action: &Move) -> Result<(), MoveError> {
        ColorsTurn::check(action, controller)?;
        FlipsSomething::check(action, controller)?;
        Ok(())
    }

    fn post(before: &TurnController, after: &TurnController) -> Result<(), MoveError> {
        let added = after.board().disc_count() as isize - before.board().disc_count() as isize;
        if added != 1 {
            warn!(added, "Disc count did not grow by one");
            return Err(MoveError::InvariantViolation(format!(
                "Postcondition failed: disc count changed by {}",
                added
            )));
        }

        OthelloInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Invariant check failed");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, GameMode, Position};

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_pre_accepts_opening_move() {
        let controller = TurnController::new(GameMode::Local);
        assert!(MoveContract::pre(&controller, &Move::new(Color::Black, at(3, 2))).is_ok());
    }

    #[test]
    fn test_pre_checks_turn_before_cell() {
        let controller = TurnController::new(GameMode::Local);
        // Occupied and wrong color: turn is reported first.
        assert_eq!(
            MoveContract::pre(&controller, &Move::new(Color::White, at(3, 3))),
            Err(MoveError::WrongTurn(Color::White))
        );
    }

    #[test]
    fn test_post_rejects_unchanged_board() {
        let controller = TurnController::new(GameMode::Local);
        assert!(matches!(
            MoveContract::post(&controller, &controller),
            Err(MoveError::InvariantViolation(_))
        ));
    }
}
