//! Turn controller: owns whose turn it is and drives the move engine.
//!
//! The controller is the single writer of a match's [`Board`]. Every mutation
//! goes through [`TurnController::apply_move`], which either commits a move
//! completely (placement, flips, turn hand-off, pass resolution) or returns a
//! [`MoveError`] and leaves everything untouched.

use super::action::{Move, MoveError};
use super::contracts::{Contract, MoveContract};
use super::mode::GameMode;
use super::phases::{Outcome, Score, TurnPhase};
use super::rules;
use super::{Board, Color, Position};
use tracing::{debug, info, instrument};

/// What happened when a move was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// The move that was applied.
    pub placed: Move,
    /// Discs that changed color.
    pub flipped: Vec<Position>,
    /// Colors skipped because they had no legal move, in order.
    pub passed: Vec<Color>,
    /// Phase after resolution.
    pub phase: TurnPhase,
}

/// Resolves the phase for `color` to move on `board`, skipping sides with no
/// legal move. Returns the phase and the colors that passed.
pub(crate) fn settle(board: &Board, color: Color) -> (TurnPhase, Vec<Color>) {
    if !rules::legal_moves(board, color).is_empty() {
        return (TurnPhase::AwaitingMove(color), Vec::new());
    }

    let other = color.opponent();
    if !rules::legal_moves(board, other).is_empty() {
        return (TurnPhase::AwaitingMove(other), vec![color]);
    }

    (TurnPhase::Terminal(rules::outcome(board)), vec![color, other])
}

/// Turn state for one match.
#[derive(Debug, Clone)]
pub struct TurnController {
    origin: Board,
    first: Color,
    board: Board,
    phase: TurnPhase,
    mode: GameMode,
    local_color: Option<Color>,
    opponent: Option<String>,
    history: Vec<Move>,
    last_passes: Vec<Color>,
}

impl TurnController {
    /// Starts a match from the standard opening, Black to move.
    #[instrument]
    pub fn new(mode: GameMode) -> Self {
        Self::with_board(Board::new(), Color::Black, mode)
    }

    /// Starts an online match with the color assigned by the coordinator.
    #[instrument]
    pub fn online(local_color: Color, opponent: Option<String>) -> Self {
        let mut controller = Self::new(GameMode::Online);
        controller.local_color = Some(local_color);
        controller.opponent = opponent;
        controller
    }

    /// Starts a match against the oracle; the oracle plays the other color.
    #[instrument]
    pub fn against_oracle(human_color: Color) -> Self {
        let mut controller = Self::new(GameMode::AgainstOracle);
        controller.local_color = Some(human_color);
        controller
    }

    /// Starts from an arbitrary position with `to_move` on turn.
    ///
    /// Passes are resolved immediately, so the result may already be
    /// terminal; [`last_passes`](Self::last_passes) reports any skips.
    #[instrument(skip(board))]
    pub fn with_board(board: Board, to_move: Color, mode: GameMode) -> Self {
        let (phase, passed) = settle(&board, to_move);
        debug!(phase = ?phase, passed = ?passed, "Controller initialized");
        Self {
            origin: board.clone(),
            first: to_move,
            board,
            phase,
            mode,
            local_color: None,
            opponent: None,
            history: Vec::new(),
            last_passes: passed,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the current phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Returns the color to move, or `None` once terminal.
    pub fn to_move(&self) -> Option<Color> {
        match self.phase {
            TurnPhase::AwaitingMove(color) => Some(color),
            TurnPhase::Terminal(_) => None,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::Terminal(_))
    }

    /// Final outcome, once terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            TurnPhase::Terminal(outcome) => Some(outcome),
            TurnPhase::AwaitingMove(_) => None,
        }
    }

    /// Returns the game mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Color played at this console (online and oracle modes).
    pub fn local_color(&self) -> Option<Color> {
        self.local_color
    }

    /// Opponent identity announced by the coordinator (online mode).
    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }

    /// Color played by the oracle (oracle mode only).
    pub fn oracle_color(&self) -> Option<Color> {
        match self.mode {
            GameMode::AgainstOracle => self.local_color.map(Color::opponent),
            _ => None,
        }
    }

    /// Committed moves, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Colors that passed while resolving the most recent transition.
    pub fn last_passes(&self) -> &[Color] {
        &self.last_passes
    }

    /// Legal moves for the side to move; empty once terminal.
    pub fn legal_moves(&self) -> Vec<Position> {
        match self.phase {
            TurnPhase::AwaitingMove(color) => rules::legal_moves(&self.board, color),
            TurnPhase::Terminal(_) => Vec::new(),
        }
    }

    /// Disc count for `color`.
    pub fn score(&self, color: Color) -> usize {
        rules::score(&self.board, color)
    }

    /// Disc counts for both colors.
    pub fn scores(&self) -> Score {
        Score {
            black: self.score(Color::Black),
            white: self.score(Color::White),
        }
    }

    /// Turn gating for input typed at this console.
    ///
    /// Local mode accepts input for whichever side is to move. Online and
    /// oracle modes accept it only when the local color is to move.
    pub fn accepts_local_input(&self) -> bool {
        match (self.mode, self.to_move()) {
            (_, None) => false,
            (GameMode::Local, Some(_)) => true,
            (GameMode::Online | GameMode::AgainstOracle, Some(color)) => self.local_color == Some(color),
        }
    }

    /// Validates a move without applying it.
    ///
    /// # Errors
    ///
    /// Returns the [`MoveError`] that [`apply_move`](Self::apply_move) would.
    pub fn check_move(&self, color: Color, pos: Position) -> Result<(), MoveError> {
        MoveContract::pre(self, &Move::new(color, pos))
    }

    /// Applies a move for `color`, flips discs, hands the turn over and
    /// resolves passes.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] without mutating anything if the game is over,
    /// it is not `color`'s turn, or the placement is illegal.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn apply_move(&mut self, color: Color, pos: Position) -> Result<MoveReport, MoveError> {
        let action = Move::new(color, pos);
        MoveContract::pre(self, &action)?;

        let mut next = self.clone();
        let flipped = rules::apply_move(&mut next.board, pos, color)?;
        next.history.push(action);

        let (phase, passed) = settle(&next.board, color.opponent());
        next.phase = phase;
        next.last_passes = passed.clone();

        #[cfg(debug_assertions)]
        MoveContract::post(self, &next)?;

        *self = next;

        info!(
            placed = %action,
            flipped = flipped.len(),
            passed = ?passed,
            phase = ?phase,
            score = %self.scores(),
            "Move committed"
        );

        Ok(MoveReport {
            placed: action,
            flipped,
            passed,
            phase,
        })
    }

    /// Board the match started from.
    pub(crate) fn origin(&self) -> &Board {
        &self.origin
    }

    /// Color that was on turn at the start.
    pub(crate) fn first_to_move(&self) -> Color {
        self.first
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_black_moves_first() {
        let controller = TurnController::new(GameMode::Local);
        assert_eq!(controller.phase(), TurnPhase::AwaitingMove(Color::Black));
        assert_eq!(controller.legal_moves().len(), 4);
    }

    #[test]
    fn test_move_hands_turn_over() {
        let mut controller = TurnController::new(GameMode::Local);
        let report = controller.apply_move(Color::Black, at(2, 3)).unwrap();
        assert_eq!(report.flipped, vec![at(3, 3)]);
        assert!(report.passed.is_empty());
        assert_eq!(controller.to_move(), Some(Color::White));
        assert_eq!(controller.scores(), Score { black: 4, white: 1 });
    }

    #[test]
    fn test_wrong_turn_rejected_without_mutation() {
        let mut controller = TurnController::new(GameMode::Local);
        let board = controller.board().clone();
        assert_eq!(
            controller.apply_move(Color::White, at(4, 2)),
            Err(MoveError::WrongTurn(Color::White))
        );
        assert_eq!(controller.board(), &board);
        assert_eq!(controller.to_move(), Some(Color::Black));
        assert!(controller.history().is_empty());
    }

    #[test]
    fn test_online_gating_follows_local_color() {
        let controller = TurnController::online(Color::White, Some("bob".to_string()));
        assert!(!controller.accepts_local_input());
        assert_eq!(controller.opponent(), Some("bob"));

        let controller = TurnController::online(Color::Black, None);
        assert!(controller.accepts_local_input());
    }

    #[test]
    fn test_oracle_plays_other_color() {
        let controller = TurnController::against_oracle(Color::Black);
        assert_eq!(controller.oracle_color(), Some(Color::White));
        assert!(controller.accepts_local_input());
        assert_eq!(TurnController::new(GameMode::Local).oracle_color(), None);
    }

    #[test]
    fn test_pass_skips_blocked_side() {
        // White to move has nothing; Black can still capture at (2,0).
        let mut board = Board::empty();
        board.set(at(0, 0), Cell::Disc(Color::Black));
        board.set(at(1, 0), Cell::Disc(Color::White));
        let controller = TurnController::with_board(board, Color::White, GameMode::Local);
        assert_eq!(controller.phase(), TurnPhase::AwaitingMove(Color::Black));
        assert_eq!(controller.last_passes(), &[Color::White]);
    }

    #[test]
    fn test_terminal_is_absorbing() {
        let mut board = Board::empty();
        board.set(at(0, 0), Cell::Disc(Color::Black));
        board.set(at(7, 7), Cell::Disc(Color::White));
        let mut controller = TurnController::with_board(board, Color::Black, GameMode::Local);
        assert_eq!(controller.phase(), TurnPhase::Terminal(Outcome::Draw));
        assert!(!controller.accepts_local_input());
        assert!(controller.legal_moves().is_empty());
        assert_eq!(controller.apply_move(Color::Black, at(3, 3)), Err(MoveError::GameOver));
    }
}
