//! Legal-move enumeration and move application.

use super::super::action::MoveError;
use super::super::{Board, Cell, Color, Position};
use super::flips::flips_for;
use tracing::{instrument, trace};

/// Lists every legal placement for `color`, in row-major order.
///
/// An empty result means `color` must pass.
#[instrument(skip(board))]
pub fn legal_moves(board: &Board, color: Color) -> Vec<Position> {
    let moves: Vec<Position> = Position::all()
        .filter(|&pos| board.is_empty(pos) && !flips_for(board, pos, color).is_empty())
        .collect();
    trace!(count = moves.len(), "Enumerated legal moves");
    moves
}

/// Checks whether `color` may place at `pos`.
pub fn is_legal(board: &Board, pos: Position, color: Color) -> bool {
    board.is_empty(pos) && !flips_for(board, pos, color).is_empty()
}

/// Places a disc of `color` at `pos` and flips every qualifying run.
///
/// Returns the flipped positions. On error the board is left untouched:
/// a move either fully commits or not at all.
///
/// # Errors
///
/// - [`MoveError::Occupied`] if `pos` already holds a disc.
/// - [`MoveError::NoFlips`] if no direction yields a run.
#[instrument(skip(board))]
pub fn apply_move(board: &mut Board, pos: Position, color: Color) -> Result<Vec<Position>, MoveError> {
    if !board.is_empty(pos) {
        return Err(MoveError::Occupied(pos));
    }

    let flips = flips_for(board, pos, color);
    if flips.is_empty() {
        return Err(MoveError::NoFlips(pos));
    }

    for &flipped in &flips {
        board.set(flipped, Cell::Disc(color));
    }
    board.set(pos, Cell::Disc(color));

    trace!(flipped = flips.len(), "Move applied");
    Ok(flips)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_opening_moves_for_black() {
        let moves = legal_moves(&Board::new(), Color::Black);
        assert_eq!(moves, vec![at(3, 2), at(2, 3), at(5, 4), at(4, 5)]);
    }

    #[test]
    fn test_opening_moves_for_white() {
        let moves = legal_moves(&Board::new(), Color::White);
        assert_eq!(moves, vec![at(4, 2), at(5, 3), at(2, 4), at(3, 5)]);
    }

    #[test]
    fn test_apply_flips_and_places() {
        let mut board = Board::new();
        let flips = apply_move(&mut board, at(2, 3), Color::Black).unwrap();
        assert_eq!(flips, vec![at(3, 3)]);
        assert_eq!(board.get(at(2, 3)), Cell::Disc(Color::Black));
        assert_eq!(board.get(at(3, 3)), Cell::Disc(Color::Black));
        assert_eq!(board.count(Color::Black), 4);
        assert_eq!(board.count(Color::White), 1);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        let mut board = Board::new();
        let before = board.clone();
        assert_eq!(apply_move(&mut board, at(3, 3), Color::Black), Err(MoveError::Occupied(at(3, 3))));
        assert_eq!(board, before);
    }

    #[test]
    fn test_no_flip_cell_is_rejected_without_mutation() {
        let mut board = Board::new();
        let before = board.clone();
        assert_eq!(apply_move(&mut board, at(0, 0), Color::Black), Err(MoveError::NoFlips(at(0, 0))));
        assert_eq!(board, before);
    }

    #[test]
    fn test_legal_moves_are_empty_cells() {
        let mut board = Board::new();
        apply_move(&mut board, at(2, 3), Color::Black).unwrap();
        apply_move(&mut board, at(2, 2), Color::White).unwrap();
        for color in [Color::Black, Color::White] {
            for pos in legal_moves(&board, color) {
                assert!(board.is_empty(pos));
                assert!(is_legal(&board, pos, color));
            }
        }
    }
}
