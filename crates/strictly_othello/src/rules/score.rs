//! Scoring and final outcome.

use super::super::phases::Outcome;
use super::super::{Board, Color};

/// Number of cells holding `color`.
pub fn score(board: &Board, color: Color) -> usize {
    board.count(color)
}

/// Outcome by disc majority; equal counts are a draw.
pub fn outcome(board: &Board) -> Outcome {
    let black = score(board, Color::Black);
    let white = score(board, Color::White);
    match black.cmp(&white) {
        std::cmp::Ordering::Greater => Outcome::Winner(Color::Black),
        std::cmp::Ordering::Less => Outcome::Winner(Color::White),
        std::cmp::Ordering::Equal => Outcome::Draw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board_is_even() {
        let board = Board::new();
        assert_eq!(score(&board, Color::Black), 2);
        assert_eq!(outcome(&board), Outcome::Draw);
    }

    #[test]
    fn test_majority_wins() {
        let board: Board = "
            BBBBBBBB
            BBBBBBBB
            BBBBBBBB
            BBBBBBBB
            WWWWWWWW
            WWWWWWWW
            WWWWWWWW
            WWWWWWWB"
            .parse()
            .unwrap();
        assert_eq!(score(&board, Color::Black), 33);
        assert_eq!(outcome(&board), Outcome::Winner(Color::Black));
    }
}
