//! Directional flip scanning.

use super::super::{Board, Cell, Color, Position};

/// The eight compass directions as `(dx, dy)` steps.
pub const DIRECTIONS: [(i8, i8); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Collects the run of opposing discs that `color` would flip walking from
/// `origin` in `direction`.
///
/// A run counts only when it holds at least one opposing disc and ends on a
/// disc of `color`. Hitting an empty cell or the board edge first yields an
/// empty run.
fn run_in_direction(board: &Board, origin: Position, color: Color, direction: (i8, i8)) -> Vec<Position> {
    let opponent = Cell::Disc(color.opponent());
    let mut run = Vec::new();
    let mut cursor = origin.step(direction);

    while let Some(pos) = cursor {
        match board.get(pos) {
            cell if cell == opponent => run.push(pos),
            Cell::Disc(anchor) if anchor == color => {
                return run;
            }
            _ => break,
        }
        cursor = pos.step(direction);
    }

    Vec::new()
}

/// Every disc that placing `color` at `pos` would flip, across all directions.
///
/// Returns an empty list when `pos` is occupied, so an empty result always
/// means the placement is illegal.
pub fn flips_for(board: &Board, pos: Position, color: Color) -> Vec<Position> {
    if !board.is_empty(pos) {
        return Vec::new();
    }

    DIRECTIONS
        .iter()
        .flat_map(|&direction| run_in_direction(board, pos, color, direction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn test_opening_flip_is_single_disc() {
        let board = Board::new();
        assert_eq!(flips_for(&board, at(2, 3), Color::Black), vec![at(3, 3)]);
    }

    #[test]
    fn test_edge_without_anchor_is_not_a_run() {
        let mut board = Board::empty();
        board.set(at(1, 0), Cell::Disc(Color::White));
        board.set(at(2, 0), Cell::Disc(Color::White));
        // Walking west from (3,0) runs off the edge before any black anchor.
        assert!(flips_for(&board, at(3, 0), Color::Black).is_empty());
    }

    #[test]
    fn test_gap_interrupts_run() {
        let mut board = Board::empty();
        board.set(at(1, 0), Cell::Disc(Color::White));
        board.set(at(3, 0), Cell::Disc(Color::Black));
        assert!(flips_for(&board, at(0, 0), Color::Black).is_empty());
    }

    #[test]
    fn test_adjacent_anchor_flips_nothing() {
        let mut board = Board::empty();
        board.set(at(1, 0), Cell::Disc(Color::Black));
        assert!(flips_for(&board, at(0, 0), Color::Black).is_empty());
    }

    #[test]
    fn test_multiple_directions_combine() {
        let mut board = Board::empty();
        // East run of two, south run of one.
        board.set(at(1, 0), Cell::Disc(Color::White));
        board.set(at(2, 0), Cell::Disc(Color::White));
        board.set(at(3, 0), Cell::Disc(Color::Black));
        board.set(at(0, 1), Cell::Disc(Color::White));
        board.set(at(0, 2), Cell::Disc(Color::Black));

        let mut flips = flips_for(&board, at(0, 0), Color::Black);
        flips.sort();
        assert_eq!(flips, vec![at(1, 0), at(2, 0), at(0, 1)]);
    }

    #[test]
    fn test_occupied_target_flips_nothing() {
        let board = Board::new();
        assert!(flips_for(&board, at(3, 3), Color::Black).is_empty());
    }
}
