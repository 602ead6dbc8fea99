//! Core domain types for Othello.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Width and height of the board.
pub const BOARD_SIZE: usize = 8;

/// Number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Disc color. Black always moves first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Color {
    /// Black (moves first).
    Black,
    /// White.
    White,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Title-case name, as shown to players.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "Black",
            Color::White => "White",
        }
    }
}

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// No disc.
    Empty,
    /// A disc of the given color.
    Disc(Color),
}

impl Cell {
    /// Numeric encoding used in prompts: 0 empty, 1 black, 2 white.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Disc(Color::Black) => 1,
            Cell::Disc(Color::White) => 2,
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Disc(Color::Black) => 'B',
            Cell::Disc(Color::White) => 'W',
        }
    }
}

/// A board coordinate: column `x` and row `y`, both in `0..8`.
///
/// Construction is checked, so a `Position` is always on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("({}, {})", x, y)]
pub struct Position {
    // Row first so the derived ordering is row-major.
    y: u8,
    x: u8,
}

impl Position {
    /// Creates a position, returning `None` when off the board.
    pub fn new(x: usize, y: usize) -> Option<Self> {
        if x < BOARD_SIZE && y < BOARD_SIZE {
            Some(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            None
        }
    }

    /// Creates a position from signed coordinates, as produced by direction walks.
    pub fn from_signed(x: i64, y: i64) -> Option<Self> {
        if x < 0 || y < 0 {
            return None;
        }
        Self::new(x as usize, y as usize)
    }

    /// Column.
    pub fn x(self) -> usize {
        self.x as usize
    }

    /// Row.
    pub fn y(self) -> usize {
        self.y as usize
    }

    /// Row-major index into the cell array.
    pub fn index(self) -> usize {
        self.y() * BOARD_SIZE + self.x()
    }

    /// Steps one cell in direction `(dx, dy)`; `None` past the edge.
    pub fn step(self, (dx, dy): (i8, i8)) -> Option<Self> {
        Self::from_signed(self.x as i64 + dx as i64, self.y as i64 + dy as i64)
    }

    /// Every position in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Position { x: x as u8, y: y as u8 }))
    }
}

/// 8x8 Othello board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order.
    cells: Vec<Cell>,
}

impl Board {
    /// Creates the standard starting position: White on (3,3) and (4,4),
    /// Black on (3,4) and (4,3).
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (x, y, color) in [
            (3, 3, Color::White),
            (4, 4, Color::White),
            (4, 3, Color::Black),
            (3, 4, Color::Black),
        ] {
            if let Some(pos) = Position::new(x, y) {
                board.set(pos, Cell::Disc(color));
            }
        }
        board
    }

    /// Creates a board with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: vec![Cell::Empty; CELL_COUNT],
        }
    }

    /// Gets the cell at `pos`.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.index()]
    }

    /// Sets the cell at `pos`.
    pub fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of discs of `color`.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Disc(color)).count()
    }

    /// Number of discs of either color.
    pub fn disc_count(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// Rows of numeric cell codes (0 empty, 1 black, 2 white).
    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(BOARD_SIZE)
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    /// Formats the board as a human-readable grid with coordinates.
    pub fn display(&self) -> String {
        let mut result = String::from("  0 1 2 3 4 5 6 7\n");
        for (y, row) in self.cells.chunks(BOARD_SIZE).enumerate() {
            result.push_str(&y.to_string());
            for cell in row {
                result.push(' ');
                result.push(cell.symbol());
            }
            if y + 1 < BOARD_SIZE {
                result.push('\n');
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Error parsing a board from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum BoardParseError {
    /// A character other than `.`, `B`, `W` or whitespace.
    #[display("Unexpected character {:?} in board", _0)]
    BadSymbol(char),
    /// The text did not contain exactly 64 cells.
    #[display("Expected 64 cells, found {}", _0)]
    WrongLength(usize),
}

impl std::error::Error for BoardParseError {}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses 64 cells written as `.`, `B` and `W`; whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '.' => Ok(Cell::Empty),
                'B' | 'b' => Ok(Cell::Disc(Color::Black)),
                'W' | 'w' => Ok(Cell::Disc(Color::White)),
                other => Err(BoardParseError::BadSymbol(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        if cells.len() != CELL_COUNT {
            return Err(BoardParseError::WrongLength(cells.len()));
        }

        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_board_has_four_center_discs() {
        let board = Board::new();
        assert_eq!(board.count(Color::Black), 2);
        assert_eq!(board.count(Color::White), 2);
        assert_eq!(board.get(Position::new(3, 3).unwrap()), Cell::Disc(Color::White));
        assert_eq!(board.get(Position::new(4, 4).unwrap()), Cell::Disc(Color::White));
        assert_eq!(board.get(Position::new(3, 4).unwrap()), Cell::Disc(Color::Black));
        assert_eq!(board.get(Position::new(4, 3).unwrap()), Cell::Disc(Color::Black));
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(7, 7).is_some());
        assert!(Position::new(8, 0).is_none());
        assert!(Position::new(0, 8).is_none());
        assert!(Position::from_signed(-1, 3).is_none());
    }

    #[test]
    fn test_positions_are_row_major() {
        let all: Vec<_> = Position::all().collect();
        assert_eq!(all.len(), CELL_COUNT);
        assert_eq!(all[1], Position::new(1, 0).unwrap());
        assert_eq!(all[8], Position::new(0, 1).unwrap());
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_parse_round_trips_display_symbols() {
        let text = "
            ........
            ........
            ........
            ...WB...
            ...BW...
            ........
            ........
            ........";
        let board: Board = text.parse().expect("valid board");
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_parse_rejects_short_input() {
        assert_eq!("BW.".parse::<Board>(), Err(BoardParseError::WrongLength(3)));
    }

    #[test]
    fn test_color_wire_names() {
        assert_eq!(Color::Black.to_string(), "BLACK");
        assert_eq!("white".parse::<Color>().unwrap(), Color::White);
    }
}
