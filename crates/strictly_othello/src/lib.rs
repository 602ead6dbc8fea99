//! Strictly Othello - pure game logic for 8x8 Othello
//!
//! This crate holds everything about the board and nothing about the network
//! or the console. Front ends drive a match exclusively through
//! [`TurnController`].
//!
//! # Architecture
//!
//! - **Types**: [`Board`], [`Cell`], [`Color`], [`Position`]
//! - **Rules**: flip detection, legal-move enumeration, scoring
//! - **Controller**: turn hand-off, pass resolution, terminal detection
//! - **Contracts**: move preconditions and postconditions
//! - **Invariants**: properties checked after every move in debug builds
//!
//! # Example
//!
//! ```
//! use strictly_othello::{Color, GameMode, Position, TurnController};
//!
//! let mut controller = TurnController::new(GameMode::Local);
//! let pos = Position::new(2, 3).unwrap();
//! let report = controller.apply_move(Color::Black, pos).unwrap();
//! assert_eq!(report.flipped.len(), 1);
//! assert_eq!(controller.to_move(), Some(Color::White));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
mod controller;
pub mod invariants;
mod mode;
mod phases;
pub mod rules;
mod types;

// Crate-level exports - Domain types
pub use types::{BOARD_SIZE, Board, BoardParseError, CELL_COUNT, Cell, Color, Position};

// Crate-level exports - Moves and errors
pub use action::{Move, MoveError};

// Crate-level exports - Phases
pub use phases::{Outcome, Score, TurnPhase};

// Crate-level exports - Modes
pub use mode::{Difficulty, GameMode};

// Crate-level exports - Turn controller
pub use controller::{MoveReport, TurnController};

// Crate-level exports - Contracts
pub use contracts::{ColorsTurn, Contract, FlipsSomething, MoveContract};

// Crate-level exports - Invariants
pub use invariants::{Invariant, InvariantSet, InvariantViolation, OthelloInvariants};
