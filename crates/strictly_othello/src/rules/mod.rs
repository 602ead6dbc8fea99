//! Move engine for Othello.
//!
//! Pure functions over a [`Board`](super::Board): legal-move enumeration,
//! flip resolution and scoring. Nothing here owns turn state; see
//! [`TurnController`](super::TurnController) for that.

pub mod flips;
pub mod legal;
pub mod score;

pub use flips::{DIRECTIONS, flips_for};
pub use legal::{apply_move, is_legal, legal_moves};
pub use score::{outcome, score};
