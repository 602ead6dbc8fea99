//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use strictly_othello::{Color, GameMode, Outcome, Score, TurnController};
use tracing::instrument;

use crate::db::schema;

/// User profile database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    display_name: String,
    wins: i32,
    losses: i32,
    draws: i32,
    created_at: NaiveDateTime,
}

impl User {
    /// Total recorded games.
    pub fn total_games(&self) -> i32 {
        self.wins + self.losses + self.draws
    }

    /// Win rate as a percentage (0.0 to 100.0).
    pub fn win_rate(&self) -> f64 {
        match self.total_games() {
            0 => 0.0,
            total => (self.wins as f64 / total as f64) * 100.0,
        }
    }
}

/// Insertable user model for creating new users.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    display_name: String,
}

/// A finished match as stored.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct GameRecord {
    id: i32,
    black_player: String,
    white_player: String,
    winner: Option<String>,
    black_score: i32,
    white_score: i32,
    mode: String,
    moves: i32,
    played_at: NaiveDateTime,
}

/// Insertable match record.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct NewGameRecord {
    black_player: String,
    white_player: String,
    winner: Option<String>,
    black_score: i32,
    white_score: i32,
    mode: String,
    moves: i32,
}

/// A finished match, ready to be recorded.
///
/// `local_player` and `local_color` identify the profile whose
/// win/loss/draw totals move; Local matches have neither.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct MatchResult {
    mode: GameMode,
    black_player: String,
    white_player: String,
    outcome: Outcome,
    score: Score,
    moves: usize,
    local_player: Option<String>,
    local_color: Option<Color>,
}

impl MatchResult {
    /// Captures the result of a finished match.
    ///
    /// Returns `None` while the match is still running.
    #[instrument(skip(controller, black_player, white_player, user_id))]
    pub fn from_controller(
        controller: &TurnController,
        black_player: impl Into<String>,
        white_player: impl Into<String>,
        user_id: &str,
    ) -> Option<Self> {
        let outcome = controller.outcome()?;
        let local_color = match controller.mode() {
            GameMode::Local => None,
            GameMode::Online | GameMode::AgainstOracle => controller.local_color(),
        };
        Some(Self {
            mode: controller.mode(),
            black_player: black_player.into(),
            white_player: white_player.into(),
            outcome,
            score: controller.scores(),
            moves: controller.history().len(),
            local_player: local_color.map(|_| user_id.to_string()),
            local_color,
        })
    }

    /// Display name of the winner, if any.
    pub fn winner_name(&self) -> Option<&str> {
        match self.outcome.winner()? {
            Color::Black => Some(self.black_player.as_str()),
            Color::White => Some(self.white_player.as_str()),
        }
    }

    /// Outcome from the local profile's point of view.
    pub fn local_outcome(&self) -> Option<GameOutcome> {
        let color = self.local_color?;
        Some(match self.outcome {
            Outcome::Draw => GameOutcome::Draw,
            Outcome::Winner(winner) if winner == color => GameOutcome::Win,
            Outcome::Winner(_) => GameOutcome::Loss,
        })
    }

    /// Converts to the insertable row.
    pub fn to_new_record(&self) -> NewGameRecord {
        NewGameRecord::new(
            self.black_player.clone(),
            self.white_player.clone(),
            self.winner_name().map(str::to_string),
            self.score.black as i32,
            self.score.white as i32,
            self.mode.to_string(),
            self.moves as i32,
        )
    }
}

/// Game outcome from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GameOutcome {
    /// User won the game.
    Win,
    /// User lost the game.
    Loss,
    /// Game ended in a draw.
    Draw,
}
