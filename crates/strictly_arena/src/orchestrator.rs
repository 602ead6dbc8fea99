//! Game orchestration between players at one console.

use crate::db::{MatchResult, ResultRecorder, record_in_background};
use crate::players::{Player, PlayerChoice};
use anyhow::Result;
use std::sync::Arc;
use strictly_othello::{Board, Color, Move, Outcome, Score, TurnController};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Messages sent from the match loop to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// Board state updated.
    BoardChanged {
        /// Current board.
        board: Board,
        /// Disc counts.
        score: Score,
        /// Side to move, if any.
        to_move: Option<Color>,
    },
    /// A move was committed.
    MoveMade {
        /// Who made it.
        player: String,
        /// The move.
        placed: Move,
        /// Number of discs flipped.
        flipped: usize,
    },
    /// A color had no legal move and was skipped.
    Passed(Color),
    /// The oracle is choosing a move.
    OracleThinking,
    /// Something the person at the console should read.
    Notice(String),
    /// The match ended.
    GameOver {
        /// Final outcome.
        outcome: Outcome,
        /// Final disc counts.
        score: Score,
        /// Winner's display name.
        winner: Option<String>,
    },
}

impl GameEvent {
    /// Board snapshot event for `controller`.
    pub fn board_of(controller: &TurnController) -> Self {
        GameEvent::BoardChanged {
            board: controller.board().clone(),
            score: controller.scores(),
            to_move: controller.to_move(),
        }
    }
}

/// Orchestrates a local or oracle match between two players.
pub struct Orchestrator {
    controller: TurnController,
    black: Box<dyn Player>,
    white: Box<dyn Player>,
    events: mpsc::UnboundedSender<GameEvent>,
    recorder: Arc<dyn ResultRecorder>,
    user_id: String,
}

impl Orchestrator {
    /// Creates a new orchestrator.
    pub fn new(
        controller: TurnController,
        black: Box<dyn Player>,
        white: Box<dyn Player>,
        events: mpsc::UnboundedSender<GameEvent>,
        recorder: Arc<dyn ResultRecorder>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            black,
            white,
            events,
            recorder,
            user_id: user_id.into(),
        }
    }

    /// The match state.
    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            debug!("Renderer gone, event dropped");
        }
    }

    /// Runs the match to the end.
    ///
    /// Returns the outcome, or `None` if a player quit. Finished matches are
    /// recorded before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if a player cannot produce a move (closed input).
    #[instrument(skip(self), fields(mode = %self.controller.mode(), black = %self.black.name(), white = %self.white.name()))]
    pub async fn run(&mut self) -> Result<Option<Outcome>> {
        info!("Starting match");
        self.emit(GameEvent::board_of(&self.controller));
        for color in self.controller.last_passes().to_vec() {
            self.emit(GameEvent::Passed(color));
        }

        while let Some(color) = self.controller.to_move() {
            let player = match color {
                Color::Black => &mut self.black,
                Color::White => &mut self.white,
            };
            let player_name = player.name().to_string();

            debug!(player = %player_name, "Waiting for move");
            let choice = player.choose_move(&self.controller).await?;
            let pos = match choice {
                PlayerChoice::Place(pos) => pos,
                PlayerChoice::Quit => {
                    info!(player = %player_name, "Player quit");
                    self.emit(GameEvent::Notice(format!("{} left the match", player_name)));
                    return Ok(None);
                }
            };

            match self.controller.apply_move(color, pos) {
                Ok(report) => {
                    self.emit(GameEvent::MoveMade {
                        player: player_name,
                        placed: report.placed,
                        flipped: report.flipped.len(),
                    });
                    for passed in report.passed {
                        self.emit(GameEvent::Passed(passed));
                    }
                    self.emit(GameEvent::board_of(&self.controller));
                }
                Err(e) => {
                    warn!(player = %player_name, %pos, error = %e, "Move rejected");
                    self.emit(GameEvent::Notice(format!("{}: {}", pos, e)));
                }
            }
        }

        self.finish().await
    }

    async fn finish(&mut self) -> Result<Option<Outcome>> {
        let Some(result) = MatchResult::from_controller(
            &self.controller,
            self.black.name(),
            self.white.name(),
            &self.user_id,
        ) else {
            return Ok(None);
        };

        let outcome = *result.outcome();
        info!(%outcome, score = %result.score(), "Match over");
        self.emit(GameEvent::GameOver {
            outcome,
            score: *result.score(),
            winner: result.winner_name().map(str::to_string),
        });

        if let Err(e) = record_in_background(Arc::clone(&self.recorder), result).await {
            warn!(error = %e, "Recording task failed");
        }
        Ok(Some(outcome))
    }
}
