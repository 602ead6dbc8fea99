//! Automated player backed by a move oracle.

use super::{Player, PlayerChoice};
use crate::oracle::{Consultation, DEFAULT_ORACLE_TIMEOUT, MoveOracle, choose_move, random_move};
use crate::orchestrator::GameEvent;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use strictly_othello::{Difficulty, TurnController};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Player that consults an oracle on a separate task.
pub struct OraclePlayer {
    name: String,
    oracle: Arc<dyn MoveOracle>,
    difficulty: Difficulty,
    timeout: Duration,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl OraclePlayer {
    /// Creates a new oracle player.
    pub fn new(
        name: impl Into<String>,
        oracle: Arc<dyn MoveOracle>,
        difficulty: Difficulty,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        let name = name.into();
        info!(player = %name, oracle = oracle.label(), %difficulty, "Creating oracle player");
        Self {
            name,
            oracle,
            difficulty,
            timeout: DEFAULT_ORACLE_TIMEOUT,
            events,
        }
    }

    /// Sets how long one consultation may take before a random move is played.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl Player for OraclePlayer {
    async fn choose_move(&mut self, controller: &TurnController) -> Result<PlayerChoice> {
        let color = controller
            .to_move()
            .ok_or_else(|| anyhow::anyhow!("Game is over"))?;
        let consultation = Consultation::new(controller.board().clone(), color, controller.legal_moves(), self.difficulty);
        let legal = consultation.legal.clone();

        let _ = self.events.send(GameEvent::OracleThinking);
        debug!(player = %self.name, legal = legal.len(), "Consulting oracle");

        let oracle = Arc::clone(&self.oracle);
        let limit = self.timeout;
        let task = tokio::spawn(async move { choose_move(oracle.as_ref(), &consultation, limit).await });

        let choice = match task.await {
            Ok(choice) => choice,
            Err(e) => {
                warn!(error = %e, "Oracle task failed, picking at random");
                random_move(&legal)
            }
        };

        choice
            .map(PlayerChoice::Place)
            .ok_or_else(|| anyhow::anyhow!("No legal moves for {}", color.name()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
