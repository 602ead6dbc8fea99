//! Human player reading moves from the console.

use super::{Player, PlayerChoice};
use crate::console::{ConsoleCommand, SharedInput, parse_command};
use crate::orchestrator::GameEvent;
use anyhow::Result;
use strictly_othello::TurnController;
use tokio::sync::mpsc;
use tracing::debug;

/// Human player using typed coordinates.
pub struct HumanPlayer {
    name: String,
    input: SharedInput,
    events: mpsc::UnboundedSender<GameEvent>,
}

impl HumanPlayer {
    /// Creates a new human player.
    pub fn new(name: impl Into<String>, input: SharedInput, events: mpsc::UnboundedSender<GameEvent>) -> Self {
        Self {
            name: name.into(),
            input,
            events,
        }
    }
}

#[async_trait::async_trait]
impl Player for HumanPlayer {
    async fn choose_move(&mut self, controller: &TurnController) -> Result<PlayerChoice> {
        let color = controller.to_move().map(|c| c.name()).unwrap_or("Nobody");
        let _ = self
            .events
            .send(GameEvent::Notice(format!("{} ({}) to move", self.name, color)));

        let mut input = self.input.lock().await;
        while let Some(line) = input.recv().await {
            match parse_command(&line) {
                Ok(ConsoleCommand::Place(pos)) => {
                    debug!(player = %self.name, %pos, "Move typed");
                    return Ok(PlayerChoice::Place(pos));
                }
                Ok(ConsoleCommand::Quit) => return Ok(PlayerChoice::Quit),
                Err(e) => {
                    let _ = self.events.send(GameEvent::Notice(e.to_string()));
                }
            }
        }

        anyhow::bail!("Input closed")
    }

    fn name(&self) -> &str {
        &self.name
    }
}
