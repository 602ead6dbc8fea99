//! Plain-text renderer for [`GameEvent`]s.

use crate::orchestrator::GameEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Text shown for an event.
pub fn render(event: &GameEvent) -> String {
    match event {
        GameEvent::BoardChanged { board, score, to_move } => {
            let turn = match to_move {
                Some(color) => format!("{} to move", color.name()),
                None => "Game over".to_string(),
            };
            format!("\n{}\n{} | {}", board.display(), score, turn)
        }
        GameEvent::MoveMade { player, placed, flipped } => {
            format!("{} played {} and flipped {}", player, placed, flipped)
        }
        GameEvent::Passed(color) => format!("{} has no legal move and passes", color.name()),
        GameEvent::OracleThinking => "Oracle is thinking...".to_string(),
        GameEvent::Notice(text) => text.clone(),
        GameEvent::GameOver { outcome, score, winner } => match winner {
            Some(name) => format!("Game over: {} ({}). {}", outcome, name, score),
            None => format!("Game over: {}. {}", outcome, score),
        },
    }
}

/// Prints events to stdout until every sender is dropped.
pub fn spawn_renderer(mut events: mpsc::UnboundedReceiver<GameEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            println!("{}", render(&event));
        }
    })
}
