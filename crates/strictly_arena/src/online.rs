//! Online play: console input and relay events on one turn loop.

use crate::console::{ConsoleCommand, SharedInput, parse_command};
use crate::db::{MatchResult, ResultRecorder, record_in_background};
use crate::orchestrator::GameEvent;
use crate::relay::{LocalMoveError, RelayError, RelayEvent, SessionRelay};
use crate::transport::Transport;
use anyhow::Result;
use std::sync::Arc;
use strictly_othello::{Color, MoveReport, Outcome};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Opponent name recorded when the coordinator gave none.
pub const UNKNOWN_OPPONENT: &str = "Online_Opponent";

/// How an online match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnlineEnd {
    /// Played to the end.
    Finished(Outcome),
    /// The local player quit or input closed.
    Quit,
    /// The boards diverged; the session was torn down.
    Desync(String),
    /// The coordinator went away.
    ConnectionLost(String),
}

/// Drives one online match.
pub struct OnlineMatch<T> {
    relay: SessionRelay<T>,
    input: SharedInput,
    events: mpsc::UnboundedSender<GameEvent>,
    recorder: Arc<dyn ResultRecorder>,
}

impl<T: Transport> OnlineMatch<T> {
    /// Creates a match over a connected relay.
    pub fn new(
        relay: SessionRelay<T>,
        input: SharedInput,
        events: mpsc::UnboundedSender<GameEvent>,
        recorder: Arc<dyn ResultRecorder>,
    ) -> Self {
        Self {
            relay,
            input,
            events,
            recorder,
        }
    }

    fn emit(&self, event: GameEvent) {
        if self.events.send(event).is_err() {
            debug!("Renderer gone, event dropped");
        }
    }

    fn opponent_name(&self) -> String {
        self.relay
            .controller()
            .and_then(|c| c.opponent())
            .unwrap_or(UNKNOWN_OPPONENT)
            .to_string()
    }

    /// Runs until the match ends, the player quits, or the session fails.
    ///
    /// Connection and synchronization failures are reported as an
    /// [`OnlineEnd`], never as an error.
    #[instrument(skip(self), fields(user_id = %self.relay.user_id()))]
    pub async fn run(&mut self) -> Result<OnlineEnd> {
        self.emit(GameEvent::Notice("Waiting for an opponent...".to_string()));
        let input = Arc::clone(&self.input);
        let mut input = input.lock().await;

        loop {
            tokio::select! {
                line = input.recv() => {
                    let Some(line) = line else {
                        return Ok(OnlineEnd::Quit);
                    };
                    if let Some(end) = self.handle_line(&line).await {
                        return Ok(end);
                    }
                }
                event = self.relay.next_event() => {
                    if let Some(end) = self.handle_event(event).await {
                        return Ok(end);
                    }
                }
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> Option<OnlineEnd> {
        let pos = match parse_command(line) {
            Ok(ConsoleCommand::Place(pos)) => pos,
            Ok(ConsoleCommand::Quit) => return Some(OnlineEnd::Quit),
            Err(e) => {
                self.emit(GameEvent::Notice(e.to_string()));
                return None;
            }
        };

        match self.relay.play_local(pos).await {
            Ok(report) => {
                let name = self.relay.user_id().to_string();
                self.after_move(name, report).await
            }
            Err(LocalMoveError::Transport(e)) => {
                self.emit(GameEvent::Notice(format!("Connection lost: {}", e.message)));
                Some(OnlineEnd::ConnectionLost(e.message))
            }
            Err(e) => {
                self.emit(GameEvent::Notice(e.to_string()));
                None
            }
        }
    }

    async fn handle_event(&mut self, event: Result<RelayEvent, RelayError>) -> Option<OnlineEnd> {
        match event {
            Ok(RelayEvent::Paired { color, opponent }) => {
                let against = opponent.as_deref().unwrap_or(UNKNOWN_OPPONENT);
                self.emit(GameEvent::Notice(format!("Matched against {}; you play {}", against, color.name())));
                if let Some(controller) = self.relay.controller() {
                    self.emit(GameEvent::board_of(controller));
                }
                None
            }
            Ok(RelayEvent::OpponentMoved(report)) => {
                let name = self.opponent_name();
                self.after_move(name, report).await
            }
            Err(RelayError::Desync(reason)) => {
                self.emit(GameEvent::Notice(format!("Synchronization error, match abandoned: {}", reason)));
                Some(OnlineEnd::Desync(reason))
            }
            Err(RelayError::ConnectionLost(reason)) => {
                self.emit(GameEvent::Notice(format!("Connection lost: {}", reason)));
                Some(OnlineEnd::ConnectionLost(reason))
            }
            Err(RelayError::Closed) => Some(OnlineEnd::ConnectionLost("session closed".to_string())),
        }
    }

    async fn after_move(&mut self, player: String, report: MoveReport) -> Option<OnlineEnd> {
        self.emit(GameEvent::MoveMade {
            player,
            placed: report.placed,
            flipped: report.flipped.len(),
        });
        for color in &report.passed {
            self.emit(GameEvent::Passed(*color));
        }

        let controller = self.relay.controller()?;
        self.emit(GameEvent::board_of(controller));

        if !controller.is_over() {
            return None;
        }

        let me = self.relay.user_id().to_string();
        let opponent = self.opponent_name();
        let (black, white) = match controller.local_color() {
            Some(Color::White) => (opponent, me.clone()),
            _ => (me.clone(), opponent),
        };
        let result = MatchResult::from_controller(controller, black, white, &me)?;
        let outcome = *result.outcome();

        info!(%outcome, score = %result.score(), "Online match over");
        self.emit(GameEvent::GameOver {
            outcome,
            score: *result.score(),
            winner: result.winner_name().map(str::to_string),
        });
        if let Err(e) = record_in_background(Arc::clone(&self.recorder), result).await {
            warn!(error = %e, "Recording task failed");
        }
        Some(OnlineEnd::Finished(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NullRecorder;
    use crate::transport::ChannelTransport;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn test_match_runs_after_renderer_is_gone() {
        let (client, mut server) = ChannelTransport::pair();
        let relay = SessionRelay::connect(client, "alice").await.unwrap();
        let (_typing, input) = mpsc::unbounded_channel();
        let (events, renderer) = mpsc::unbounded_channel();
        drop(renderer);

        let mut online = OnlineMatch::new(relay, Arc::new(Mutex::new(input)), events, Arc::new(NullRecorder));
        assert_eq!(server.recv_line().await.unwrap().as_deref(), Some("USER_ID alice"));
        server.send_line("START_WHITE bob").await.unwrap();
        server.send_line("MOVE 2 3").await.unwrap();
        drop(server);

        let end = online.run().await.unwrap();
        assert!(matches!(end, OnlineEnd::ConnectionLost(_)), "got {:?}", end);
        assert_eq!(online.opponent_name(), UNKNOWN_OPPONENT);
    }
}
