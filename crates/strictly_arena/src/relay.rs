//! Session relay: the client side of an online match.
//!
//! The relay owns one transport and the match's [`TurnController`]. Inbound
//! `MOVE` lines are applied for the opponent's color; any rejection is a
//! synchronization error that ends the session for good. Local moves are
//! validated, sent, and only then applied.

use crate::protocol::Message;
use crate::transport::{Transport, TransportError};
use derive_more::Display;
use strictly_othello::{Color, MoveError, MoveReport, Position, TurnController};
use tracing::{debug, error, info, instrument, warn};

/// Something the coordinator told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// A match started (or restarted) with this color.
    Paired {
        /// Local color.
        color: Color,
        /// Opponent's announced id.
        opponent: Option<String>,
    },
    /// The opponent's move was applied.
    OpponentMoved(MoveReport),
}

/// Why the session ended.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum RelayError {
    /// The remote sent something our board cannot accept.
    #[display("Synchronization error: {}", _0)]
    Desync(String),
    /// End-of-stream or a failed read/write.
    #[display("Connection lost: {}", _0)]
    ConnectionLost(String),
    /// The session already failed; drop the relay.
    #[display("Session closed")]
    Closed,
}

impl std::error::Error for RelayError {}

/// Why a local move was not sent.
#[derive(Debug, Clone, Display)]
pub enum LocalMoveError {
    /// No match yet.
    #[display("Waiting for an opponent")]
    NotPaired,
    /// The opponent is to move.
    #[display("Not your turn")]
    NotYourTurn,
    /// The move is illegal here.
    #[display("{}", _0)]
    Rejected(MoveError),
    /// The move could not be sent; the session is closed.
    #[display("{}", _0)]
    Transport(TransportError),
}

impl std::error::Error for LocalMoveError {}

#[derive(Debug)]
enum SessionState {
    Unpaired,
    Playing(TurnController),
    Failed,
}

/// Client end of an online session.
pub struct SessionRelay<T> {
    transport: T,
    user_id: String,
    state: SessionState,
}

impl<T: Transport> SessionRelay<T> {
    /// Announces `user_id` over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ConnectionLost`] if the announcement cannot be sent.
    #[instrument(skip(transport, user_id), fields(user_id = %user_id.as_ref()))]
    pub async fn connect(mut transport: T, user_id: impl AsRef<str>) -> Result<Self, RelayError> {
        let user_id = user_id.as_ref().to_string();
        transport
            .send(&Message::UserId(user_id.clone()))
            .await
            .map_err(|e| RelayError::ConnectionLost(e.message))?;
        info!("Announced to coordinator, waiting for pairing");
        Ok(Self {
            transport,
            user_id,
            state: SessionState::Unpaired,
        })
    }

    /// Our announced id.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The match in progress, once paired.
    pub fn controller(&self) -> Option<&TurnController> {
        match &self.state {
            SessionState::Playing(controller) => Some(controller),
            _ => None,
        }
    }

    /// Whether the session has failed and must be dropped.
    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Failed)
    }

    fn fail(&mut self, err: RelayError) -> RelayError {
        error!(error = %err, "Session torn down");
        self.state = SessionState::Failed;
        err
    }

    /// Waits for the next meaningful message and applies it.
    ///
    /// Malformed and unexpected lines are skipped. Cancel-safe: a line is
    /// either fully handled or still queued in the transport.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError`] when the session ends; after that every call
    /// returns [`RelayError::Closed`].
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn next_event(&mut self) -> Result<RelayEvent, RelayError> {
        loop {
            if self.is_closed() {
                return Err(RelayError::Closed);
            }

            let line = match self.transport.recv_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    return Err(self.fail(RelayError::ConnectionLost("coordinator closed the connection".to_string())));
                }
                Err(e) => return Err(self.fail(RelayError::ConnectionLost(e.message))),
            };

            let message = match line.parse::<Message>() {
                Ok(message) => message,
                Err(e) => {
                    warn!(line = %line, error = %e, "Malformed line ignored");
                    continue;
                }
            };

            match message {
                Message::Start { color, opponent } => {
                    let opponent = (!opponent.is_empty()).then_some(opponent);
                    info!(color = %color, opponent = ?opponent, "Paired");
                    self.state = SessionState::Playing(TurnController::online(color, opponent.clone()));
                    return Ok(RelayEvent::Paired { color, opponent });
                }
                Message::Move(pos) => return self.apply_remote(pos),
                Message::UserId(id) => {
                    warn!(id = %id, "Unexpected USER_ID from coordinator ignored");
                }
            }
        }
    }

    fn apply_remote(&mut self, pos: Position) -> Result<RelayEvent, RelayError> {
        let result = match &mut self.state {
            SessionState::Playing(controller) => match controller.local_color().map(Color::opponent) {
                Some(remote) => controller
                    .apply_move(remote, pos)
                    .map_err(|e| RelayError::Desync(format!("opponent move {} rejected: {}", pos, e))),
                None => Err(RelayError::Desync("no local color assigned".to_string())),
            },
            SessionState::Unpaired => Err(RelayError::Desync(format!("move {} received before pairing", pos))),
            SessionState::Failed => Err(RelayError::Closed),
        };

        match result {
            Ok(report) => {
                debug!(placed = %report.placed, "Opponent move applied");
                Ok(RelayEvent::OpponentMoved(report))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Plays a move for the local color: validate, send, then apply.
    ///
    /// # Errors
    ///
    /// Returns [`LocalMoveError`] if there is no match, it is not our turn,
    /// the move is illegal, or sending fails (which closes the session).
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn play_local(&mut self, pos: Position) -> Result<MoveReport, LocalMoveError> {
        let SessionState::Playing(controller) = &mut self.state else {
            return Err(LocalMoveError::NotPaired);
        };

        if controller.is_over() {
            return Err(LocalMoveError::Rejected(MoveError::GameOver));
        }
        if !controller.accepts_local_input() {
            return Err(LocalMoveError::NotYourTurn);
        }
        let color = controller.local_color().ok_or(LocalMoveError::NotPaired)?;
        controller.check_move(color, pos).map_err(LocalMoveError::Rejected)?;

        if let Err(e) = self.transport.send(&Message::Move(pos)).await {
            self.fail(RelayError::ConnectionLost(e.message.clone()));
            return Err(LocalMoveError::Transport(e));
        }

        let SessionState::Playing(controller) = &mut self.state else {
            return Err(LocalMoveError::NotPaired);
        };
        controller.apply_move(color, pos).map_err(LocalMoveError::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;

    fn at(x: usize, y: usize) -> Position {
        Position::new(x, y).unwrap()
    }

    #[tokio::test]
    async fn test_connect_announces_user_id() {
        let (client, mut server) = ChannelTransport::pair();
        let relay = SessionRelay::connect(client, "alice").await.unwrap();
        assert_eq!(relay.user_id(), "alice");
        assert_eq!(server.recv_line().await.unwrap().as_deref(), Some("USER_ID alice"));
        assert!(relay.controller().is_none());
    }

    #[tokio::test]
    async fn test_move_before_pairing_is_desync() {
        let (client, mut server) = ChannelTransport::pair();
        let mut relay = SessionRelay::connect(client, "alice").await.unwrap();
        server.send_line("MOVE 2 3").await.unwrap();

        assert!(matches!(relay.next_event().await, Err(RelayError::Desync(_))));
        assert!(relay.is_closed());
        assert_eq!(relay.next_event().await, Err(RelayError::Closed));
    }

    #[tokio::test]
    async fn test_local_move_sent_before_applied() {
        let (client, mut server) = ChannelTransport::pair();
        let mut relay = SessionRelay::connect(client, "alice").await.unwrap();
        let _ = server.recv_line().await;

        server.send_line("START_BLACK bob").await.unwrap();
        relay.next_event().await.unwrap();

        let report = relay.play_local(at(2, 3)).await.unwrap();
        assert_eq!(report.flipped, vec![at(3, 3)]);
        assert_eq!(server.recv_line().await.unwrap().as_deref(), Some("MOVE 2 3"));
        assert!(matches!(
            relay.play_local(at(2, 2)).await,
            Err(LocalMoveError::NotYourTurn)
        ));
    }
}
