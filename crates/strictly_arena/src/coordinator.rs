//! Match coordinator: pairs connections, assigns colors, relays moves.
//!
//! A connection enters the waiting list with its first line, normally its
//! `USER_ID`, so both `START_<COLOR>` lines carry the opponent's id. The
//! coordinator never checks legality. It forwards every `MOVE` line from one
//! peer to the other and leaves rule enforcement to the clients.

use crate::protocol::Message;
use crate::transport::{InboundLine, TransportError, read_inbound_line};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use strictly_othello::Color;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, mpsc};
use tracing::{debug, info, instrument, warn};

/// Identifier the coordinator assigns to each accepted connection.
pub type ConnectionId = u64;

/// One live connection as seen by the lobby.
#[derive(Debug)]
struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    hangup: Arc<Notify>,
    user_id: Option<String>,
    entered: bool,
}

/// Waiting list and active pairs, guarded by a single lock.
///
/// All methods are synchronous and never await, so the lock is never held
/// across a suspension point.
#[derive(Debug, Default)]
pub(crate) struct Lobby {
    next_id: ConnectionId,
    connections: HashMap<ConnectionId, Connection>,
    waiting: VecDeque<ConnectionId>,
    peers: HashMap<ConnectionId, ConnectionId>,
}

impl Lobby {
    /// Registers an accepted connection. It waits for pairing only after
    /// [`enter`](Self::enter).
    ///
    /// Returns the new id and the hang-up signal for its read loop.
    #[instrument(skip(self, outbound))]
    pub(crate) fn join(&mut self, outbound: mpsc::UnboundedSender<String>) -> (ConnectionId, Arc<Notify>) {
        let id = self.next_id;
        self.next_id += 1;

        let hangup = Arc::new(Notify::new());
        self.connections.insert(
            id,
            Connection {
                outbound,
                hangup: Arc::clone(&hangup),
                user_id: None,
                entered: false,
            },
        );
        debug!(connection = id, "Connection registered");
        (id, hangup)
    }

    /// Puts a connection on the waiting list under `user_id` and pairs it
    /// if someone is already waiting. Entering twice is a no-op.
    #[instrument(skip(self))]
    pub(crate) fn enter(&mut self, id: ConnectionId, user_id: Option<String>) {
        let Some(connection) = self.connections.get_mut(&id) else {
            return;
        };
        if connection.entered {
            debug!(connection = id, "Already in the lobby");
            return;
        }
        connection.entered = true;
        connection.user_id = user_id;
        self.waiting.push_back(id);
        debug!(connection = id, waiting = self.waiting.len(), "Connection waiting for an opponent");

        self.pair_waiting();
    }

    /// Pairs the two longest-waiting connections, first as Black.
    fn pair_waiting(&mut self) {
        while self.waiting.len() >= 2 {
            let (Some(black), Some(white)) = (self.waiting.pop_front(), self.waiting.pop_front()) else {
                return;
            };

            self.peers.insert(black, white);
            self.peers.insert(white, black);

            let black_name = self.user_id(black);
            let white_name = self.user_id(white);
            self.deliver(
                black,
                &Message::Start {
                    color: Color::Black,
                    opponent: white_name.clone(),
                },
            );
            self.deliver(
                white,
                &Message::Start {
                    color: Color::White,
                    opponent: black_name.clone(),
                },
            );

            info!(black, white, black_name = %black_name, white_name = %white_name, "Pair formed");
        }
    }

    fn user_id(&self, id: ConnectionId) -> String {
        self.connections
            .get(&id)
            .and_then(|c| c.user_id.clone())
            .unwrap_or_default()
    }

    fn deliver(&self, id: ConnectionId, message: &Message) {
        let Some(connection) = self.connections.get(&id) else {
            return;
        };
        if connection.outbound.send(message.to_string()).is_err() {
            warn!(connection = id, "Writer gone, message dropped");
        }
    }

    /// Forwards a raw move line to the sender's peer.
    ///
    /// Returns false if the sender is not paired.
    #[instrument(skip(self, line))]
    pub(crate) fn relay(&self, from: ConnectionId, line: &str) -> bool {
        match self.peers.get(&from).and_then(|peer| self.connections.get(peer)) {
            Some(peer) => {
                if peer.outbound.send(line.to_string()).is_err() {
                    warn!(connection = from, "Peer writer gone, move dropped");
                }
                true
            }
            None => false,
        }
    }

    /// Removes a connection; if it was paired, tears the pair down and
    /// closes the peer.
    #[instrument(skip(self))]
    pub(crate) fn leave(&mut self, id: ConnectionId) {
        self.waiting.retain(|waiting| *waiting != id);
        self.connections.remove(&id);

        if let Some(peer) = self.peers.remove(&id) {
            self.peers.remove(&peer);
            if let Some(connection) = self.connections.remove(&peer) {
                // Dropping the sender ends the writer, which shuts the socket down.
                connection.hangup.notify_one();
            }
            info!(connection = id, peer, "Pair torn down");
        } else {
            debug!(connection = id, "Connection left");
        }
    }

    /// Number of connections waiting for an opponent.
    pub(crate) fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Number of active pairs.
    pub(crate) fn pair_count(&self) -> usize {
        self.peers.len() / 2
    }
}

/// TCP match coordinator.
pub struct MatchCoordinator {
    listener: TcpListener,
    lobby: Arc<Mutex<Lobby>>,
}

impl MatchCoordinator {
    /// Binds the listening socket. Port 0 picks a free port.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the address cannot be bound.
    #[instrument]
    pub async fn bind(host: &str, port: u16) -> Result<Self, TransportError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| TransportError::new(format!("Failed to bind {}:{}: {}", host, port, e)))?;
        info!("Coordinator bound");
        Ok(Self {
            listener,
            lobby: Arc::new(Mutex::new(Lobby::default())),
        })
    }

    /// Address actually bound.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(|e| TransportError::new(format!("No local address: {}", e)))
    }

    /// Accepts connections until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if accepting fails.
    #[instrument(skip(self))]
    pub async fn run(self) -> Result<(), TransportError> {
        info!(addr = ?self.listener.local_addr().ok(), "Coordinator accepting connections");
        loop {
            let (stream, addr) = self
                .listener
                .accept()
                .await
                .map_err(|e| TransportError::new(format!("Accept failed: {}", e)))?;
            debug!(%addr, "Connection accepted");

            let (outbound, outbound_rx) = mpsc::unbounded_channel();
            let (id, hangup) = lock(&self.lobby).join(outbound);
            tokio::spawn(serve_connection(
                Arc::clone(&self.lobby),
                stream,
                id,
                hangup,
                outbound_rx,
            ));
        }
    }
}

fn lock(lobby: &Mutex<Lobby>) -> std::sync::MutexGuard<'_, Lobby> {
    lobby.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs one connection: a writer task draining the outbound channel and a
/// read loop dispatching inbound lines.
#[instrument(skip(lobby, stream, hangup, outbound_rx))]
async fn serve_connection(
    lobby: Arc<Mutex<Lobby>>,
    stream: TcpStream,
    id: ConnectionId,
    hangup: Arc<Notify>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) {
    let (read_half, mut write_half) = stream.into_split();

    tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            let mut framed = line;
            framed.push('\n');
            if let Err(e) = write_half.write_all(framed.as_bytes()).await {
                warn!(error = %e, "Write failed");
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        let line = tokio::select! {
            line = read_inbound_line(&mut reader, &mut buf) => line,
            _ = hangup.notified() => {
                debug!(connection = id, "Closed by coordinator");
                return;
            }
        };

        let line = match line {
            Ok(InboundLine::Text(line)) => line,
            Ok(InboundLine::NotUtf8(len)) => {
                warn!(connection = id, len, "Line is not UTF-8, ignored");
                continue;
            }
            Ok(InboundLine::End) => {
                debug!(connection = id, "Peer closed connection");
                break;
            }
            Err(e) => {
                warn!(connection = id, error = %e, "Read failed");
                break;
            }
        };

        match line.parse::<Message>() {
            Ok(Message::UserId(user_id)) => lock(&lobby).enter(id, Some(user_id)),
            Ok(Message::Move(_)) => {
                let mut guard = lock(&lobby);
                guard.enter(id, None);
                if !guard.relay(id, &line) {
                    warn!(connection = id, line = %line, "Move from unpaired connection ignored");
                }
            }
            Ok(other) => {
                lock(&lobby).enter(id, None);
                warn!(connection = id, message = %other, "Unexpected message from client ignored");
            }
            Err(e) => {
                lock(&lobby).enter(id, None);
                warn!(connection = id, line = %line, error = %e, "Malformed line ignored");
            }
        }
    }

    lock(&lobby).leave(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entered(lobby: &mut Lobby, name: &str) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (id, _) = lobby.join(tx);
        lobby.enter(id, Some(name.to_string()));
        (id, rx)
    }

    #[test]
    fn test_first_two_connections_pair_black_then_white() {
        let mut lobby = Lobby::default();
        let (_a, mut a_rx) = entered(&mut lobby, "alice");
        assert_eq!(lobby.waiting_count(), 1);

        let (_b, mut b_rx) = entered(&mut lobby, "bob");
        assert_eq!(lobby.waiting_count(), 0);
        assert_eq!(lobby.pair_count(), 1);

        assert_eq!(a_rx.try_recv().unwrap(), "START_BLACK bob");
        assert_eq!(b_rx.try_recv().unwrap(), "START_WHITE alice");
    }

    #[test]
    fn test_registered_connection_waits_for_first_line() {
        let mut lobby = Lobby::default();
        let (tx, mut silent_rx) = mpsc::unbounded_channel();
        let (silent, _) = lobby.join(tx);
        assert_eq!(lobby.waiting_count(), 0);

        let (_a, _a_rx) = entered(&mut lobby, "alice");
        assert_eq!(lobby.pair_count(), 0);

        // A connection that opens with something other than USER_ID still pairs, anonymously.
        lobby.enter(silent, None);
        assert_eq!(lobby.pair_count(), 1);
        assert_eq!(silent_rx.try_recv().unwrap(), "START_WHITE alice");
    }

    #[test]
    fn test_entering_twice_is_ignored() {
        let mut lobby = Lobby::default();
        let (a, _a_rx) = entered(&mut lobby, "alice");
        lobby.enter(a, Some("mallory".to_string()));
        assert_eq!(lobby.waiting_count(), 1);

        let (_b, mut b_rx) = entered(&mut lobby, "bob");
        assert_eq!(b_rx.try_recv().unwrap(), "START_WHITE alice");
    }

    #[test]
    fn test_third_connection_waits() {
        let mut lobby = Lobby::default();
        let _a = entered(&mut lobby, "alice");
        let _b = entered(&mut lobby, "bob");
        let (_c, mut c_rx) = entered(&mut lobby, "carol");
        assert_eq!(lobby.waiting_count(), 1);
        assert_eq!(lobby.pair_count(), 1);
        assert!(c_rx.try_recv().is_err());
    }

    #[test]
    fn test_relay_reaches_peer_only_when_paired() {
        let mut lobby = Lobby::default();
        let (a, _a_rx) = entered(&mut lobby, "alice");
        assert!(!lobby.relay(a, "MOVE 2 3"));

        let (_b, mut b_rx) = entered(&mut lobby, "bob");
        let _ = b_rx.try_recv();
        assert!(lobby.relay(a, "MOVE 2 3"));
        assert_eq!(b_rx.try_recv().unwrap(), "MOVE 2 3");
    }

    #[test]
    fn test_leaving_tears_down_pair() {
        let mut lobby = Lobby::default();
        let (a, _a_rx) = entered(&mut lobby, "alice");
        let (b, mut b_rx) = entered(&mut lobby, "bob");
        let _ = b_rx.try_recv();

        lobby.leave(a);
        assert_eq!(lobby.pair_count(), 0);
        assert!(!lobby.relay(b, "MOVE 2 3"));
        // The peer's sender was dropped, so its writer sees end of channel.
        assert!(matches!(
            b_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_waiting_connection_leaving_is_forgotten() {
        let mut lobby = Lobby::default();
        let (a, _a_rx) = entered(&mut lobby, "alice");
        lobby.leave(a);
        assert_eq!(lobby.waiting_count(), 0);

        let (_b, mut b_rx) = entered(&mut lobby, "bob");
        assert_eq!(lobby.waiting_count(), 1);
        assert!(b_rx.try_recv().is_err());
    }
}
