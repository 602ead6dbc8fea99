//! Line transports carrying protocol messages.
//!
//! A [`Transport`] sends whole lines and yields inbound lines one at a time.
//! [`TcpTransport`] speaks to a real coordinator; [`ChannelTransport`] pairs
//! two endpoints in memory for tests.

use crate::protocol::Message;
use derive_more::{Display, Error};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

/// One line read off a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InboundLine {
    /// A UTF-8 line without its `\n` or `\r\n` terminator.
    Text(String),
    /// A line that is not UTF-8; its length in bytes.
    NotUtf8(usize),
    /// End of stream.
    End,
}

/// Reads the next line as bytes, so a line that is not UTF-8 is reported
/// instead of failing the stream.
///
/// Cancel-safe as long as `buf` outlives the call: partial bytes stay in
/// `buf` and the next call continues from them.
pub(crate) async fn read_inbound_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<InboundLine>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(InboundLine::End);
    }

    let mut bytes = std::mem::take(buf);
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    Ok(match String::from_utf8(bytes) {
        Ok(line) => InboundLine::Text(line),
        Err(e) => InboundLine::NotUtf8(e.as_bytes().len()),
    })
}

/// A bidirectional, line-oriented connection.
///
/// `recv_line` must be cancel-safe: dropping its future before completion
/// never loses a line.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Sends one line; the newline is appended by the transport.
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Waits for the next inbound line, without its terminator.
    ///
    /// Returns `Ok(None)` at end-of-stream.
    async fn recv_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Sends a protocol message.
    async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
        self.send_line(&message.to_string()).await
    }
}

/// Transport over a TCP stream.
///
/// A reader task feeds inbound lines through a channel so `recv_line` stays
/// cancel-safe inside `tokio::select!`.
pub struct TcpTransport {
    writer: OwnedWriteHalf,
    inbound: mpsc::UnboundedReceiver<Result<String, TransportError>>,
    reader: JoinHandle<()>,
}

impl TcpTransport {
    /// Connects to a coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the connection is refused.
    #[instrument]
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|e| TransportError::new(format!("Failed to connect to {}:{}: {}", host, port, e)))?;
        info!("Connected to coordinator");
        Ok(Self::from_stream(stream))
    }

    /// Wraps an established stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, writer) = stream.into_split();
        let (tx, inbound) = mpsc::unbounded_channel();

        let reader = tokio::spawn(async move {
            let mut reader = BufReader::new(read_half);
            let mut buf = Vec::new();
            loop {
                match read_inbound_line(&mut reader, &mut buf).await {
                    Ok(InboundLine::Text(line)) => {
                        trace!(line = %line, "Line received");
                        if tx.send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Ok(InboundLine::NotUtf8(len)) => {
                        warn!(len, "Line is not UTF-8, ignored");
                    }
                    Ok(InboundLine::End) => {
                        debug!("End of stream");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Read failed");
                        let _ = tx.send(Err(TransportError::new(format!("Read failed: {}", e))));
                        break;
                    }
                }
            }
        });

        Self {
            writer,
            inbound,
            reader,
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        trace!(line = %line, "Sending line");
        let mut framed = String::with_capacity(line.len() + 1);
        framed.push_str(line);
        framed.push('\n');
        self.writer
            .write_all(framed.as_bytes())
            .await
            .map_err(|e| TransportError::new(format!("Write failed: {}", e)))?;
        self.writer
            .flush()
            .await
            .map_err(|e| TransportError::new(format!("Flush failed: {}", e)))
    }

    async fn recv_line(&mut self) -> Result<Option<String>, TransportError> {
        match self.inbound.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// In-memory transport; create connected endpoints with [`ChannelTransport::pair`].
///
/// Dropping one endpoint is end-of-stream for the other.
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
}

impl ChannelTransport {
    /// Creates two connected endpoints.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound: a_tx,
                inbound: b_rx,
            },
            Self {
                outbound: b_tx,
                inbound: a_rx,
            },
        )
    }
}

#[async_trait::async_trait]
impl Transport for ChannelTransport {
    async fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.outbound
            .send(line.to_string())
            .map_err(|_| TransportError::new("Peer endpoint dropped".to_string()))
    }

    async fn recv_line(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.recv().await)
    }
}

/// Transport error.
#[derive(Debug, Clone, Display, Error)]
#[display("Transport error: {} at {}:{}", message, file, line)]
pub struct TransportError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_othello::Position;

    #[tokio::test]
    async fn test_channel_pair_delivers_in_order() {
        let (mut a, mut b) = ChannelTransport::pair();
        a.send(&Message::UserId("alice".to_string())).await.unwrap();
        a.send(&Message::Move(Position::new(2, 3).unwrap())).await.unwrap();

        assert_eq!(b.recv_line().await.unwrap().as_deref(), Some("USER_ID alice"));
        assert_eq!(b.recv_line().await.unwrap().as_deref(), Some("MOVE 2 3"));
    }

    #[tokio::test]
    async fn test_dropped_peer_is_end_of_stream() {
        let (a, mut b) = ChannelTransport::pair();
        drop(a);
        assert_eq!(b.recv_line().await.unwrap(), None);
        assert!(b.send_line("MOVE 0 0").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_reported_not_fatal() {
        let mut input: &[u8] = b"MOVE \xff 3\r\nMOVE 2 3\nUSER_ID tail";
        let mut buf = Vec::new();

        assert_eq!(read_inbound_line(&mut input, &mut buf).await.unwrap(), InboundLine::NotUtf8(8));
        assert_eq!(
            read_inbound_line(&mut input, &mut buf).await.unwrap(),
            InboundLine::Text("MOVE 2 3".to_string())
        );
        assert_eq!(
            read_inbound_line(&mut input, &mut buf).await.unwrap(),
            InboundLine::Text("USER_ID tail".to_string())
        );
        assert_eq!(read_inbound_line(&mut input, &mut buf).await.unwrap(), InboundLine::End);
    }

    #[tokio::test]
    async fn test_tcp_transport_skips_invalid_utf8() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"START_BLACK \xfe\xff\nMOVE 2 3\n").await.unwrap();
        });

        let mut client = TcpTransport::connect("127.0.0.1", port).await.unwrap();
        server.await.unwrap();
        assert_eq!(client.recv_line().await.unwrap().as_deref(), Some("MOVE 2 3"));
        assert_eq!(client.recv_line().await.unwrap(), None);
    }
}
