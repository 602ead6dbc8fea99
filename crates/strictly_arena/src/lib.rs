//! Strictly Arena - networked and automated play for strictly_othello
//!
//! Everything outside the board rules lives here.
//!
//! # Architecture
//!
//! - **Protocol**: line-based `USER_ID` / `START_<COLOR>` / `MOVE` messages
//! - **Transport**: TCP and in-memory line transports behind one trait
//! - **Coordinator**: pairs connections, assigns colors, relays moves
//! - **Relay**: client session keeping the local board in step with the remote
//! - **Oracle**: automated move choice with a random fallback
//! - **Persistence**: finished matches and per-profile records in SQLite
//!
//! # Example
//!
//! ```no_run
//! use strictly_arena::{ArenaConfig, SessionRelay, TcpTransport};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ArenaConfig::default();
//! let transport = TcpTransport::connect(config.server_host(), *config.server_port()).await?;
//! let mut relay = SessionRelay::connect(transport, config.user_id()).await?;
//! let event = relay.next_event().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod console;
mod coordinator;
mod db;
mod llm_client;
mod online;
mod oracle;
mod orchestrator;
mod players;
mod protocol;
mod relay;
mod render;
mod transport;

// Crate-level exports - CLI
pub use cli::{Cli, Command};

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError, MIN_API_KEY_LEN};

// Crate-level exports - Console
pub use console::{ConsoleCommand, InputError, SharedInput, parse_command, spawn_stdin_reader};

// Crate-level exports - Coordinator
pub use coordinator::{ConnectionId, MatchCoordinator};

// Crate-level exports - Persistence
pub use db::{
    DbError, GameOutcome, GameRecord, GameRepository, MatchResult, NewGameRecord, NewUser, NullRecorder, ResultRecorder,
    User, record_in_background,
};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Online play
pub use online::{OnlineEnd, OnlineMatch, UNKNOWN_OPPONENT};

// Crate-level exports - Oracle
pub use oracle::{
    Consultation, DEFAULT_ORACLE_TIMEOUT, LlmOracle, MoveOracle, OracleError, RandomOracle, choose_move, extract_move, oracle_from_config,
    random_move,
};

// Crate-level exports - Orchestration
pub use orchestrator::{GameEvent, Orchestrator};
pub use players::{HumanPlayer, OraclePlayer, Player, PlayerChoice};

// Crate-level exports - Protocol
pub use protocol::{Message, ProtocolError};

// Crate-level exports - Relay
pub use relay::{LocalMoveError, RelayError, RelayEvent, SessionRelay};

// Crate-level exports - Rendering
pub use render::{render, spawn_renderer};

// Crate-level exports - Transport
pub use transport::{ChannelTransport, TcpTransport, Transport, TransportError};
