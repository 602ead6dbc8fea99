//! Move oracle: who picks the automated player's move.
//!
//! An oracle is fallible and slow. [`choose_move`] wraps any oracle so the
//! caller always gets a legal move: a failed, unparseable or illegal answer
//! degrades to a uniformly random legal move.

mod parse;

pub use parse::extract_move;

use crate::config::ArenaConfig;
use crate::llm_client::{LlmClient, LlmError};
use derive_more::Display;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use strictly_othello::{Board, Color, Difficulty, Position};
use tracing::{debug, info, instrument, warn};

/// Everything an oracle sees when asked for a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    /// Snapshot of the board.
    pub board: Board,
    /// Color the oracle plays.
    pub color: Color,
    /// Legal moves for `color`; never empty.
    pub legal: Vec<Position>,
    /// Strategy tier.
    pub difficulty: Difficulty,
}

impl Consultation {
    /// Creates a consultation.
    pub fn new(board: Board, color: Color, legal: Vec<Position>, difficulty: Difficulty) -> Self {
        Self {
            board,
            color,
            legal,
            difficulty,
        }
    }

    /// Builds the prompt sent to a text-generation model.
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "You are playing Othello as {}.\nCurrent Board (0=Empty, 1=Black, 2=White):\n",
            self.color.name()
        );
        for row in self.board.rows() {
            let cells: Vec<String> = row.iter().map(u8::to_string).collect();
            prompt.push_str(&format!("[{}]\n", cells.join(", ")));
        }

        let moves: Vec<String> = self
            .legal
            .iter()
            .map(|p| format!("[{}, {}]", p.x(), p.y()))
            .collect();
        prompt.push_str(&format!("Valid moves: {}.\n", moves.join(", ")));

        let strategy = match self.difficulty {
            Difficulty::Hard => "Play like an expert. Prioritize corners and stable discs.",
            Difficulty::Easy | Difficulty::Medium => "Pick a move that flips many pieces.",
        };
        prompt.push_str(&format!("Strategy: {}\n", strategy));

        prompt.push_str(
            "\nIMPORTANT: You can think step-by-step, but at the very end of your response, \
             you MUST output the final move in this exact format:\nMOVE: X, Y\n\
             Example:\nSome reasoning...\nMOVE: 3, 4",
        );
        prompt
    }
}

/// Why an oracle produced no usable move.
#[derive(Debug, Clone, Display)]
pub enum OracleError {
    /// The provider call failed.
    #[display("{}", _0)]
    Llm(LlmError),
    /// The reply named no legal move.
    #[display("Unparseable oracle reply: {:?}", _0)]
    Unparseable(String),
    /// Nothing to choose from.
    #[display("No legal moves offered")]
    NoMoves,
}

impl std::error::Error for OracleError {}

impl From<LlmError> for OracleError {
    fn from(err: LlmError) -> Self {
        OracleError::Llm(err)
    }
}

/// Source of suggested moves.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Suggests a move. The answer is not trusted; callers intersect it with
    /// the legal set.
    async fn suggest(&self, consultation: &Consultation) -> Result<Position, OracleError>;

    /// Short label for logs.
    fn label(&self) -> &str;
}

/// Picks uniformly among the legal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOracle;

/// Uniformly random member of `legal`.
pub fn random_move(legal: &[Position]) -> Option<Position> {
    legal.choose(&mut rand::thread_rng()).copied()
}

#[async_trait::async_trait]
impl MoveOracle for RandomOracle {
    async fn suggest(&self, consultation: &Consultation) -> Result<Position, OracleError> {
        random_move(&consultation.legal).ok_or(OracleError::NoMoves)
    }

    fn label(&self) -> &str {
        "random"
    }
}

/// Asks a text-generation model for a move.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    client: LlmClient,
}

impl LlmOracle {
    /// Creates an oracle backed by `client`.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self, consultation), fields(color = %consultation.color, difficulty = %consultation.difficulty))]
    async fn suggest(&self, consultation: &Consultation) -> Result<Position, OracleError> {
        let reply = self.client.generate("", &consultation.prompt()).await?;
        debug!(reply = %reply, "Oracle replied");
        extract_move(&reply, &consultation.legal).ok_or(OracleError::Unparseable(reply))
    }

    fn label(&self) -> &str {
        self.client.config().model()
    }
}

/// Builds the oracle described by `config`, falling back to
/// [`RandomOracle`] when no usable credential is present.
#[instrument(skip(config), fields(provider = ?config.oracle_provider()))]
pub fn oracle_from_config(config: &ArenaConfig) -> Arc<dyn MoveOracle> {
    match config.create_llm_config() {
        Ok(llm) => {
            info!(model = %llm.model(), "Using text-generation oracle");
            Arc::new(LlmOracle::new(LlmClient::new(llm)))
        }
        Err(e) => {
            warn!(error = %e.message, "No oracle credential, moves will be random");
            Arc::new(RandomOracle)
        }
    }
}

/// How long [`choose_move`] waits for an oracle unless configured otherwise.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Picks a legal move for the consultation.
///
/// Easy never consults the oracle. Otherwise the oracle is asked once, with
/// at most `limit` to answer, and its answer accepted only if legal. Returns
/// `None` only when there are no legal moves.
#[instrument(skip(oracle, consultation), fields(oracle = oracle.label(), difficulty = %consultation.difficulty))]
pub async fn choose_move(oracle: &dyn MoveOracle, consultation: &Consultation, limit: Duration) -> Option<Position> {
    if consultation.legal.is_empty() {
        return None;
    }
    if !consultation.difficulty.consults_oracle() {
        return random_move(&consultation.legal);
    }

    let Ok(answer) = tokio::time::timeout(limit, oracle.suggest(consultation)).await else {
        warn!(?limit, "Oracle timed out, picking at random");
        return random_move(&consultation.legal);
    };

    match answer {
        Ok(pos) if consultation.legal.contains(&pos) => {
            info!(%pos, "Oracle move accepted");
            Some(pos)
        }
        Ok(pos) => {
            warn!(%pos, "Oracle suggested an illegal move, picking at random");
            random_move(&consultation.legal)
        }
        Err(e) => {
            warn!(error = %e, "Oracle failed, picking at random");
            random_move(&consultation.legal)
        }
    }
}
