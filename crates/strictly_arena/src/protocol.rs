//! Line-based wire protocol between clients and the match coordinator.
//!
//! One message per newline-terminated UTF-8 line:
//!
//! - `USER_ID <id>`: client announces itself on connect.
//! - `START_BLACK <opponent>` / `START_WHITE <opponent>`: coordinator pairs
//!   two clients; the opponent id may be empty.
//!
//! Ids run to the end of the line, so they may contain spaces.
//! - `MOVE <x> <y>`: a committed move, relayed verbatim.

use derive_more::Display;
use std::str::FromStr;
use strictly_othello::{BOARD_SIZE, Color, Position};

const USER_ID: &str = "USER_ID";
const START_BLACK: &str = "START_BLACK";
const START_WHITE: &str = "START_WHITE";
const MOVE: &str = "MOVE";

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client identity.
    UserId(String),
    /// Pairing notice carrying the assigned color and the opponent's id.
    Start {
        /// Color assigned to the receiving client.
        color: Color,
        /// Opponent's announced id; empty if it had not announced one yet.
        opponent: String,
    },
    /// A committed move.
    Move(Position),
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::UserId(id) => write!(f, "{} {}", USER_ID, id),
            Message::Start { color, opponent } => {
                let keyword = match color {
                    Color::Black => START_BLACK,
                    Color::White => START_WHITE,
                };
                write!(f, "{} {}", keyword, opponent)
            }
            Message::Move(pos) => write!(f, "{} {} {}", MOVE, pos.x(), pos.y()),
        }
    }
}

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// Blank line.
    #[display("Empty line")]
    Empty,
    /// First token is not a known keyword.
    #[display("Unknown keyword {:?}", _0)]
    UnknownKeyword(String),
    /// Wrong number of arguments for the keyword.
    #[display("{} expects {} argument(s), found {}", keyword, expected, found)]
    WrongArity {
        /// The keyword.
        keyword: &'static str,
        /// Expected argument count.
        expected: &'static str,
        /// Arguments present.
        found: usize,
    },
    /// Coordinate that is not an integer in `0..8`.
    #[display("Bad coordinate {:?}", _0)]
    BadCoordinate(String),
}

impl std::error::Error for ProtocolError {}

fn coordinate(token: &str) -> Result<usize, ProtocolError> {
    token
        .parse::<usize>()
        .ok()
        .filter(|v| *v < BOARD_SIZE)
        .ok_or_else(|| ProtocolError::BadCoordinate(token.to_string()))
}

impl FromStr for Message {
    type Err = ProtocolError;

    /// Parses one line. A trailing `\r` or `\n` is tolerated.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']).trim();
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match keyword {
            USER_ID if rest.is_empty() => Err(ProtocolError::WrongArity {
                keyword: USER_ID,
                expected: "1",
                found: 0,
            }),
            USER_ID => Ok(Message::UserId(rest.to_string())),
            START_BLACK => Ok(Message::Start {
                color: Color::Black,
                opponent: rest.to_string(),
            }),
            START_WHITE => Ok(Message::Start {
                color: Color::White,
                opponent: rest.to_string(),
            }),
            MOVE => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                match args.as_slice() {
                    [x, y] => {
                        let (x, y) = (coordinate(x)?, coordinate(y)?);
                        Position::new(x, y)
                            .map(Message::Move)
                            .ok_or_else(|| ProtocolError::BadCoordinate(format!("{} {}", x, y)))
                    }
                    _ => Err(ProtocolError::WrongArity {
                        keyword: MOVE,
                        expected: "2",
                        found: args.len(),
                    }),
                }
            }
            other => Err(ProtocolError::UnknownKeyword(other.to_string())),
        }
    }
}
