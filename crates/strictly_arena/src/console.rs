//! Console input: coordinate parsing and the stdin reader.

use derive_more::Display;
use std::io::BufRead;
use std::sync::Arc;
use strictly_othello::Position;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Console lines shared by every human player at this terminal.
pub type SharedInput = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// What the person at the console asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Place a disc.
    Place(Position),
    /// Leave the match.
    Quit,
}

/// Why a console line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InputError {
    /// Nothing typed.
    #[display("Enter a move as \"x y\" or \"x,y\", or q to quit")]
    Empty,
    /// Not two integers.
    #[display("Could not read {:?} as a move; type \"x y\" or \"x,y\"", _0)]
    Unreadable(String),
    /// Off the board.
    #[display("({}, {}) is off the board; coordinates run 0 to 7", _0, _1)]
    OffBoard(usize, usize),
}

impl std::error::Error for InputError {}

/// Parses `x y`, `x,y` or `q`.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(InputError::Empty);
    }
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Ok(ConsoleCommand::Quit);
    }

    let numbers: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();
    let [x, y] = numbers.as_slice() else {
        return Err(InputError::Unreadable(line.to_string()));
    };
    let (Ok(x), Ok(y)) = (x.parse::<usize>(), y.parse::<usize>()) else {
        return Err(InputError::Unreadable(line.to_string()));
    };

    Position::new(x, y)
        .map(ConsoleCommand::Place)
        .ok_or(InputError::OffBoard(x, y))
}

/// Spawns a thread forwarding stdin lines; the channel closes at end of input.
///
/// A blocked read must never hold up runtime shutdown.
pub fn spawn_stdin_reader() -> SharedInput {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Stdin read failed");
                    break;
                }
            }
        }
        debug!("Stdin closed");
    });
    Arc::new(Mutex::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_space_and_comma_forms() {
        let expected = ConsoleCommand::Place(Position::new(2, 3).unwrap());
        assert_eq!(parse_command("2 3"), Ok(expected));
        assert_eq!(parse_command("2,3"), Ok(expected));
        assert_eq!(parse_command(" 2, 3 \r"), Ok(expected));
    }

    #[test]
    fn test_quit() {
        assert_eq!(parse_command("q"), Ok(ConsoleCommand::Quit));
        assert_eq!(parse_command("QUIT"), Ok(ConsoleCommand::Quit));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(parse_command(""), Err(InputError::Empty));
        assert_eq!(parse_command("8 0"), Err(InputError::OffBoard(8, 0)));
        assert!(matches!(parse_command("a b"), Err(InputError::Unreadable(_))));
        assert!(matches!(parse_command("1 2 3"), Err(InputError::Unreadable(_))));
    }
}
