//! Reply grammar for text-generation oracles.
//!
//! Replies may reason at length, but must end with `MOVE: X, Y`. Extraction
//! takes the last such line that names a legal move; failing that, it strips
//! everything but digits and commas and scans integer pairs from the back.

use regex::Regex;
use std::sync::OnceLock;
use strictly_othello::Position;
use tracing::{debug, instrument};

fn move_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"MOVE:\s*(\d+)\s*,\s*(\d+)").ok())
        .as_ref()
}

/// Finds the move a reply settles on, if it names a legal one.
#[instrument(skip(reply, legal), fields(reply_len = reply.len(), legal = legal.len()))]
pub fn extract_move(reply: &str, legal: &[Position]) -> Option<Position> {
    let legal_at = |x: usize, y: usize| legal.iter().copied().find(|p| p.x() == x && p.y() == y);

    let tagged = move_pattern().and_then(|pattern| {
        pattern
            .captures_iter(reply)
            .filter_map(|caps| {
                let x = caps.get(1)?.as_str().parse().ok()?;
                let y = caps.get(2)?.as_str().parse().ok()?;
                legal_at(x, y)
            })
            .last()
    });
    if tagged.is_some() {
        debug!(?tagged, "Tagged move found");
        return tagged;
    }

    let digits: String = reply.chars().filter(|c| c.is_ascii_digit() || *c == ',').collect();
    let parts: Vec<&str> = digits.split(',').collect();
    let fallback = parts.windows(2).rev().find_map(|pair| {
        let x = pair[0].parse().ok()?;
        let y = pair[1].parse().ok()?;
        legal_at(x, y)
    });
    debug!(?fallback, "Untagged pair scan");
    fallback
}
