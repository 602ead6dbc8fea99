//! Persistence of finished matches and per-profile records.

mod error;
mod models;
mod recorder;
mod repository;
mod schema;

pub use error::DbError;
pub use models::{GameOutcome, GameRecord, MatchResult, NewGameRecord, NewUser, User};
pub use recorder::{NullRecorder, ResultRecorder, record_in_background};
pub use repository::GameRepository;
