//! Database repository for match records and user profiles.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameOutcome, GameRecord, MatchResult, NewUser, User, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for user and match operations.
///
/// Each operation opens its own connection, so the repository is cheap to
/// clone and safe to use from blocking tasks.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for an already-migrated database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        let mut conn = repo.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(applied = applied.len(), "Database ready");
        Ok(repo)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Creates a new user profile.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the display name is already taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_user(&self, display_name: String) -> Result<User, DbError> {
        debug!(display_name = %display_name, "Creating user");
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&NewUser::new(display_name))
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), display_name = %user.display_name(), "User created");
        Ok(user)
    }

    /// Gets a user by display name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, display_name: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .filter(schema::users::display_name.eq(display_name))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = user.is_some(), "User lookup");
        Ok(user)
    }

    /// Lists all user profiles, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let mut conn = self.connection()?;
        let users = schema::users::table
            .order((schema::users::created_at.asc(), schema::users::id.asc()))
            .select(User::as_select())
            .load(&mut conn)?;
        info!(count = users.len(), "Users loaded");
        Ok(users)
    }

    /// Records a finished match.
    ///
    /// The match row is always inserted. When the result names a local
    /// profile (online and oracle matches) that profile's win, loss or draw
    /// total is incremented in the same transaction, creating the profile
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is written then.
    #[instrument(skip(self, result), fields(mode = %result.mode(), outcome = ?result.outcome()))]
    pub fn record_result(&self, result: &MatchResult) -> Result<GameRecord, DbError> {
        let mut conn = self.connection()?;

        let record = conn.transaction::<_, DbError, _>(|conn| {
            let record = diesel::insert_into(schema::game_records::table)
                .values(&result.to_new_record())
                .returning(GameRecord::as_returning())
                .get_result(conn)?;

            if let (Some(name), Some(outcome)) = (result.local_player(), result.local_outcome()) {
                let existing = schema::users::table
                    .filter(schema::users::display_name.eq(name.as_str()))
                    .select(User::as_select())
                    .first(conn)
                    .optional()?;
                let user = match existing {
                    Some(user) => user,
                    None => diesel::insert_into(schema::users::table)
                        .values(&NewUser::new(name.clone()))
                        .returning(User::as_returning())
                        .get_result(conn)?,
                };

                let target = schema::users::table.find(*user.id());
                match outcome {
                    GameOutcome::Win => diesel::update(target)
                        .set(schema::users::wins.eq(schema::users::wins + 1))
                        .execute(conn)?,
                    GameOutcome::Loss => diesel::update(target)
                        .set(schema::users::losses.eq(schema::users::losses + 1))
                        .execute(conn)?,
                    GameOutcome::Draw => diesel::update(target)
                        .set(schema::users::draws.eq(schema::users::draws + 1))
                        .execute(conn)?,
                };
                debug!(user = %name, %outcome, "Profile updated");
            }

            Ok(record)
        })?;

        info!(record_id = record.id(), winner = ?record.winner(), "Match recorded");
        Ok(record)
    }

    /// Most recent matches a player took part in, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_records(&self, player: &str, limit: i64) -> Result<Vec<GameRecord>, DbError> {
        use schema::game_records::dsl;

        let mut conn = self.connection()?;
        let records = dsl::game_records
            .filter(dsl::black_player.eq(player).or(dsl::white_player.eq(player)))
            .order((dsl::played_at.desc(), dsl::id.desc()))
            .limit(limit)
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        debug!(count = records.len(), "Records loaded");
        Ok(records)
    }

    /// Every recorded match, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn all_records(&self) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let records = schema::game_records::table
            .order(schema::game_records::id.asc())
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        Ok(records)
    }
}
