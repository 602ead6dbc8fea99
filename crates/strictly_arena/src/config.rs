//! Arena configuration loaded from TOML.

use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_othello::Difficulty;
use tracing::{debug, info, instrument, warn};

/// Credentials shorter than this are treated as unset.
pub const MIN_API_KEY_LEN: usize = 10;

/// Configuration shared by the coordinator, the session relay and the oracle.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Identity announced to the coordinator and used for recorded results.
    #[serde(default = "default_user_id")]
    user_id: String,

    /// Coordinator host.
    #[serde(default = "default_server_host")]
    server_host: String,

    /// Coordinator port.
    #[serde(default = "default_server_port")]
    server_port: u16,

    /// Path of the SQLite results database.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Text-generation provider backing the oracle.
    #[serde(default = "default_oracle_provider")]
    oracle_provider: LlmProvider,

    /// Model name passed to the provider.
    #[serde(default = "default_oracle_model")]
    oracle_model: String,

    /// Maximum tokens in an oracle reply.
    #[serde(default = "default_oracle_max_tokens")]
    oracle_max_tokens: u32,

    /// Seconds to wait for an oracle reply before playing a random legal move.
    #[serde(default = "default_oracle_timeout_secs")]
    oracle_timeout_secs: u64,

    /// Default oracle difficulty.
    #[serde(default)]
    difficulty: Difficulty,
}

fn default_user_id() -> String {
    "Guest".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    9999
}

fn default_db_path() -> String {
    "strictly_othello.db".to_string()
}

fn default_oracle_provider() -> LlmProvider {
    LlmProvider::Gemini
}

fn default_oracle_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_oracle_max_tokens() -> u32 {
    1024
}

fn default_oracle_timeout_secs() -> u64 {
    60
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            server_host: default_server_host(),
            server_port: default_server_port(),
            db_path: default_db_path(),
            oracle_provider: default_oracle_provider(),
            oracle_model: default_oracle_model(),
            oracle_max_tokens: default_oracle_max_tokens(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            difficulty: Difficulty::default(),
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(user_id = %config.user_id, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Overrides the coordinator address.
    pub fn with_server(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server_host = host;
        }
        if let Some(port) = port {
            self.server_port = port;
        }
        self
    }

    /// How long a single oracle consultation may take.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Name of the environment variable holding the provider credential.
    pub fn api_key_var(&self) -> &'static str {
        match self.oracle_provider {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Builds the LLM configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the credential is unset or too short to be real.
    #[instrument(skip(self), fields(provider = ?self.oracle_provider, model = %self.oracle_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let var = self.api_key_var();
        let api_key = std::env::var(var).map_err(|_| ConfigError::new(format!("{} environment variable not set", var)))?;
        self.llm_config_with_key(api_key)
    }

    /// Builds the LLM configuration from an explicit credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the credential is shorter than [`MIN_API_KEY_LEN`].
    pub fn llm_config_with_key(&self, api_key: String) -> Result<LlmConfig, ConfigError> {
        if api_key.trim().len() < MIN_API_KEY_LEN {
            warn!(provider = ?self.oracle_provider, "API key too short, treating as unset");
            return Err(ConfigError::new(format!("{} is too short to be a real key", self.api_key_var())));
        }

        Ok(LlmConfig::new(
            self.oracle_provider,
            api_key.trim().to_string(),
            self.oracle_model.clone(),
            self.oracle_max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
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

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: ArenaConfig = toml::from_str("").unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.user_id(), "Guest");
        assert_eq!(*config.server_port(), 9999);
        assert_eq!(*config.difficulty(), Difficulty::Medium);
        assert_eq!(config.oracle_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_short_key_is_rejected() {
        let config = ArenaConfig::default();
        assert!(config.llm_config_with_key("AIza".to_string()).is_err());
        let llm = config.llm_config_with_key("0123456789abcdef".to_string()).unwrap();
        assert_eq!(llm.model(), "gemini-2.0-flash");
    }

    #[test]
    fn test_overrides() {
        let config = ArenaConfig::default()
            .with_user_id("alice")
            .with_server(None, Some(4000));
        assert_eq!(config.user_id(), "alice");
        assert_eq!(config.server_host(), "127.0.0.1");
        assert_eq!(*config.server_port(), 4000);
    }
}
