//! LLM API client abstraction for Gemini, OpenAI and Anthropic.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
        }
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generates a completion from a system prompt and user message.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, a non-success status, or a
    /// reply without text.
    #[instrument(skip(self, system_prompt, user_message), fields(provider = ?self.config.provider, model = %self.config.model))]
    pub async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        debug!("Generating completion");
        let (url, body) = match self.config.provider {
            LlmProvider::Gemini => (
                format!("{}{}:generateContent", GEMINI_BASE_URL, self.config.model),
                gemini_body(system_prompt, user_message),
            ),
            LlmProvider::OpenAI => (
                OPENAI_URL.to_string(),
                serde_json::json!({
                    "model": self.config.model,
                    "max_tokens": self.config.max_tokens,
                    "messages": [
                        { "role": "system", "content": system_prompt },
                        { "role": "user", "content": user_message }
                    ]
                }),
            ),
            LlmProvider::Anthropic => (
                ANTHROPIC_URL.to_string(),
                serde_json::json!({
                    "model": self.config.model,
                    "max_tokens": self.config.max_tokens,
                    "system": system_prompt,
                    "messages": [
                        { "role": "user", "content": user_message }
                    ]
                }),
            ),
        };

        let request = self.http.post(&url).header("content-type", "application/json");
        let request = match self.config.provider {
            LlmProvider::Gemini => request.header("x-goog-api-key", self.config.api_key.clone()),
            LlmProvider::OpenAI => request.bearer_auth(&self.config.api_key),
            LlmProvider::Anthropic => request
                .header("x-api-key", self.config.api_key.clone())
                .header("anthropic-version", "2023-06-01"),
        };

        debug!(url = %url, "Sending request");
        let response = request.json(&body).send().await.map_err(|e| {
            error!(error = ?e, "API request failed");
            LlmError::new(format!("{} API request failed: {}", self.config.provider, e))
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read response");
            LlmError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "API error");
            return Err(LlmError::new(format!(
                "{} API error {}: {}",
                self.config.provider, status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing response");
        let response_json: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse response");
            LlmError::new(format!("Failed to parse response: {}", e))
        })?;

        let content = extract_text(self.config.provider, &response_json)
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in response");
                LlmError::new(format!("No text content in {} response", self.config.provider))
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

/// Gemini takes a single text part; the system prompt leads it.
fn gemini_body(system_prompt: &str, user_message: &str) -> serde_json::Value {
    let text = if system_prompt.is_empty() {
        user_message.to_string()
    } else {
        format!("{}\n\n{}", system_prompt, user_message)
    };
    serde_json::json!({
        "contents": [ { "parts": [ { "text": text } ] } ]
    })
}

/// Pulls the reply text out of a provider response.
fn extract_text(provider: LlmProvider, response: &serde_json::Value) -> Option<&str> {
    match provider {
        LlmProvider::Gemini => response["candidates"][0]["content"]["parts"][0]["text"].as_str(),
        LlmProvider::OpenAI => response["choices"][0]["message"]["content"].as_str(),
        LlmProvider::Anthropic => response["content"][0]["text"].as_str(),
    }
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
