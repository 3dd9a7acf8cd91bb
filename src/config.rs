//! Process configuration read from the environment (and `.env`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::dialogue::DEFAULT_COMPLETION_TIMEOUT;
use crate::llm::GeminiConfig;
use crate::llm::gemini::DEFAULT_GEMINI_MODEL;
use crate::memory::HistoryConfig;
use crate::memory::config::{DEFAULT_HISTORY_FILE, DEFAULT_MAX_HISTORY_TURNS};

/// Default liveness port.
pub const DEFAULT_PORT: u16 = 8080;

const DISCORD_TOKEN: &str = "DISCORD_TOKEN";
const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
const GEMINI_MODEL: &str = "GEMINI_MODEL";
const PORT: &str = "PORT";
const HISTORY_FILE: &str = "MIKA_HISTORY_FILE";
const MAX_HISTORY_TURNS: &str = "MIKA_MAX_HISTORY_TURNS";
const COMPLETION_TIMEOUT_SECS: &str = "MIKA_COMPLETION_TIMEOUT_SECS";

/// Configuration errors. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is set but unusable.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Everything the bot needs to start.
#[derive(Clone)]
pub struct BotConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// Completion backend settings.
    pub gemini: GeminiConfig,
    /// Liveness server port.
    pub port: u16,
    /// History file and cap.
    pub history: HistoryConfig,
    /// Upper bound on one completion call.
    pub completion_timeout: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("gemini", &self.gemini)
            .field("port", &self.port)
            .field("history", &self.history)
            .field("completion_timeout", &self.completion_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Load `.env` if present, then read the process environment.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(%err, "Ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = read(DISCORD_TOKEN).ok_or(ConfigError::Missing(DISCORD_TOKEN))?;
        let api_key = read(GOOGLE_API_KEY).ok_or(ConfigError::Missing(GOOGLE_API_KEY))?;
        let model = read(GEMINI_MODEL).unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let port = parse_or(read(PORT), PORT, DEFAULT_PORT)?;
        let max_turns = parse_or(read(MAX_HISTORY_TURNS), MAX_HISTORY_TURNS, DEFAULT_MAX_HISTORY_TURNS)?;
        if max_turns == 0 {
            return Err(ConfigError::Invalid {
                key: MAX_HISTORY_TURNS,
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }
        let timeout_secs = parse_or(
            read(COMPLETION_TIMEOUT_SECS),
            COMPLETION_TIMEOUT_SECS,
            DEFAULT_COMPLETION_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: COMPLETION_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "must be > 0".to_string(),
            });
        }

        let history = HistoryConfig::default()
            .with_path(read(HISTORY_FILE).unwrap_or_else(|| DEFAULT_HISTORY_FILE.to_string()))
            .with_max_turns(max_turns);

        Ok(Self {
            discord_token,
            gemini: GeminiConfig::new(api_key).with_model(model),
            port,
            history,
            completion_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = raw else {
        return Ok(default);
    };

    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: err.to_string(),
    })
}
