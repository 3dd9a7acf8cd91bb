//! Configuration for conversation history.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::memory::errors::{MemoryError, MemoryResult};

/// Default history file, relative to the working directory.
pub const DEFAULT_HISTORY_FILE: &str = "chat_history.json";
/// Default number of user/assistant pairs remembered per channel.
pub const DEFAULT_MAX_HISTORY_TURNS: usize = 6;

/// History storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// JSON file mirroring every channel's history.
    pub path: PathBuf,
    /// Pairs kept per channel; the entry cap is twice this.
    pub max_turns: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_HISTORY_FILE),
            max_turns: DEFAULT_MAX_HISTORY_TURNS,
        }
    }
}

impl HistoryConfig {
    /// Set the history file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the number of remembered pairs.
    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if `max_turns` is zero or the path is empty.
    pub fn validate(&self) -> MemoryResult<()> {
        if self.max_turns == 0 {
            return Err(MemoryError::InvalidConfig(
                "max_turns must be > 0".to_string(),
            ));
        }

        if self.path.as_os_str().is_empty() {
            return Err(MemoryError::InvalidConfig(
                "history path must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
