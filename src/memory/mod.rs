//! Conversation memory: bounded per-channel histories mirrored to a JSON file.

pub mod config;
pub mod errors;
pub mod history;
pub mod persistence;
pub mod store;

pub use config::HistoryConfig;
pub use errors::{MemoryError, MemoryResult};
pub use history::{ConversationTurn, HistorySnapshot, Role};
pub use persistence::{HistorySender, HistoryWriter};
pub use store::{ChannelGuard, ContextStore};

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::warn;

/// A loaded [`ContextStore`] together with its running writer task.
pub struct HistoryService {
    store: Arc<ContextStore>,
    writer_task: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

impl HistoryService {
    /// Load history from disk and start the background writer.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub async fn start(config: &HistoryConfig) -> MemoryResult<Self> {
        config.validate()?;

        let (writer, sender) = HistoryWriter::new(config.path.clone());
        let shutdown = writer.shutdown_notifier();
        let store = ContextStore::load(&config.path, config.max_turns)
            .await
            .with_writer(sender);

        Ok(Self {
            store: Arc::new(store),
            writer_task: writer.spawn(),
            shutdown,
        })
    }

    /// Shared handle to the store.
    #[must_use]
    pub fn store(&self) -> Arc<ContextStore> {
        Arc::clone(&self.store)
    }

    /// Flush the newest pending snapshot and stop the writer.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.writer_task.await {
            warn!(%err, "History writer task ended abnormally");
        }
    }
}
