//! Per-channel conversation context.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::memory::history::{ConversationTurn, HistorySnapshot, trim_to};
use crate::memory::persistence::{HistorySender, read_history};

/// Guard that serializes one channel's read, complete, append sequence.
pub type ChannelGuard = OwnedMutexGuard<()>;

/// Bounded history of every channel, optionally mirrored to disk.
pub struct ContextStore {
    histories: DashMap<String, Vec<ConversationTurn>>,
    gates: DashMap<String, Arc<AsyncMutex<()>>>,
    max_entries: usize,
    writer: Option<HistorySender>,
    snapshot_order: Mutex<()>,
}

impl ContextStore {
    /// Create an empty, unpersisted store keeping `max_turns` pairs per channel.
    #[must_use]
    pub fn new(max_turns: usize) -> Self {
        Self::from_snapshot(HistorySnapshot::new(), max_turns)
    }

    /// Create a store pre-filled from a snapshot, trimming each channel.
    #[must_use]
    pub fn from_snapshot(snapshot: HistorySnapshot, max_turns: usize) -> Self {
        let max_entries = max_turns.saturating_mul(2);
        let histories = DashMap::new();
        for (channel_id, mut turns) in snapshot {
            trim_to(&mut turns, max_entries);
            histories.insert(channel_id, turns);
        }

        Self {
            histories,
            gates: DashMap::new(),
            max_entries,
            writer: None,
            snapshot_order: Mutex::new(()),
        }
    }

    /// Load the store from a history file. Never fails: unusable files give
    /// an empty store.
    pub async fn load(path: &Path, max_turns: usize) -> Self {
        let snapshot = read_history(path, max_turns.saturating_mul(2)).await;
        Self::from_snapshot(snapshot, max_turns)
    }

    /// Mirror every [`save`](Self::save) to a background writer.
    #[must_use]
    pub fn with_writer(mut self, writer: HistorySender) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Ordered turns for a channel, registering an empty history if unknown.
    #[must_use]
    pub fn get(&self, channel_id: &str) -> Vec<ConversationTurn> {
        self.histories
            .entry(channel_id.to_string())
            .or_default()
            .clone()
    }

    /// Append a user/assistant pair and drop the oldest entries past the cap.
    pub fn append(&self, channel_id: &str, user: &str, assistant: &str) {
        let mut turns = self.histories.entry(channel_id.to_string()).or_default();
        turns.push(ConversationTurn::user(user));
        turns.push(ConversationTurn::assistant(assistant));
        trim_to(&mut turns, self.max_entries);
    }

    /// Wait for exclusive use of a channel's history.
    pub async fn lock(&self, channel_id: &str) -> ChannelGuard {
        let gate = Arc::clone(
            self.gates
                .entry(channel_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .value(),
        );
        gate.lock_owned().await
    }

    /// Copy of every channel's history.
    #[must_use]
    pub fn snapshot(&self) -> HistorySnapshot {
        self.histories
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Queue the current state for the background writer. Returns immediately.
    pub fn save(&self) {
        let Some(writer) = &self.writer else {
            return;
        };

        // Snapshots must reach the writer in the order they were taken.
        let _order = self
            .snapshot_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        writer.submit(self.snapshot());
    }
}
