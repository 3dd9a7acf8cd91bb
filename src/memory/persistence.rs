//! JSON history file and the background writer that mirrors the store to it.
//!
//! The file is a single object mapping channel id to an array of
//! `{role, content}` turns. Writes go to a sibling temp file first and are
//! renamed into place, so a crash mid-write never leaves a torn file.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::memory::errors::{MemoryError, MemoryResult};
use crate::memory::history::{ConversationTurn, HistorySnapshot, trim_to};

const INDENT: &[u8] = b"    ";

/// Read the history file, falling back to an empty snapshot on any problem.
pub async fn read_history(path: &Path, max_entries: usize) -> HistorySnapshot {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "No history file found, starting fresh");
            return HistorySnapshot::new();
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "Could not read history file, starting fresh");
            return HistorySnapshot::new();
        }
    };

    match parse_history(&raw, max_entries) {
        Ok(snapshot) => {
            info!(
                path = %path.display(),
                channels = snapshot.len(),
                "Loaded chat history"
            );
            snapshot
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "History file is unusable, starting fresh");
            HistorySnapshot::new()
        }
    }
}

/// Parse history file content.
///
/// Channels whose value is not a valid turn array are skipped; the rest are
/// trimmed to `max_entries`.
///
/// # Errors
/// Returns an error if the content is not JSON or not a JSON object.
pub fn parse_history(raw: &str, max_entries: usize) -> MemoryResult<HistorySnapshot> {
    let Value::Object(channels) = serde_json::from_str::<Value>(raw)? else {
        return Err(MemoryError::InvalidHistory(
            "top-level value is not an object".to_string(),
        ));
    };

    let mut snapshot = HistorySnapshot::new();
    for (channel_id, entry) in channels {
        match serde_json::from_value::<Vec<ConversationTurn>>(entry) {
            Ok(mut turns) => {
                trim_to(&mut turns, max_entries);
                snapshot.insert(channel_id, turns);
            }
            Err(err) => {
                warn!(%channel_id, %err, "Skipping malformed channel history");
            }
        }
    }

    Ok(snapshot)
}

/// Serialize a snapshot with 4-space indentation.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_history(snapshot: &HistorySnapshot) -> MemoryResult<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    snapshot.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write a snapshot atomically (temp file, then rename).
///
/// # Errors
/// Returns an error if serialization or any filesystem step fails.
pub async fn write_history(path: &Path, snapshot: &HistorySnapshot) -> MemoryResult<()> {
    let bytes = render_history(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    tokio::fs::write(&temp, bytes).await?;
    tokio::fs::rename(&temp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("history"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Cloneable handle used to enqueue snapshots for the writer.
#[derive(Clone, Debug)]
pub struct HistorySender {
    sender: mpsc::UnboundedSender<HistorySnapshot>,
}

impl HistorySender {
    /// Queue a snapshot. Never blocks.
    pub fn submit(&self, snapshot: HistorySnapshot) {
        if self.sender.send(snapshot).is_err() {
            warn!("History writer has stopped; snapshot dropped");
        }
    }
}

/// Single background task that owns the history file.
pub struct HistoryWriter {
    path: PathBuf,
    receiver: mpsc::UnboundedReceiver<HistorySnapshot>,
    shutdown: Arc<Notify>,
}

impl HistoryWriter {
    /// Create a writer for `path` and the sender that feeds it.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> (Self, HistorySender) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = Self {
            path: path.into(),
            receiver,
            shutdown: Arc::new(Notify::new()),
        };
        (writer, HistorySender { sender })
    }

    /// Get a shutdown notifier. Notifying flushes the newest queued snapshot
    /// and stops the task.
    #[must_use]
    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Spawn the writer as a tokio task.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        info!(path = %self.path.display(), "Starting history writer");

        loop {
            tokio::select! {
                received = self.receiver.recv() => {
                    let Some(snapshot) = received else {
                        debug!("All history senders dropped");
                        break;
                    };
                    let newest = self.newest_pending(snapshot);
                    self.persist(&newest).await;
                }
                () = self.shutdown.notified() => {
                    if let Ok(snapshot) = self.receiver.try_recv() {
                        let newest = self.newest_pending(snapshot);
                        self.persist(&newest).await;
                    }
                    info!("History writer shutting down");
                    break;
                }
            }
        }
    }

    /// Skip straight to the most recent queued snapshot.
    fn newest_pending(&mut self, mut newest: HistorySnapshot) -> HistorySnapshot {
        while let Ok(next) = self.receiver.try_recv() {
            newest = next;
        }
        newest
    }

    async fn persist(&self, snapshot: &HistorySnapshot) {
        match write_history(&self.path, snapshot).await {
            Ok(()) => debug!(channels = snapshot.len(), "History saved"),
            Err(err) => warn!(path = %self.path.display(), %err, "Failed to save history"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(channel: &str, pairs: usize) -> HistorySnapshot {
        let mut turns = Vec::new();
        for i in 0..pairs {
            turns.push(ConversationTurn::user(format!("q{i}")));
            turns.push(ConversationTurn::assistant(format!("a{i}")));
        }
        HistorySnapshot::from([(channel.to_string(), turns)])
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat_history.json");
        let mut snapshot = snapshot_with("42", 2);
        snapshot.insert("7".to_string(), vec![ConversationTurn::user("héllo ✨")]);

        write_history(&path, &snapshot).await.expect("write");
        let loaded = read_history(&path, 12).await;
        assert_eq!(loaded, snapshot);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = read_history(&dir.path().join("absent.json"), 12).await;
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat_history.json");
        tokio::fs::write(&path, "{not json").await.expect("write");
        assert!(read_history(&path, 12).await.is_empty());
    }

    #[test]
    fn test_non_object_rejected() {
        let result = parse_history("[1, 2, 3]", 12);
        assert!(matches!(result, Err(MemoryError::InvalidHistory(_))));
    }

    #[test]
    fn test_malformed_channels_skipped_and_trimmed() {
        let raw = r#"{
            "1": "not a list",
            "2": [{"role": "user", "content": "hi"}, {"role": "model", "content": "hey"}],
            "3": [{"role": "user"}],
            "4": [
                {"role": "user", "content": "a"},
                {"role": "assistant", "content": "b"},
                {"role": "user", "content": "c"},
                {"role": "assistant", "content": "d"}
            ]
        }"#;
        let snapshot = parse_history(raw, 2).expect("parse");
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot["2"],
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hey")]
        );
        assert_eq!(
            snapshot["4"],
            vec![ConversationTurn::user("c"), ConversationTurn::assistant("d")]
        );
    }

    #[test]
    fn test_rendered_with_four_space_indent_and_unicode() {
        let snapshot = HistorySnapshot::from([(
            "9".to_string(),
            vec![ConversationTurn::user("💖")],
        )]);
        let rendered = String::from_utf8(render_history(&snapshot).expect("render")).expect("utf8");
        assert!(rendered.starts_with("{\n    \"9\": [\n        {"));
        assert!(rendered.contains("💖"));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = Path::new("/data/chat_history.json");
        assert_eq!(temp_path(path), PathBuf::from("/data/chat_history.json.tmp"));
    }

    #[tokio::test]
    async fn test_writer_persists_newest_snapshot_on_shutdown() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("chat_history.json");
        let (writer, sender) = HistoryWriter::new(&path);
        let shutdown = writer.shutdown_notifier();
        let handle = writer.spawn();

        sender.submit(snapshot_with("1", 1));
        sender.submit(snapshot_with("1", 2));
        sender.submit(snapshot_with("1", 3));
        shutdown.notify_one();
        handle.await.expect("writer task");

        let loaded = read_history(&path, 100).await;
        assert_eq!(loaded, snapshot_with("1", 3));
    }

    #[tokio::test]
    async fn test_writer_stops_when_senders_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat_history.json");
        let (writer, sender) = HistoryWriter::new(&path);
        let handle = writer.spawn();

        sender.submit(snapshot_with("5", 1));
        drop(sender);
        handle.await.expect("writer task");

        assert_eq!(read_history(&path, 100).await, snapshot_with("5", 1));
    }

    #[tokio::test]
    async fn test_submit_after_stop_does_not_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (writer, sender) = HistoryWriter::new(dir.path().join("h.json"));
        drop(writer);
        sender.submit(snapshot_with("1", 1));
    }
}
