//! Durable sync-progress checkpoints.
//!
//! The checkpoint file is a JSON map from book identity (`book_path`)
//! to a [`Checkpoint`] record. It is read once at run start and written
//! once at run end. Loading fails soft: a missing or corrupt file yields
//! an empty map so corruption can never abort a run; the worst outcome
//! is a redundant refetch. Saving is atomic (temp file + rename) and
//! best-effort: the caller logs a failed save and moves on, because the
//! content files already written are not at risk.
//!
//! The map is a `BTreeMap` so repeated saves of identical state produce
//! byte-identical files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Durable record of sync progress for one book.
///
/// Overwritten (not appended) on each successful sync. After a completed
/// run, `chapter_count` always equals the number of chapter blocks in
/// the file at `content_file`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    /// Resolved display name at last sync
    pub name: String,

    /// Resolved author at last sync
    pub author: String,

    /// Chapters represented in the content file (index total of the
    /// last sync, including failed-placeholder chapters)
    pub chapter_count: usize,

    /// Where the merged document was written
    pub content_file: PathBuf,

    /// When the last successful sync finished
    pub updated_at: DateTime<Utc>,
}

/// In-memory form of the checkpoint file.
pub type CheckpointMap = BTreeMap<String, Checkpoint>;

/// Loads and saves the checkpoint file.
///
/// # Examples
///
/// ```rust,no_run
/// use novelsync::checkpoint::CheckpointStore;
///
/// # async fn example() -> novelsync::Result<()> {
/// let store = CheckpointStore::new("state.json");
/// let mut state = store.load().await;
/// // ... sync books, updating `state` ...
/// store.save(&state).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint map, failing soft.
    ///
    /// A missing file is normal (first run). A corrupt file is logged
    /// and treated as empty; it never surfaces as an error.
    pub async fn load(&self) -> CheckpointMap {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CheckpointMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read state file, starting empty");
                return CheckpointMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt state file, starting empty");
                CheckpointMap::new()
            }
        }
    }

    /// Saves the full checkpoint map, overwriting atomically.
    ///
    /// The map is serialized to a sibling temp file which is then
    /// renamed over the target, so a crash mid-save leaves the previous
    /// state intact.
    pub async fn save(&self, state: &CheckpointMap) -> Result<()> {
        let payload = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload.as_bytes()).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_round_trips_through_json() {
        let checkpoint = Checkpoint {
            name: "示例小说".to_string(),
            author: "佚名".to_string(),
            chapter_count: 42,
            content_file: PathBuf::from("output/示例小说-佚名.txt"),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&checkpoint).unwrap();
        let parsed: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, checkpoint);
    }

    #[test]
    fn map_serialization_is_key_ordered() {
        let mut state = CheckpointMap::new();
        for key in ["/9/9/", "/1/1/", "/5/5/"] {
            state.insert(
                key.to_string(),
                Checkpoint {
                    name: "n".into(),
                    author: "a".into(),
                    chapter_count: 0,
                    content_file: PathBuf::from("f"),
                    updated_at: DateTime::<Utc>::MIN_UTC,
                },
            );
        }

        let json = serde_json::to_string(&state).unwrap();
        let first = json.find("/1/1/").unwrap();
        let mid = json.find("/5/5/").unwrap();
        let last = json.find("/9/9/").unwrap();
        assert!(first < mid && mid < last);
    }
}
