//! Persistence for trak state.
//!
//! One save directory holds the disk-backed lists as JSON:
//!
//! ```text
//! <save-dir>/
//!   pending.json     # live, non-expired tasks
//!   expired.json     # tasks whose date passed without completion
//!   completed.json   # archived tasks
//!   tags.json        # tag categories with reference counts
//! ```
//!
//! The derived views (general/deadline/event/this-week) are rebuilt from
//! pending on load and never written. Writes are atomic (temp file +
//! rename) so a crash mid-save never leaves a half-written list.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::tags::TagCategory;
use crate::task::Task;

pub const PENDING_FILE: &str = "pending.json";
pub const EXPIRED_FILE: &str = "expired.json";
pub const COMPLETED_FILE: &str = "completed.json";
pub const TAGS_FILE: &str = "tags.json";

/// The disk-backed portion of the store state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub pending: Vec<Task>,
    pub expired: Vec<Task>,
    pub completed: Vec<Task>,
    pub tags: Vec<TagCategory>,
}

/// Port through which the orchestrator loads and saves task state. The
/// orchestrator holds this as an injected dependency; nothing else in the
/// core performs I/O.
pub trait TaskStorage {
    fn load(&self) -> Result<StoredState>;
    fn save(&self, state: &StoredState) -> Result<()>;
    fn save_dir(&self) -> &Path;
    fn set_save_dir(&mut self, dir: PathBuf) -> Result<()>;
}

/// File-backed storage keeping four JSON files in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    save_dir: PathBuf,
}

impl FileStorage {
    pub fn new(save_dir: PathBuf) -> Self {
        Self { save_dir }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn pending_file(&self) -> PathBuf {
        self.save_dir.join(PENDING_FILE)
    }

    pub fn expired_file(&self) -> PathBuf {
        self.save_dir.join(EXPIRED_FILE)
    }

    pub fn completed_file(&self) -> PathBuf {
        self.save_dir.join(COMPLETED_FILE)
    }

    pub fn tags_file(&self) -> PathBuf {
        self.save_dir.join(TAGS_FILE)
    }

    // =========================================================================
    // File I/O helpers (atomic writes for safety)
    // =========================================================================

    /// Read a JSON list, treating a missing file as empty.
    fn read_list<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        let list: Vec<T> = serde_json::from_str(&content)?;
        Ok(list)
    }

    /// Write JSON data atomically (write to temp, then rename).
    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        self.write_atomic(path, json.as_bytes())
    }

    /// Write data atomically using temp file + rename, so readers never see
    /// a partial file.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl TaskStorage for FileStorage {
    fn load(&self) -> Result<StoredState> {
        let state = StoredState {
            pending: self.read_list(&self.pending_file())?,
            expired: self.read_list(&self.expired_file())?,
            completed: self.read_list(&self.completed_file())?,
            tags: self.read_list(&self.tags_file())?,
        };
        tracing::debug!(
            dir = %self.save_dir.display(),
            pending = state.pending.len(),
            expired = state.expired.len(),
            completed = state.completed.len(),
            "loaded task state"
        );
        Ok(state)
    }

    fn save(&self, state: &StoredState) -> Result<()> {
        fs::create_dir_all(&self.save_dir)?;
        self.write_json(&self.pending_file(), &state.pending)?;
        self.write_json(&self.expired_file(), &state.expired)?;
        self.write_json(&self.completed_file(), &state.completed)?;
        self.write_json(&self.tags_file(), &state.tags)?;
        tracing::debug!(dir = %self.save_dir.display(), "saved task state");
        Ok(())
    }

    fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    fn set_save_dir(&mut self, dir: PathBuf) -> Result<()> {
        fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(Error::SaveDirUnusable(dir));
        }
        self.save_dir = dir;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn missing_files_load_as_empty_state() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());
        let state = storage.load().expect("load");
        assert_eq!(state, StoredState::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().expect("tempdir");
        let storage = FileStorage::new(dir.path().to_path_buf());

        let due = Utc.with_ymd_and_hms(2026, 3, 12, 9, 0, 0).unwrap();
        let state = StoredState {
            pending: vec![
                Task::floating("Buy milk").with_tags(["errand"]),
                Task::deadline("Report", due).with_priority(2),
            ],
            expired: vec![Task::deadline(
                "Old",
                Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            )],
            completed: vec![Task::floating("Done thing")],
            tags: vec![TagCategory {
                name: "errand".to_string(),
                count: 1,
            }],
        };

        storage.save(&state).expect("save");
        let loaded = storage.load().expect("load");
        assert_eq!(loaded, state);
        assert_eq!(loaded.pending[1].priority, 2);
    }

    #[test]
    fn save_creates_the_directory() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("deep").join("tasks");
        let storage = FileStorage::new(nested.clone());
        storage.save(&StoredState::default()).expect("save");
        assert!(nested.join(PENDING_FILE).exists());
    }

    #[test]
    fn set_save_dir_repoints_the_paths() {
        let dir = tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path().join("a"));
        let other = dir.path().join("b");
        storage.set_save_dir(other.clone()).expect("set dir");
        assert_eq!(storage.save_dir(), other.as_path());
        assert_eq!(storage.pending_file(), other.join(PENDING_FILE));
    }
}
