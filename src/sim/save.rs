/// Reward persistence: the contact number captured after the quest.
///
/// ## Files:
///   `reward.json`                      latest record, compact JSON
///   `keyquest_reward_<millis>.json`    exported copy, pretty JSON
///
/// Both live in the save directory: `[general] save_dir` from the config
/// if set, otherwise the executable's directory when writable, then
/// `~/.local/share/keyquest`, then the CWD.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRecord {
    pub phone_number: String,
    pub timestamp: DateTime<Utc>,
    pub game_completed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to read/write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reward record encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

const RECORD_FILE: &str = "reward.json";

fn default_save_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs won't be writable
            let test_path = parent.join(".write_test_keyquest");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/keyquest)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keyquest");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn export_filename(at: DateTime<Utc>) -> String {
    format!("keyquest_reward_{}.json", at.timestamp_millis())
}

fn write_file(path: &Path, contents: &str) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SaveError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ══════════════════════════════════════════════════════════════
// Store
// ══════════════════════════════════════════════════════════════

pub struct RewardStore {
    dir: PathBuf,
}

impl RewardStore {
    /// Store rooted at `save_dir`, or the platform default when `None`.
    pub fn new(save_dir: Option<&Path>) -> Self {
        let dir = match save_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_save_dir(),
        };
        RewardStore { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Persist `contact` with the current time, replacing any earlier record.
    pub fn save(&self, contact: &str) -> Result<RewardRecord, SaveError> {
        let record = RewardRecord {
            phone_number: contact.to_string(),
            timestamp: Utc::now(),
            game_completed: true,
        };
        let json = serde_json::to_string(&record)?;
        let path = self.record_path();
        write_file(&path, &json)?;
        log::info!("reward saved to {}", path.display());
        Ok(record)
    }

    /// The stored record, if one exists and parses.
    pub fn retrieve(&self) -> Option<RewardRecord> {
        let path = self.record_path();
        let text = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("ignoring unreadable {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write a pretty-printed copy of the stored record.
    /// `Ok(None)` when there is nothing to export.
    pub fn export_as_file(&self) -> Result<Option<PathBuf>, SaveError> {
        let record = match self.retrieve() {
            Some(r) => r,
            None => return Ok(None),
        };
        let json = serde_json::to_string_pretty(&record)?;
        let path = self.dir.join(export_filename(Utc::now()));
        write_file(&path, &json)?;
        log::info!("reward exported to {}", path.display());
        Ok(Some(path))
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, RewardStore) {
        let temp = TempDir::new().expect("temp");
        let store = RewardStore::new(Some(temp.path()));
        (temp, store)
    }

    #[test]
    fn retrieve_without_save_is_none() {
        let (_t, s) = store();
        assert!(s.retrieve().is_none());
    }

    #[test]
    fn save_then_retrieve() {
        let (_t, s) = store();
        let saved = s.save("(555) 123-4567").expect("save");
        assert!(saved.game_completed);
        assert_eq!(s.retrieve(), Some(saved));
    }

    #[test]
    fn stored_json_uses_camel_case_keys() {
        let (_t, s) = store();
        s.save("(555) 123-4567").expect("save");
        let text = std::fs::read_to_string(s.dir().join(RECORD_FILE)).expect("read");
        let v: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(v["phoneNumber"], "(555) 123-4567");
        assert_eq!(v["gameCompleted"], true);
        assert!(v["timestamp"].as_str().is_some_and(|t| t.contains('T')));
    }

    #[test]
    fn later_save_replaces_earlier() {
        let (_t, s) = store();
        s.save("(111) 111-1111").expect("save");
        s.save("(222) 222-2222").expect("save");
        assert_eq!(s.retrieve().map(|r| r.phone_number).as_deref(), Some("(222) 222-2222"));
    }

    #[test]
    fn corrupt_record_reads_as_none() {
        let (_t, s) = store();
        std::fs::write(s.dir().join(RECORD_FILE), "{not json").expect("write");
        assert!(s.retrieve().is_none());
    }

    #[test]
    fn export_without_record_writes_nothing() {
        let (t, s) = store();
        assert!(s.export_as_file().expect("export").is_none());
        assert_eq!(std::fs::read_dir(t.path()).expect("dir").count(), 0);
    }

    #[test]
    fn export_writes_pretty_copy() {
        let (_t, s) = store();
        let saved = s.save("(555) 123-4567").expect("save");
        let path = s.export_as_file().expect("export").expect("some path");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("keyquest_reward_"));
        assert!(name.ends_with(".json"));
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("\n  \"phoneNumber\""));
        let back: RewardRecord = serde_json::from_str(&text).expect("parse");
        assert_eq!(back, saved);
    }

    #[test]
    fn save_creates_missing_directory() {
        let temp = TempDir::new().expect("temp");
        let s = RewardStore::new(Some(&temp.path().join("nested/dir")));
        s.save("(555) 123-4567").expect("save");
        assert!(s.retrieve().is_some());
    }
}
