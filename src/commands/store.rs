//! Persistent store of user-defined trigger phrase → response pairs
//!
//! The mapping lives in a single pretty-printed JSON object. A missing file
//! is an empty store, and so is a corrupt one; loading never fails.

use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of an upsert request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The pair is in memory; `persisted` is false if writing the file failed
    Stored { persisted: bool },
    /// Trigger or response was empty, nothing changed
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct CommandStore {
    path: PathBuf,
    commands: Arc<RwLock<BTreeMap<String, String>>>,
}

impl CommandStore {
    /// Open the store backed by `path`, loading whatever is there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let commands = Self::load(&path);
        info!(
            "Loaded {} custom command(s) from {}",
            commands.len(),
            path.display()
        );

        Self {
            path,
            commands: Arc::new(RwLock::new(commands)),
        }
    }

    /// Read the mapping persisted at `path`
    ///
    /// Returns an empty mapping when the file is absent or cannot be parsed.
    pub fn load(path: &Path) -> BTreeMap<String, String> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No custom command file at {}", path.display());
                return BTreeMap::new();
            }
            Err(e) => {
                warn!("Failed to read {}: {}. Starting with no custom commands.", path.display(), e);
                return BTreeMap::new();
            }
        };

        match parse_commands(&content) {
            Ok(commands) => commands,
            Err(e) => {
                warn!(
                    "Custom command file {} is corrupt ({}). Starting with no custom commands.",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Write the current mapping to disk
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so readers see either the old or the new mapping.
    pub fn save(&self) -> Result<()> {
        let content = {
            let commands = self.commands.read();
            serde_json::to_string_pretty(&*commands)
                .map_err(|e| crate::SaysoError::IOError(format!("Failed to serialize commands: {}", e)))?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = temp_path_for(&self.path);
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.write_all(b"\n")?;
        temp_file.sync_all()?;
        drop(temp_file);

        fs::rename(&temp_path, &self.path)?;
        debug!("Saved custom commands to {}", self.path.display());
        Ok(())
    }

    /// Insert or overwrite a custom command and persist it
    ///
    /// A failed write is logged; the in-memory mapping keeps the new pair.
    pub fn upsert(&self, trigger: &str, response: &str) -> UpsertOutcome {
        let trigger = normalize_trigger(trigger);
        let response = response.trim();
        if trigger.is_empty() || response.is_empty() {
            debug!("Ignoring custom command with empty trigger or response");
            return UpsertOutcome::Cancelled;
        }

        self.commands
            .write()
            .insert(trigger.clone(), response.to_string());
        info!("Custom command set for trigger '{}'", trigger);

        match self.save() {
            Ok(()) => UpsertOutcome::Stored { persisted: true },
            Err(e) => {
                warn!("Failed to save custom commands: {}", e);
                UpsertOutcome::Stored { persisted: false }
            }
        }
    }

    /// Exact-match lookup
    pub fn get(&self, trigger: &str) -> Option<String> {
        self.commands.read().get(trigger).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }
}

/// Trim and lowercase a trigger phrase
pub fn normalize_trigger(trigger: &str) -> String {
    trigger.trim().to_lowercase()
}

fn parse_commands(content: &str) -> serde_json::Result<BTreeMap<String, String>> {
    let raw: BTreeMap<String, String> = serde_json::from_str(content)?;
    Ok(raw
        .into_iter()
        .filter_map(|(trigger, response)| {
            let trigger = normalize_trigger(&trigger);
            (!trigger.is_empty()).then_some((trigger, response))
        })
        .collect())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = CommandStore::open(dir.path().join("absent.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = CommandStore::open(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_string_values_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.json");
        fs::write(&path, r#"{"lights": 3}"#).unwrap();

        assert!(CommandStore::load(&path).is_empty());
    }

    #[test]
    fn test_load_normalizes_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.json");
        fs::write(&path, r#"{"  Good Morning ": "Morning!", "   ": "dropped"}"#).unwrap();

        let commands = CommandStore::load(&path);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands.get("good morning").map(String::as_str), Some("Morning!"));
    }

    #[test]
    fn test_upsert_normalizes_trigger() {
        let dir = tempdir().unwrap();
        let store = CommandStore::open(dir.path().join("commands.json"));

        let outcome = store.upsert("  Open Sesame ", "The door is open");
        assert_eq!(outcome, UpsertOutcome::Stored { persisted: true });
        assert_eq!(store.get("open sesame").as_deref(), Some("The door is open"));
        assert_eq!(store.get("Open Sesame"), None);
    }

    #[test]
    fn test_upsert_rejects_empty_parts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("commands.json");
        let store = CommandStore::open(&path);

        assert_eq!(store.upsert("   ", "hello"), UpsertOutcome::Cancelled);
        assert_eq!(store.upsert("hello", ""), UpsertOutcome::Cancelled);
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_upsert_overwrites() {
        let dir = tempdir().unwrap();
        let store = CommandStore::open(dir.path().join("commands.json"));

        store.upsert("status", "all good");
        store.upsert("status", "all good");
        store.upsert("status", "still good");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("status").as_deref(), Some("still good"));
    }

    #[test]
    fn test_save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("commands.json");
        let store = CommandStore::open(&path);

        store.upsert("ping", "pong");

        assert!(path.exists());
        assert!(!temp_path_for(&path).exists());
        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("ping").map(String::as_str), Some("pong"));
    }

    #[test]
    fn test_failed_save_keeps_memory() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("commands.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), "x").unwrap();

        let store = CommandStore::open(&path);
        let outcome = store.upsert("ping", "pong");

        assert_eq!(outcome, UpsertOutcome::Stored { persisted: false });
        assert_eq!(store.get("ping").as_deref(), Some("pong"));
    }
}
