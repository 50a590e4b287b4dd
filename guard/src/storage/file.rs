//! File-backed session storage.
//!
//! Each session id maps to one JSON object file inside the sessions
//! directory. The file is the session: deleting it ends the session and drops
//! every marker with it.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::{GuardError, Result};
use crate::storage::SessionStorage;

/// Longest accepted session id.
const MAX_SESSION_ID_LEN: usize = 64;

/// Session storage persisted as a JSON file per session id.
#[derive(Debug)]
pub struct FileSessionStorage {
    session_id: String,
    path: PathBuf,
    // Serializes read-modify-write cycles on the session file.
    lock: Mutex<()>,
}

impl FileSessionStorage {
    /// Opens the session inside `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session id is invalid or `dir` cannot be created.
    pub fn with_dir(dir: &Path, session_id: &str) -> Result<Self> {
        Self::validate_session_id(session_id)?;

        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        Ok(Self {
            session_id: session_id.to_string(),
            path: dir.join(format!("{session_id}.json")),
            lock: Mutex::new(()),
        })
    }

    /// The session id this storage is bound to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ends the session by deleting its file.
    ///
    /// No-op if the session never stored anything.
    pub fn end_session(&self) -> Result<()> {
        let _guard = self.lock()?;
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(unavailable)?;
        }
        Ok(())
    }

    fn validate_session_id(session_id: &str) -> Result<()> {
        if session_id.is_empty() {
            return Err(GuardError::Config("session id cannot be empty".to_string()));
        }

        if session_id.len() > MAX_SESSION_ID_LEN {
            return Err(GuardError::Config(format!(
                "session id too long (max {MAX_SESSION_ID_LEN} characters)"
            )));
        }

        if !session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        {
            return Err(GuardError::Config(format!(
                "invalid session id '{session_id}': only letters, digits, '-' and '_' are allowed"
            )));
        }

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| GuardError::StorageUnavailable("session file lock poisoned".to_string()))
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(unavailable)?;
        serde_json::from_str(&contents).map_err(|e| {
            GuardError::StorageUnavailable(format!(
                "session file {} is corrupted: {e}",
                self.path.display()
            ))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(unavailable)?;
            }
            return Ok(());
        }

        let json = serde_json::to_string_pretty(entries)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        // Replace the file in one step so a crash never leaves half a session.
        let mut file = NamedTempFile::new_in(dir).map_err(unavailable)?;
        file.write_all(json.as_bytes()).map_err(unavailable)?;
        file.persist(&self.path).map_err(|e| unavailable(e.error))?;
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock()?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock()?;
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

fn unavailable(err: std::io::Error) -> GuardError {
    GuardError::StorageUnavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open(temp_dir: &TempDir, id: &str) -> FileSessionStorage {
        FileSessionStorage::with_dir(temp_dir.path(), id).unwrap()
    }

    #[test]
    fn set_and_get_value() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        storage.set("marker", "2024-01-01T00:00:00Z").unwrap();

        assert_eq!(
            storage.get("marker").unwrap(),
            Some("2024-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn get_missing_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        assert_eq!(storage.get("missing").unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        open(&temp_dir, "tab-1").set("k", "v").unwrap();

        let reopened = open(&temp_dir, "tab-1");
        assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn sessions_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let first = open(&temp_dir, "tab-1");
        let second = open(&temp_dir, "tab-2");

        first.set("k", "v").unwrap();

        assert_eq!(second.get("k").unwrap(), None);
    }

    #[test]
    fn removing_last_key_deletes_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        storage.set("k", "v").unwrap();
        assert!(storage.path().exists());

        storage.remove("k").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        storage.remove("missing").unwrap();
    }

    #[test]
    fn end_session_drops_all_markers() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.end_session().unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("b").unwrap(), None);
    }

    #[test]
    fn corrupted_file_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        std::fs::write(storage.path(), "{ invalid json }").unwrap();

        let err = storage.get("k").unwrap_err();
        assert!(matches!(err, GuardError::StorageUnavailable(_)));
    }

    #[test]
    fn reject_empty_session_id() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FileSessionStorage::with_dir(temp_dir.path(), "").is_err());
    }

    #[test]
    fn reject_path_traversal() {
        let temp_dir = TempDir::new().unwrap();

        assert!(FileSessionStorage::with_dir(temp_dir.path(), "../escape").is_err());
        assert!(FileSessionStorage::with_dir(temp_dir.path(), "foo/bar").is_err());
        assert!(FileSessionStorage::with_dir(temp_dir.path(), "foo\\bar").is_err());
    }

    #[test]
    fn reject_long_session_id() {
        let temp_dir = TempDir::new().unwrap();
        let long_id = "a".repeat(MAX_SESSION_ID_LEN + 1);

        assert!(FileSessionStorage::with_dir(temp_dir.path(), &long_id).is_err());
    }

    #[test]
    fn creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("sessions").join("nested");

        let storage = FileSessionStorage::with_dir(&nested, "tab-1").unwrap();
        storage.set("k", "v").unwrap();

        assert!(nested.join("tab-1.json").exists());
    }

    #[test]
    fn end_session_recovers_corrupted_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");
        std::fs::write(storage.path(), "{ half-writ").unwrap();

        storage.end_session().unwrap();

        assert!(!storage.path().exists());
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let temp_dir = TempDir::new().unwrap();
        let storage = open(&temp_dir, "tab-1");

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();

        let files: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("tab-1.json")]);
    }
}
