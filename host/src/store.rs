//! File-backed token store.
//!
//! Entries live in a small JSON object on disk so the token survives process
//! restarts. Read-modify-write cycles are serialised within the process, and
//! each write goes to a sibling temp file that is renamed over the old one.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use blog_api_core::{ApiError, TokenStore};

#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<BTreeMap<String, String>, ApiError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| ApiError::Storage(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(storage_error(e)),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(storage_error)?;
                parent
            }
            None => Path::new("."),
        };
        let content = serde_json::to_string_pretty(entries).map_err(|e| ApiError::Storage(e.to_string()))?;
        let mut file = NamedTempFile::new_in(dir).map_err(storage_error)?;
        file.write_all(content.as_bytes()).map_err(storage_error)?;
        file.as_file().sync_all().map_err(storage_error)?;
        file.persist(&self.path).map_err(|e| storage_error(e.error))?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), ApiError> {
        let _guard = self.lock.lock().map_err(|e| ApiError::Storage(e.to_string()))?;
        let mut entries = self.read()?;
        f(&mut entries);
        self.write(&entries)
    }
}

fn storage_error(err: io::Error) -> ApiError {
    ApiError::Storage(err.to_string())
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let _guard = self.lock.lock().map_err(|e| ApiError::Storage(e.to_string()))?;
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use blog_api_core::TOKEN_KEY;

    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn token_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("token.json");
        FileTokenStore::new(&path).set(TOKEN_KEY, "abc123").unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("abc123"));

        reopened.remove(TOKEN_KEY).unwrap();
        assert_eq!(FileTokenStore::new(&path).get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn other_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.set("activePath", "/article").unwrap();
        store.set(TOKEN_KEY, "abc").unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get("activePath").unwrap().as_deref(), Some("/article"));
    }

    #[test]
    fn writes_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let store = FileTokenStore::new(&path);
        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(TOKEN_KEY, "def").unwrap();
        store.remove(TOKEN_KEY).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["token.json"]);
        let content: BTreeMap<String, String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();
        let err = FileTokenStore::new(&path).get(TOKEN_KEY).unwrap_err();
        assert!(matches!(err, ApiError::Storage(_)));
    }
}
