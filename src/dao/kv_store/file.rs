//! Key-value store persisted as a single JSON object on disk.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, info, warn};

use crate::dao::storage::{StorageError, StorageResult};

use super::KeyValueStore;

/// File-backed store. Every `set` rewrites the whole file through a temporary
/// sibling so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty store. A corrupt file is moved aside to
    /// [`FileStore::backup_path`] and the store starts empty. An unreadable
    /// file is logged and also treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, String>>(&contents) {
                Ok(entries) => {
                    info!(
                        path = %path.display(),
                        keys = entries.len(),
                        "loaded scoreboard store"
                    );
                    entries
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse scoreboard store; starting empty"
                    );
                    back_up_corrupt_file(&path);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "scoreboard store not found; starting empty");
                BTreeMap::new()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read scoreboard store; starting empty"
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where a corrupt store file is moved before the store starts empty.
    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".bak");
        path.with_file_name(name)
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        let document = serde_json::to_string_pretty(entries).map_err(|source| {
            StorageError::unavailable("failed to serialize store document".into(), source)
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                StorageError::unavailable(
                    format!("failed to create directory `{}`", parent.display()),
                    source,
                )
            })?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, document).map_err(|source| {
            StorageError::unavailable(format!("failed to write `{}`", tmp.display()), source)
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            StorageError::unavailable(
                format!("failed to replace `{}`", self.path.display()),
                source,
            )
        })?;

        debug!(path = %self.path.display(), "flushed scoreboard store");
        Ok(())
    }
}

fn back_up_corrupt_file(path: &Path) {
    let backup = FileStore::backup_path(path);
    match fs::rename(path, &backup) {
        Ok(()) => warn!(
            path = %path.display(),
            backup = %backup.display(),
            "corrupt scoreboard store moved aside"
        ),
        Err(err) => warn!(
            path = %path.display(),
            error = %err,
            "failed to back up corrupt scoreboard store"
        ),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut entries = self.entries();
        entries.insert(key.to_owned(), value);
        self.flush(&entries)
    }

    fn health_check(&self) -> StorageResult<()> {
        let entries = self.entries();
        self.flush(&entries)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("scoreboard-{}-{nanos}", std::process::id()))
            .join(name)
    }

    #[test]
    fn values_survive_reopen() {
        let path = scratch_path("store.json");
        let store = FileStore::open(&path);
        store.set("teams", "[\"A\",\"B\"]".into()).unwrap();
        store.set("scoreIndex", "3".into()).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.get("teams").unwrap().as_deref(),
            Some("[\"A\",\"B\"]")
        );
        assert_eq!(reopened.get("scoreIndex").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("actionLog").unwrap(), None);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let path = scratch_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("teams").unwrap(), None);
        assert_eq!(
            fs::read_to_string(FileStore::backup_path(&path)).unwrap(),
            "{ not json"
        );

        store.set("teams", "[]".into()).unwrap();
        assert_eq!(
            FileStore::open(&path).get("teams").unwrap().as_deref(),
            Some("[]")
        );

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn truncated_file_is_kept_after_next_write() {
        let path = scratch_path("store.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let truncated = r#"{"teams":"[\"A\",\"B\"]","scores":"[40,10]""#;
        fs::write(&path, truncated).unwrap();

        let store = FileStore::open(&path);
        store.set("scoreIndex", "0".into()).unwrap();

        let backup = FileStore::backup_path(&path);
        assert_eq!(backup.file_name().unwrap(), "store.json.bak");
        assert_eq!(fs::read_to_string(&backup).unwrap(), truncated);
        assert_eq!(
            FileStore::open(&path).get("scoreIndex").unwrap().as_deref(),
            Some("0")
        );

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
