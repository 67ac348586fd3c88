use dashmap::DashMap;

use crate::dao::storage::StorageResult;

use super::KeyValueStore;

/// Volatile store used by tests and when no store file is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with raw values.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
