pub mod file;
pub mod memory;

use crate::dao::storage::StorageResult;

pub use self::{file::FileStore, memory::MemoryStore};

/// Synchronous string-keyed store holding JSON-encoded values.
///
/// The scoreboard treats the store as exclusively owned: no other writer is
/// expected between a `set` and the next `get` of the same key.
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: String) -> StorageResult<()>;
    /// Report whether the backend can currently be written.
    fn health_check(&self) -> StorageResult<()>;
}
