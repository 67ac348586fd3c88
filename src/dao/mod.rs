/// Key-value stores backing the scoreboard.
pub mod kv_store;
/// Persisted representations of the stored keys.
pub mod models;
/// Per-key load and save of the scoreboard state.
pub mod scoreboard_repository;
/// Storage abstraction layer errors.
pub mod storage;
