//! Maps scoreboard fields onto individual keys of a [`KeyValueStore`].
//!
//! Each key is decoded on its own: a missing, unreadable or corrupt value
//! falls back to its default without affecting the other keys.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    dao::{
        kv_store::KeyValueStore,
        models::{ActionLogEntity, ScoreSnapshotEntity, ScoresEntity, last_award_from_parts},
        storage::{StorageError, StorageResult},
    },
    state::state_machine::{PersistedState, Scoreboard},
};

/// Keys written to the store, one per persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Team names.
    Teams,
    /// Score table.
    Scores,
    /// Award count.
    ScoreIndex,
    /// Points of the last award.
    LastScore,
    /// Team of the last award.
    LastScoreTeam,
    /// Undo snapshots.
    ScoreHistory,
    /// Award log.
    ActionLog,
}

impl StoreKey {
    /// Every persisted key.
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Teams,
        StoreKey::Scores,
        StoreKey::ScoreIndex,
        StoreKey::LastScore,
        StoreKey::LastScoreTeam,
        StoreKey::ScoreHistory,
        StoreKey::ActionLog,
    ];

    /// Keys touched by awards, undo and score resets (everything but teams).
    pub const SCORING: [StoreKey; 6] = [
        StoreKey::Scores,
        StoreKey::ScoreIndex,
        StoreKey::LastScore,
        StoreKey::LastScoreTeam,
        StoreKey::ScoreHistory,
        StoreKey::ActionLog,
    ];

    /// Name of the key inside the store.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Teams => "teams",
            StoreKey::Scores => "scores",
            StoreKey::ScoreIndex => "scoreIndex",
            StoreKey::LastScore => "lastScore",
            StoreKey::LastScoreTeam => "lastScoreTeam",
            StoreKey::ScoreHistory => "scoreHistory",
            StoreKey::ActionLog => "actionLog",
        }
    }
}

/// Loads and saves scoreboard fields through a shared key-value store.
#[derive(Clone)]
pub struct ScoreboardRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ScoreboardRepository {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read every persisted field. Never fails; bad keys decode to defaults.
    pub fn load(&self) -> PersistedState {
        let teams: Vec<String> = self.decode(StoreKey::Teams);
        let ScoresEntity(scores) = self.decode(StoreKey::Scores);
        let award_count: u64 = self.decode(StoreKey::ScoreIndex);
        let last_points: u32 = self.decode(StoreKey::LastScore);
        let last_team: Option<String> = self.decode(StoreKey::LastScoreTeam);
        let history: Vec<ScoreSnapshotEntity> = self.decode(StoreKey::ScoreHistory);
        let action_log: Vec<ActionLogEntity> = self.decode(StoreKey::ActionLog);

        PersistedState {
            teams,
            scores,
            award_count,
            last_award: last_award_from_parts(last_team, last_points),
            history: history.into_iter().map(Into::into).collect(),
            action_log: action_log.into_iter().map(Into::into).collect(),
        }
    }

    /// Write the given keys from the current scoreboard.
    ///
    /// Writes are not atomic across keys. Every key is attempted even when an
    /// earlier one fails; the first failure is returned.
    pub fn save(&self, scoreboard: &Scoreboard, keys: &[StoreKey]) -> StorageResult<()> {
        let mut first_error = None;

        for &key in keys {
            let result = encode_key(scoreboard, key)
                .and_then(|value| self.store.set(key.as_str(), value));
            if let Err(err) = result {
                warn!(key = key.as_str(), error = %err, "failed to persist scoreboard key");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(keys = keys.len(), "persisted scoreboard keys");
                Ok(())
            }
        }
    }

    /// Check that the store accepts writes.
    pub fn health_check(&self) -> StorageResult<()> {
        self.store.health_check()
    }

    fn decode<T>(&self, key: StoreKey) -> T
    where
        T: DeserializeOwned + Default,
    {
        let raw = match self.store.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "failed to read key; using default");
                return T::default();
            }
        };

        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!(key = key.as_str(), error = %err, "failed to decode key; using default");
                T::default()
            }
        }
    }
}

fn encode_key(scoreboard: &Scoreboard, key: StoreKey) -> StorageResult<String> {
    let last_award = scoreboard.last_award();
    match key {
        StoreKey::Teams => encode(key, scoreboard.teams()),
        StoreKey::Scores => encode(key, scoreboard.scores()),
        StoreKey::ScoreIndex => encode(key, &scoreboard.award_count()),
        StoreKey::LastScore => encode(key, &last_award.map_or(0, |award| award.points)),
        StoreKey::LastScoreTeam => encode(key, &last_award.map(|award| &award.team_name)),
        StoreKey::ScoreHistory => {
            let history: Vec<ScoreSnapshotEntity> = scoreboard.history().map(Into::into).collect();
            encode(key, &history)
        }
        StoreKey::ActionLog => {
            let log: Vec<ActionLogEntity> = scoreboard.action_log().map(Into::into).collect();
            encode(key, &log)
        }
    }
}

fn encode<T>(key: StoreKey, value: &T) -> StorageResult<String>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.as_str(),
        source,
    })
}
