//! Couples the scoreboard state machine with its persistence: every command runs against the
//! in-memory [`Scoreboard`] first, then the keys it can change are written back to the store.

use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    dao::{
        scoreboard_repository::{ScoreboardRepository, StoreKey},
        storage::StorageResult,
    },
    error::ServiceError,
    state::{
        game::TeamResult,
        state_machine::{CommandError, Scoreboard, ScoreboardRules, ScoreboardView},
    },
};

/// Owner of the live scoreboard and the repository it is mirrored to.
pub struct ScoreboardService {
    scoreboard: Scoreboard,
    repository: ScoreboardRepository,
    strict_selection: bool,
}

impl ScoreboardService {
    /// Restore the scoreboard from the repository using the configured rules.
    pub fn open(repository: ScoreboardRepository, config: &AppConfig) -> Self {
        Self::with_rules(repository, config.rules(), config.strict_selection())
    }

    /// Restore the scoreboard from the repository with explicit rules.
    pub fn with_rules(
        repository: ScoreboardRepository,
        rules: ScoreboardRules,
        strict_selection: bool,
    ) -> Self {
        let scoreboard = Scoreboard::restore(rules, repository.load());
        info!(
            phase = ?scoreboard.phase(),
            teams = scoreboard.teams().len(),
            awards = scoreboard.award_count(),
            "scoreboard restored"
        );

        Self {
            scoreboard,
            repository,
            strict_selection,
        }
    }

    /// Owned copy of the current state.
    pub fn view(&self) -> ScoreboardView {
        self.scoreboard.view()
    }

    /// Stage a team name for the next game. Blank names are ignored.
    pub fn add_staged_team(&mut self, name: &str) -> Result<ScoreboardView, ServiceError> {
        if self.scoreboard.add_staged_team(name).map_err(rejected)? {
            debug!(staged = self.scoreboard.staged_teams().len(), "team staged");
        } else {
            debug!("ignored blank team name");
        }
        Ok(self.view())
    }

    /// Start the game with the staged teams.
    pub fn start_game(&mut self) -> Result<ScoreboardView, ServiceError> {
        self.scoreboard.start_game().map_err(rejected)?;
        info!(teams = ?self.scoreboard.teams(), "game started");
        self.persist(&StoreKey::ALL)?;
        Ok(self.view())
    }

    /// Arm a team for the next award.
    ///
    /// Out-of-range indices are ignored unless strict selection is enabled.
    pub fn select_team(&mut self, index: i64) -> Result<ScoreboardView, ServiceError> {
        match self.scoreboard.select_team(index) {
            Ok(()) => debug!(index, "team selected"),
            Err(CommandError::InvalidIndex { index, len }) if !self.strict_selection => {
                debug!(index, len, "ignored out-of-range team selection");
            }
            Err(err) => return Err(rejected(err)),
        }
        Ok(self.view())
    }

    /// Award points to the selected team.
    pub fn award_points(&mut self, points: u32) -> Result<ScoreboardView, ServiceError> {
        let award = self.scoreboard.award_points(points).map_err(rejected)?;
        info!(team = %award.team_name, points = award.points, "points awarded");
        self.persist(&StoreKey::SCORING)?;
        Ok(self.view())
    }

    /// Revert the most recent award.
    pub fn undo(&mut self) -> Result<ScoreboardView, ServiceError> {
        self.scoreboard.undo().map_err(rejected)?;
        info!(awards = self.scoreboard.award_count(), "last award undone");
        self.persist(&StoreKey::SCORING)?;
        Ok(self.view())
    }

    /// Zero all scores, keeping the teams.
    pub fn reset_scores(&mut self) -> Result<ScoreboardView, ServiceError> {
        self.scoreboard.reset_scores().map_err(rejected)?;
        info!("scores reset");
        self.persist(&StoreKey::SCORING)?;
        Ok(self.view())
    }

    /// Drop the whole game and return to setup.
    pub fn reset_game(&mut self) -> Result<ScoreboardView, ServiceError> {
        self.scoreboard.reset_game();
        info!("game reset");
        self.persist(&StoreKey::ALL)?;
        Ok(self.view())
    }

    /// Final standings, highest score first.
    pub fn finish_game(&self) -> Result<Vec<TeamResult>, ServiceError> {
        let results = self.scoreboard.finish_game().map_err(rejected)?;
        info!(teams = results.len(), "final standings computed");
        Ok(results)
    }

    /// Check that the backing store accepts writes.
    pub fn health_check(&self) -> StorageResult<()> {
        self.repository.health_check()
    }

    fn persist(&self, keys: &[StoreKey]) -> Result<(), ServiceError> {
        self.repository.save(&self.scoreboard, keys).map_err(|err| {
            warn!(error = %err, "scoreboard change kept in memory but not persisted");
            ServiceError::from(err)
        })
    }
}

fn rejected(err: CommandError) -> ServiceError {
    debug!(error = %err, "command rejected");
    ServiceError::Rejected(err)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::{
            kv_store::{KeyValueStore, MemoryStore},
            storage::StorageError,
        },
        state::state_machine::ScoreboardPhase,
    };

    fn service_over(store: Arc<dyn KeyValueStore>, strict: bool) -> ScoreboardService {
        ScoreboardService::with_rules(
            ScoreboardRepository::new(store),
            ScoreboardRules::default(),
            strict,
        )
    }

    fn started(store: Arc<dyn KeyValueStore>) -> ScoreboardService {
        let mut service = service_over(store, false);
        service.add_staged_team("A").unwrap();
        service.add_staged_team("B").unwrap();
        service.start_game().unwrap();
        service
    }

    #[test]
    fn state_survives_reopening_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut service = started(store.clone());
        service.select_team(0).unwrap();
        service.award_points(20).unwrap();
        service.select_team(1).unwrap();
        service.award_points(10).unwrap();
        service.select_team(1).unwrap();
        let before = service.view();

        let reopened = service_over(store, false).view();
        assert_eq!(reopened.phase, ScoreboardPhase::Active);
        assert_eq!(reopened.teams, before.teams);
        assert_eq!(reopened.scores, vec![20, 10]);
        assert_eq!(reopened.award_count, 2);
        assert_eq!(reopened.last_award, before.last_award);
        assert_eq!(reopened.history_depth, 2);
        assert_eq!(reopened.action_log, before.action_log);
        assert_eq!(reopened.selected_team, None);
    }

    #[test]
    fn undo_is_persisted() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut service = started(store.clone());
        service.select_team(0).unwrap();
        service.award_points(50).unwrap();
        service.undo().unwrap();

        let reopened = service_over(store, false).view();
        assert_eq!(reopened.scores, vec![0, 0]);
        assert_eq!(reopened.history_depth, 0);
        assert!(reopened.action_log.is_empty());
    }

    #[test]
    fn reset_game_clears_the_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut service = started(store.clone());
        service.select_team(1).unwrap();
        service.award_points(30).unwrap();
        service.reset_game().unwrap();

        assert_eq!(store.get("teams").unwrap().as_deref(), Some("[]"));
        assert_eq!(store.get("lastScoreTeam").unwrap().as_deref(), Some("null"));
        assert_eq!(service_over(store, false).view().phase, ScoreboardPhase::Setup);
    }

    #[test]
    fn out_of_range_selection_is_ignored_by_default() {
        let mut service = started(Arc::new(MemoryStore::new()));
        let view = service.select_team(7).unwrap();
        assert_eq!(view.selected_team, None);
    }

    #[test]
    fn negative_selection_is_ignored_by_default() {
        let mut service = started(Arc::new(MemoryStore::new()));
        service.select_team(1).unwrap();
        let view = service.select_team(-1).unwrap();
        assert_eq!(view.selected_team, Some(1));
    }

    #[test]
    fn strict_selection_reports_out_of_range_index() {
        let mut service = service_over(Arc::new(MemoryStore::new()), true);
        service.add_staged_team("A").unwrap();
        service.add_staged_team("B").unwrap();
        service.start_game().unwrap();

        let err = service.select_team(2).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Rejected(CommandError::InvalidIndex { index: 2, len: 2 })
        ));
    }

    #[test]
    fn rejected_commands_are_surfaced() {
        let mut service = service_over(Arc::new(MemoryStore::new()), false);
        service.add_staged_team("Solo").unwrap();
        assert!(matches!(
            service.start_game(),
            Err(ServiceError::Rejected(CommandError::InsufficientTeams { .. }))
        ));
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: String) -> StorageResult<()> {
            Err(StorageError::unavailable(
                format!("cannot write `{key}`"),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ))
        }

        fn health_check(&self) -> StorageResult<()> {
            self.set("health", String::new())
        }
    }

    #[test]
    fn write_failures_keep_the_applied_command() {
        let mut service = service_over(Arc::new(ReadOnlyStore), false);
        service.add_staged_team("A").unwrap();
        service.add_staged_team("B").unwrap();

        assert!(matches!(
            service.start_game(),
            Err(ServiceError::Unavailable(_))
        ));
        assert_eq!(service.view().phase, ScoreboardPhase::Active);
        assert!(service.health_check().is_err());
    }
}
