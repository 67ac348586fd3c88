use std::collections::VecDeque;

use thiserror::Error;

use crate::state::game::{ActionLogEntry, LastAward, ScoreSnapshot, TeamResult};

/// Point values offered to the host when no configuration overrides them.
pub const DEFAULT_POINT_VALUES: [u32; 4] = [10, 20, 30, 50];
/// Smallest roster that can start a game.
pub const MIN_TEAMS: usize = 2;

/// High-level phases the scoreboard can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreboardPhase {
    /// No teams are registered; names are being collected.
    Setup,
    /// Teams are registered and points can be awarded.
    Active,
}

/// Commands accepted by the [`Scoreboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Append a name to the staging roster.
    AddStagedTeam,
    /// Turn the staging roster into the active team list.
    StartGame,
    /// Arm a team for the next award.
    SelectTeam,
    /// Award points to the armed team.
    AwardPoints,
    /// Revert the most recent award.
    Undo,
    /// Zero every score while keeping the teams.
    ResetScores,
    /// Drop everything and return to setup.
    ResetGame,
    /// Compute the final standings.
    FinishGame,
}

/// Validation outcomes reported back to the host. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Fewer than [`MIN_TEAMS`] names were staged.
    #[error("at least {required} teams are required to start a game (staged: {staged})")]
    InsufficientTeams {
        /// Minimum roster size.
        required: usize,
        /// Names currently staged.
        staged: usize,
    },
    /// An award was requested while no team is armed.
    #[error("select a team before awarding points")]
    NoTeamSelected,
    /// Undo was requested with an empty history.
    #[error("there is nothing to undo")]
    NothingToUndo,
    /// A selection pointed outside the team list.
    #[error("team index {index} is out of range ({len} teams)")]
    InvalidIndex {
        /// Requested index, possibly negative.
        index: i64,
        /// Number of registered teams.
        len: usize,
    },
    /// The requested points are not part of the configured set.
    #[error("{points} is not an allowed point value")]
    PointsNotAllowed {
        /// Rejected value.
        points: u32,
    },
    /// The award would overflow a score or the award counter.
    #[error("awarding {points} points to {team_name} would overflow the scoreboard")]
    ScoreOverflow {
        /// Team that would receive the points.
        team_name: String,
        /// Rejected value.
        points: u32,
    },
    /// The command does not apply to the current phase.
    #[error("{command:?} cannot be applied while in {phase:?}")]
    WrongPhase {
        /// Command that was rejected.
        command: Command,
        /// Phase the scoreboard was in.
        phase: ScoreboardPhase,
    },
}

/// Tunables that shape scoring without changing the state machine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardRules {
    /// Point increments the host may award.
    pub point_values: Vec<u32>,
    /// Maximum number of undo snapshots kept; `None` keeps all of them.
    pub history_limit: Option<usize>,
}

impl Default for ScoreboardRules {
    fn default() -> Self {
        Self {
            point_values: DEFAULT_POINT_VALUES.to_vec(),
            history_limit: None,
        }
    }
}

/// Fields that survive a restart. Everything else is transient.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistedState {
    /// Registered team names, in insertion order.
    pub teams: Vec<String>,
    /// Per-team totals.
    pub scores: Vec<i64>,
    /// Awards made since the last reset.
    pub award_count: u64,
    /// Most recent award.
    pub last_award: Option<LastAward>,
    /// Undo stack, oldest first.
    pub history: Vec<ScoreSnapshot>,
    /// Award log, newest first.
    pub action_log: Vec<ActionLogEntry>,
}

/// Owned copy of the whole scoreboard handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardView {
    /// Current phase.
    pub phase: ScoreboardPhase,
    /// Registered teams.
    pub teams: Vec<String>,
    /// Scores, always as long as `teams`.
    pub scores: Vec<i64>,
    /// Names waiting for the game to start.
    pub staged_teams: Vec<String>,
    /// Team armed for the next award.
    pub selected_team: Option<usize>,
    /// Most recent award.
    pub last_award: Option<LastAward>,
    /// Awards made since the last reset.
    pub award_count: u64,
    /// Number of awards that can still be undone.
    pub history_depth: usize,
    /// Award log, newest first.
    pub action_log: Vec<ActionLogEntry>,
    /// Point increments the host may award.
    pub point_values: Vec<u32>,
}

impl ScoreboardView {
    /// Whether an undo would currently succeed.
    pub fn can_undo(&self) -> bool {
        self.history_depth > 0
    }
}

/// State machine owning every team, score and history record.
#[derive(Debug, Clone)]
pub struct Scoreboard {
    rules: ScoreboardRules,
    teams: Vec<String>,
    scores: Vec<i64>,
    staging: Vec<String>,
    pending: Option<usize>,
    last_award: Option<LastAward>,
    award_count: u64,
    history: VecDeque<ScoreSnapshot>,
    action_log: VecDeque<ActionLogEntry>,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::new(ScoreboardRules::default())
    }
}

impl Scoreboard {
    /// Create an empty scoreboard in the setup phase.
    pub fn new(rules: ScoreboardRules) -> Self {
        Self {
            rules,
            teams: Vec::new(),
            scores: Vec::new(),
            staging: Vec::new(),
            pending: None,
            last_award: None,
            award_count: 0,
            history: VecDeque::new(),
            action_log: VecDeque::new(),
        }
    }

    /// Rebuild a scoreboard from persisted fields.
    ///
    /// Scores are padded with zeros (or truncated) to match the team list, and
    /// the history is trimmed to the configured limit keeping the newest
    /// snapshots.
    pub fn restore(rules: ScoreboardRules, persisted: PersistedState) -> Self {
        let PersistedState {
            teams,
            mut scores,
            award_count,
            last_award,
            history,
            action_log,
        } = persisted;

        scores.resize(teams.len(), 0);

        let mut history: VecDeque<ScoreSnapshot> = history.into();
        if let Some(limit) = rules.history_limit {
            while history.len() > limit {
                history.pop_front();
            }
        }

        Self {
            rules,
            teams,
            scores,
            staging: Vec::new(),
            pending: None,
            last_award,
            award_count,
            history,
            action_log: action_log.into(),
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> ScoreboardPhase {
        if self.teams.is_empty() {
            ScoreboardPhase::Setup
        } else {
            ScoreboardPhase::Active
        }
    }

    /// Rules the scoreboard was built with.
    pub fn rules(&self) -> &ScoreboardRules {
        &self.rules
    }

    /// Registered team names.
    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    /// Per-team totals as stored.
    pub fn scores(&self) -> &[i64] {
        &self.scores
    }

    /// Awards made since the last reset.
    pub fn award_count(&self) -> u64 {
        self.award_count
    }

    /// Most recent award, if any.
    pub fn last_award(&self) -> Option<&LastAward> {
        self.last_award.as_ref()
    }

    /// Undo stack, oldest snapshot first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &ScoreSnapshot> {
        self.history.iter()
    }

    /// Award log, newest entry first.
    pub fn action_log(&self) -> impl ExactSizeIterator<Item = &ActionLogEntry> {
        self.action_log.iter()
    }

    /// Team currently armed for the next award.
    pub fn selected_team(&self) -> Option<usize> {
        self.pending
    }

    /// Names collected during setup.
    pub fn staged_teams(&self) -> &[String] {
        &self.staging
    }

    /// Score of the team at `index`, treating missing entries as zero.
    pub fn score_of(&self, index: usize) -> i64 {
        self.scores.get(index).copied().unwrap_or(0)
    }

    /// Produce an owned copy of the current state for display.
    pub fn view(&self) -> ScoreboardView {
        ScoreboardView {
            phase: self.phase(),
            teams: self.teams.clone(),
            scores: (0..self.teams.len()).map(|i| self.score_of(i)).collect(),
            staged_teams: self.staging.clone(),
            selected_team: self.pending,
            last_award: self.last_award.clone(),
            award_count: self.award_count,
            history_depth: self.history.len(),
            action_log: self.action_log.iter().cloned().collect(),
            point_values: self.rules.point_values.clone(),
        }
    }

    /// Stage a team name. Blank names are ignored and reported as `Ok(false)`.
    pub fn add_staged_team(&mut self, name: &str) -> Result<bool, CommandError> {
        self.require_phase(Command::AddStagedTeam, ScoreboardPhase::Setup)?;

        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        self.staging.push(name.to_owned());
        Ok(true)
    }

    /// Promote the staging roster to the team list and zero every score.
    pub fn start_game(&mut self) -> Result<(), CommandError> {
        self.require_phase(Command::StartGame, ScoreboardPhase::Setup)?;

        if self.staging.len() < MIN_TEAMS {
            return Err(CommandError::InsufficientTeams {
                required: MIN_TEAMS,
                staged: self.staging.len(),
            });
        }

        self.teams = std::mem::take(&mut self.staging);
        self.scores = vec![0; self.teams.len()];
        self.clear_scoring_history();
        Ok(())
    }

    /// Arm the team at `index` for the next award.
    pub fn select_team(&mut self, index: i64) -> Result<(), CommandError> {
        self.require_phase(Command::SelectTeam, ScoreboardPhase::Active)?;

        let len = self.teams.len();
        let slot = usize::try_from(index)
            .ok()
            .filter(|&slot| slot < len)
            .ok_or(CommandError::InvalidIndex { index, len })?;

        self.pending = Some(slot);
        Ok(())
    }

    /// Award `points` to the armed team and record the award for undo.
    ///
    /// All validation happens before the first mutation, so a failed award
    /// leaves the scoreboard untouched.
    pub fn award_points(&mut self, points: u32) -> Result<&LastAward, CommandError> {
        self.require_phase(Command::AwardPoints, ScoreboardPhase::Active)?;

        if !self.rules.point_values.contains(&points) {
            return Err(CommandError::PointsNotAllowed { points });
        }

        let index = self.pending.ok_or(CommandError::NoTeamSelected)?;
        let team_name = self
            .teams
            .get(index)
            .cloned()
            .ok_or(CommandError::NoTeamSelected)?;

        let new_score = self.score_of(index).checked_add(i64::from(points));
        let new_count = self.award_count.checked_add(1);
        let (Some(new_score), Some(new_count)) = (new_score, new_count) else {
            return Err(CommandError::ScoreOverflow { team_name, points });
        };

        self.history.push_back(ScoreSnapshot {
            scores: self.scores.clone(),
            award_count: self.award_count,
            last_award: self.last_award.clone(),
        });
        if let Some(limit) = self.rules.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }

        self.action_log
            .push_front(ActionLogEntry::now(team_name.clone(), points));

        if self.scores.len() <= index {
            self.scores.resize(index + 1, 0);
        }
        self.scores[index] = new_score;
        self.award_count = new_count;
        self.pending = None;

        Ok(self.last_award.insert(LastAward { team_name, points }))
    }

    /// Revert the most recent award. The pending selection is left as is.
    pub fn undo(&mut self) -> Result<ScoreSnapshot, CommandError> {
        self.require_phase(Command::Undo, ScoreboardPhase::Active)?;

        let snapshot = self.history.pop_back().ok_or(CommandError::NothingToUndo)?;
        self.scores = snapshot.scores.clone();
        self.award_count = snapshot.award_count;
        self.last_award = snapshot.last_award.clone();
        self.action_log.pop_front();
        Ok(snapshot)
    }

    /// Zero every score and forget the award history, keeping the teams.
    pub fn reset_scores(&mut self) -> Result<(), CommandError> {
        self.require_phase(Command::ResetScores, ScoreboardPhase::Active)?;

        self.scores = vec![0; self.teams.len()];
        self.clear_scoring_history();
        Ok(())
    }

    /// Drop every team, score and staged name and return to setup.
    pub fn reset_game(&mut self) {
        self.teams.clear();
        self.scores.clear();
        self.staging.clear();
        self.clear_scoring_history();
    }

    /// Rank teams by score, highest first. Ties keep registration order.
    pub fn finish_game(&self) -> Result<Vec<TeamResult>, CommandError> {
        self.require_phase(Command::FinishGame, ScoreboardPhase::Active)?;

        let mut results: Vec<TeamResult> = self
            .teams
            .iter()
            .enumerate()
            .map(|(index, name)| TeamResult {
                name: name.clone(),
                score: self.score_of(index),
            })
            .collect();
        // `sort_by` is stable, which keeps tied teams in registration order.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(results)
    }

    fn clear_scoring_history(&mut self) {
        self.pending = None;
        self.last_award = None;
        self.award_count = 0;
        self.history.clear();
        self.action_log.clear();
    }

    fn require_phase(
        &self,
        command: Command,
        expected: ScoreboardPhase,
    ) -> Result<(), CommandError> {
        let phase = self.phase();
        if phase == expected {
            Ok(())
        } else {
            Err(CommandError::WrongPhase { command, phase })
        }
    }
}
