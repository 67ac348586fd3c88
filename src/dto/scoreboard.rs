//! Payloads exchanged with the presentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::validate_confirmed,
    state::{
        game::{ActionLogEntry, LastAward, TeamResult},
        state_machine::{ScoreboardPhase, ScoreboardView},
    },
};

/// Publicly visible phase of the scoreboard.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Team names are being collected.
    Setup,
    /// Points can be awarded.
    Active,
}

impl From<ScoreboardPhase> for VisiblePhase {
    fn from(value: ScoreboardPhase) -> Self {
        match value {
            ScoreboardPhase::Setup => VisiblePhase::Setup,
            ScoreboardPhase::Active => VisiblePhase::Active,
        }
    }
}

/// One team with its running total.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TeamScore {
    pub index: usize,
    pub name: String,
    pub score: i64,
}

/// Most recent award.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LastAwardSummary {
    pub team_name: String,
    pub points: u32,
}

impl From<LastAward> for LastAwardSummary {
    fn from(value: LastAward) -> Self {
        Self {
            team_name: value.team_name,
            points: value.points,
        }
    }
}

/// Entry of the award log.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ActionLogItem {
    pub team_name: String,
    pub points: u32,
    pub timestamp: String,
}

impl From<ActionLogEntry> for ActionLogItem {
    fn from(value: ActionLogEntry) -> Self {
        Self {
            team_name: value.team_name,
            points: value.points,
            timestamp: value.timestamp,
        }
    }
}

/// Full scoreboard state returned after every command.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ScoreboardResponse {
    pub phase: VisiblePhase,
    pub teams: Vec<TeamScore>,
    /// Names collected during setup, in the order they were added.
    pub staged_teams: Vec<String>,
    /// Index of the team armed for the next award.
    pub selected_team: Option<usize>,
    pub last_award: Option<LastAwardSummary>,
    pub award_count: u64,
    /// True when an undo would succeed.
    pub can_undo: bool,
    /// Award log, newest first.
    pub action_log: Vec<ActionLogItem>,
    /// Point buttons the host may use.
    pub point_values: Vec<u32>,
}

impl From<ScoreboardView> for ScoreboardResponse {
    fn from(view: ScoreboardView) -> Self {
        let can_undo = view.can_undo();
        let teams = view
            .teams
            .into_iter()
            .zip(view.scores)
            .enumerate()
            .map(|(index, (name, score))| TeamScore { index, name, score })
            .collect();

        Self {
            phase: view.phase.into(),
            teams,
            staged_teams: view.staged_teams,
            selected_team: view.selected_team,
            last_award: view.last_award.map(Into::into),
            award_count: view.award_count,
            can_undo,
            action_log: view.action_log.into_iter().map(Into::into).collect(),
            point_values: view.point_values,
        }
    }
}

/// Request to stage a team during setup.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddTeamRequest {
    /// Surrounding whitespace is trimmed; blank names are ignored.
    pub name: String,
}

/// Request to arm a team for the next award.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectTeamRequest {
    /// Position in the team list. Negative or out-of-range values select nothing.
    pub index: i64,
}

/// Request to award points to the armed team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AwardPointsRequest {
    #[validate(range(min = 1))]
    pub points: u32,
}

/// Confirmation required by destructive resets.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmRequest {
    #[validate(custom(function = "validate_confirmed"))]
    pub confirm: bool,
}

/// One line of the final standings.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct StandingItem {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub name: String,
    pub score: i64,
}

/// Final standings, highest score first.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct GameResultResponse {
    pub standings: Vec<StandingItem>,
}

impl From<Vec<TeamResult>> for GameResultResponse {
    fn from(results: Vec<TeamResult>) -> Self {
        let standings = results
            .into_iter()
            .enumerate()
            .map(|(position, result)| StandingItem {
                rank: position + 1,
                name: result.name,
                score: result.score,
            })
            .collect();
        Self { standings }
    }
}
