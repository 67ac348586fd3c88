use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::state::game::{ActionLogEntry, LastAward, ScoreSnapshot};

/// Score table as stored under `scores`. `null` holes decode as zero.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoresEntity(#[serde_as(as = "Vec<DefaultOnNull>")] pub Vec<i64>);

/// Undo snapshot as stored inside `scoreHistory`.
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSnapshotEntity {
    /// Score table before the award.
    #[serde_as(as = "Vec<DefaultOnNull>")]
    #[serde(default)]
    pub scores: Vec<i64>,
    /// Award count before the award.
    #[serde(default)]
    pub score_index: u64,
    /// Team of the previous award, `null` when there was none.
    #[serde(default)]
    pub last_score_team: Option<String>,
    /// Points of the previous award, `0` when there was none.
    #[serde(default)]
    pub last_score: u32,
}

/// Log line as stored inside `actionLog`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntity {
    /// Team that received the points.
    pub team_name: String,
    /// Points granted.
    pub points: u32,
    /// Display timestamp.
    #[serde(default)]
    pub timestamp: String,
}

/// Rebuild a [`LastAward`] from the split `lastScoreTeam` / `lastScore` pair.
pub fn last_award_from_parts(team: Option<String>, points: u32) -> Option<LastAward> {
    team.filter(|name| !name.is_empty())
        .map(|team_name| LastAward { team_name, points })
}

impl From<ScoreSnapshotEntity> for ScoreSnapshot {
    fn from(value: ScoreSnapshotEntity) -> Self {
        Self {
            scores: value.scores,
            award_count: value.score_index,
            last_award: last_award_from_parts(value.last_score_team, value.last_score),
        }
    }
}

impl From<&ScoreSnapshot> for ScoreSnapshotEntity {
    fn from(value: &ScoreSnapshot) -> Self {
        Self {
            scores: value.scores.clone(),
            score_index: value.award_count,
            last_score_team: value.last_award.as_ref().map(|a| a.team_name.clone()),
            last_score: value.last_award.as_ref().map_or(0, |a| a.points),
        }
    }
}

impl From<ActionLogEntity> for ActionLogEntry {
    fn from(value: ActionLogEntity) -> Self {
        Self {
            team_name: value.team_name,
            points: value.points,
            timestamp: value.timestamp,
        }
    }
}

impl From<&ActionLogEntry> for ActionLogEntity {
    fn from(value: &ActionLogEntry) -> Self {
        Self {
            team_name: value.team_name.clone(),
            points: value.points,
            timestamp: value.timestamp.clone(),
        }
    }
}
