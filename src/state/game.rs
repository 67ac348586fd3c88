use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// The most recent successful award, shown to the host as "last score".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastAward {
    /// Name of the team at the time it received the points.
    pub team_name: String,
    /// Points granted by the award.
    pub points: u32,
}

/// Score-related state captured right before an award so it can be undone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreSnapshot {
    /// Per-team totals, positionally paired with the team list.
    pub scores: Vec<i64>,
    /// Number of awards made so far.
    pub award_count: u64,
    /// Award preceding the one this snapshot guards.
    pub last_award: Option<LastAward>,
}

/// Human readable record of one award, kept newest-first for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogEntry {
    /// Team that received the points.
    pub team_name: String,
    /// Points granted.
    pub points: u32,
    /// Wall-clock time of the award (RFC 3339).
    pub timestamp: String,
}

impl ActionLogEntry {
    /// Build an entry stamped with the current wall-clock time.
    pub fn now(team_name: impl Into<String>, points: u32) -> Self {
        Self {
            team_name: team_name.into(),
            points,
            timestamp: format_system_time(SystemTime::now()),
        }
    }
}

/// One line of the final standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResult {
    /// Team display name.
    pub name: String,
    /// Final score (missing scores count as zero).
    pub score: i64,
}

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_is_stamped_with_rfc3339_time() {
        let entry = ActionLogEntry::now("Reds", 20);
        assert_eq!(entry.team_name, "Reds");
        assert_eq!(entry.points, 20);
        assert!(OffsetDateTime::parse(&entry.timestamp, &Rfc3339).is_ok());
    }
}
