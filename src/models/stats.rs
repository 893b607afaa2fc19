//! Derived player statistics models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-player statistics, rebuilt from bookings on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStat {
    /// Player name as entered (trimmed, case-sensitive)
    pub name: String,

    pub total_matches: u32,

    pub singles_matches: u32,

    pub doubles_matches: u32,

    /// Sum of match durations in hours
    pub total_hours: u32,

    /// Most played court; ties go to the first court seen
    pub favorite_court: u32,

    pub last_played: NaiveDate,
}

impl PlayerStat {
    /// A zeroed stat for a player first seen on `date`.
    pub fn new(name: String, date: NaiveDate) -> Self {
        Self {
            name,
            total_matches: 0,
            singles_matches: 0,
            doubles_matches: 0,
            total_hours: 0,
            favorite_court: 0,
            last_played: date,
        }
    }
}

/// Totals across all players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_players: u32,
    pub total_matches: u32,
    pub total_hours: u32,
    /// Matches per player; 0.0 when there are no players
    pub average_matches: f64,
}

impl StatsSummary {
    /// Average matches per player rendered with one decimal place, or "0"
    /// when nobody has played.
    pub fn average_display(&self) -> String {
        if self.total_players == 0 {
            return "0".to_string();
        }
        format!("{:.1}", self.average_matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_stat_new_is_zeroed() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let stat = PlayerStat::new("Ann".to_string(), date);

        assert_eq!(stat.total_matches, 0);
        assert_eq!(stat.total_hours, 0);
        assert_eq!(stat.last_played, date);
    }

    #[test]
    fn test_average_display_rounds_to_one_decimal() {
        let summary = StatsSummary {
            total_players: 3,
            total_matches: 7,
            total_hours: 9,
            average_matches: 7.0 / 3.0,
        };
        assert_eq!(summary.average_display(), "2.3");
    }

    #[test]
    fn test_average_display_default() {
        assert_eq!(StatsSummary::default().average_display(), "0");
    }
}
