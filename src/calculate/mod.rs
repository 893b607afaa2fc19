//! Statistics calculation engine.
//!
//! Rolls stored bookings up into per-player statistics:
//! - Match counts split by singles/doubles
//! - Hours on court
//! - Favorite court and most recent match
//! - Summary totals across all players

use std::collections::HashMap;

use crate::models::{Booking, MatchType, PlayerStat, StatsSummary};

/// Aggregate bookings into player statistics, most active players first.
///
/// Blank player entries are ignored. Players are grouped by their trimmed
/// name, case-sensitively. Ties in `total_matches` keep the order in which
/// players were first seen.
pub fn aggregate_player_stats(bookings: &[Booking]) -> Vec<PlayerStat> {
    let mut stats: Vec<PlayerStat> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for booking in bookings {
        for name in booking.active_players() {
            let slot = *index.entry(name.to_string()).or_insert_with(|| {
                stats.push(PlayerStat::new(name.to_string(), booking.date));
                stats.len() - 1
            });
            let stat = &mut stats[slot];

            stat.total_matches += 1;
            stat.total_hours += booking.duration_units();
            match booking.match_type {
                MatchType::Singles => stat.singles_matches += 1,
                MatchType::Doubles => stat.doubles_matches += 1,
            }
            if booking.date > stat.last_played {
                stat.last_played = booking.date;
            }
        }
    }

    for stat in &mut stats {
        if let Some(court) = favorite_court(bookings, &stat.name) {
            stat.favorite_court = court;
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    stats.sort_by(|a, b| b.total_matches.cmp(&a.total_matches));
    stats
}

/// Most played court for `player`, scanning bookings in order.
///
/// A court only displaces the current favorite with a strictly higher tally,
/// so ties resolve to whichever court was encountered first.
pub fn favorite_court(bookings: &[Booking], player: &str) -> Option<u32> {
    let mut tallies: Vec<(u32, u32)> = Vec::new();

    for booking in bookings.iter().filter(|b| b.has_player(player)) {
        match tallies.iter_mut().find(|(court, _)| *court == booking.court) {
            Some((_, count)) => *count += 1,
            None => tallies.push((booking.court, 1)),
        }
    }

    let mut best: Option<(u32, u32)> = None;
    for (court, count) in tallies {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((court, count)),
        }
    }

    best.map(|(court, _)| court)
}

/// Totals for the statistics header.
pub fn summarize(stats: &[PlayerStat]) -> StatsSummary {
    let total_players = stats.len() as u32;
    let total_matches: u32 = stats.iter().map(|s| s.total_matches).sum();
    let total_hours: u32 = stats.iter().map(|s| s.total_hours).sum();

    let average_matches = if total_players == 0 {
        0.0
    } else {
        total_matches as f64 / total_players as f64
    };

    StatsSummary {
        total_players,
        total_matches,
        total_hours,
        average_matches,
    }
}
