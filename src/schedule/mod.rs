//! Court layout, slot catalogue and booking validity rules.

mod week;

pub use week::*;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::models::{default_slots, Booking, BookingDraft, MatchType, TimeSlot};

/// Reasons a booking request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("Unknown court: {0}")]
    UnknownCourt(u32),

    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    #[error("{match_type} needs at least {required} players, got {given}")]
    NotEnoughPlayers {
        match_type: MatchType,
        required: usize,
        given: usize,
    },

    #[error("{match_type} allows at most {allowed} players, got {given}")]
    TooManyPlayers {
        match_type: MatchType,
        allowed: usize,
        given: usize,
    },

    #[error("Player listed twice: {0}")]
    DuplicatePlayer(String),

    #[error("Court {court} is already booked at {time_slot}")]
    SlotTaken { court: u32, time_slot: String },
}

/// Courts and slots that can be booked.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub courts: Vec<u32>,
    pub slots: Vec<TimeSlot>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            courts: vec![1, 2, 3],
            slots: default_slots(),
        }
    }
}

impl Schedule {
    /// Schedule over the given courts and slot catalogue.
    pub fn new(courts: Vec<u32>, slots: Vec<TimeSlot>) -> Self {
        Self { courts, slots }
    }

    /// Look up a slot by its label.
    pub fn slot(&self, label: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.label == label)
    }

    pub fn has_court(&self, court: u32) -> bool {
        self.courts.contains(&court)
    }

    /// Sort key for a slot label: its start time, with unknown labels last.
    fn slot_start(&self, label: &str) -> (bool, Option<NaiveTime>) {
        let start = self.slot(label).map(|s| s.start);
        (start.is_none(), start)
    }
}

/// Fewest non-blank players any match accepts.
const MIN_PLAYERS: usize = 2;

/// Check a booking request against the schedule and the day's existing
/// bookings, returning the booking to store.
///
/// Player names are trimmed and blank entries dropped.
pub fn validate_booking(
    schedule: &Schedule,
    date: NaiveDate,
    draft: &BookingDraft,
    existing: &[Booking],
) -> Result<Booking, BookingError> {
    if !schedule.has_court(draft.court) {
        return Err(BookingError::UnknownCourt(draft.court));
    }

    let slot = schedule
        .slot(draft.time_slot.trim())
        .ok_or_else(|| BookingError::UnknownSlot(draft.time_slot.clone()))?;

    let players: Vec<String> = draft
        .players
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    let match_type = slot.match_type;
    if players.len() < MIN_PLAYERS {
        return Err(BookingError::NotEnoughPlayers {
            match_type,
            required: MIN_PLAYERS,
            given: players.len(),
        });
    }
    if players.len() > match_type.max_players() {
        return Err(BookingError::TooManyPlayers {
            match_type,
            allowed: match_type.max_players(),
            given: players.len(),
        });
    }

    for (i, name) in players.iter().enumerate() {
        if players[..i].contains(name) {
            return Err(BookingError::DuplicatePlayer(name.clone()));
        }
    }

    let taken = existing
        .iter()
        .any(|b| b.date == date && b.court == draft.court && b.time_slot == slot.label);
    if taken {
        return Err(BookingError::SlotTaken {
            court: draft.court,
            time_slot: slot.label.clone(),
        });
    }

    Ok(Booking::new(date, draft.court, slot, players))
}

/// A day's bookings ordered by slot start time, then court.
pub fn day_schedule(schedule: &Schedule, mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| {
        schedule
            .slot_start(&a.time_slot)
            .cmp(&schedule.slot_start(&b.time_slot))
            .then_with(|| a.court.cmp(&b.court))
    });
    bookings
}
