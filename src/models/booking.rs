//! Court booking model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::BookingId;

/// Kind of match played in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Singles,
    Doubles,
}

impl MatchType {
    /// Hours a match of this kind occupies the court.
    pub fn duration_units(&self) -> u32 {
        match self {
            MatchType::Singles => 1,
            MatchType::Doubles => 2,
        }
    }

    /// Number of player entries a booking form offers.
    pub fn max_players(&self) -> usize {
        match self {
            MatchType::Singles => 2,
            MatchType::Doubles => 4,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Singles => write!(f, "singles"),
            MatchType::Doubles => write!(f, "doubles"),
        }
    }
}

impl FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "singles" => Ok(MatchType::Singles),
            "doubles" => Ok(MatchType::Doubles),
            other => Err(format!("unknown match type: {}", other)),
        }
    }
}

/// A fixed, bookable interval of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Display label, also the key stored on bookings (e.g. "08:00-09:00")
    pub label: String,

    #[serde(with = "hhmm")]
    pub start: NaiveTime,

    #[serde(with = "hhmm")]
    pub end: NaiveTime,

    pub match_type: MatchType,
}

impl TimeSlot {
    /// Build a slot whose label is derived from its bounds.
    pub fn new(start: NaiveTime, end: NaiveTime, match_type: MatchType) -> Self {
        Self {
            label: format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            start,
            end,
            match_type,
        }
    }

    fn hourly(start_hour: u32, end_hour: u32, match_type: MatchType) -> Self {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        Self::new(at(start_hour), at(end_hour), match_type)
    }
}

/// The default slot catalogue: hourly singles slots around two-hour doubles blocks.
pub fn default_slots() -> Vec<TimeSlot> {
    vec![
        TimeSlot::hourly(8, 9, MatchType::Singles),
        TimeSlot::hourly(9, 10, MatchType::Singles),
        TimeSlot::hourly(10, 11, MatchType::Singles),
        TimeSlot::hourly(11, 12, MatchType::Singles),
        TimeSlot::hourly(12, 14, MatchType::Doubles),
        TimeSlot::hourly(14, 16, MatchType::Doubles),
        TimeSlot::hourly(16, 17, MatchType::Singles),
        TimeSlot::hourly(17, 18, MatchType::Singles),
        TimeSlot::hourly(18, 20, MatchType::Doubles),
    ]
}

/// A booking of one court, in one slot, on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,

    pub date: NaiveDate,

    pub court: u32,

    /// Label of the slot in the catalogue
    pub time_slot: String,

    /// Player names in form order; blank entries carry no meaning
    pub players: Vec<String>,

    pub match_type: MatchType,

    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Create a booking for a catalogue slot with an ID derived from its cell.
    pub fn new(date: NaiveDate, court: u32, slot: &TimeSlot, players: Vec<String>) -> Self {
        let id = BookingId::generate(&[&date.to_string(), &court.to_string(), &slot.label]);

        Self {
            id,
            date,
            court,
            time_slot: slot.label.clone(),
            players,
            match_type: slot.match_type,
            created_at: Utc::now(),
        }
    }

    /// Trimmed, non-blank player names.
    pub fn active_players(&self) -> impl Iterator<Item = &str> {
        self.players
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
    }

    /// Whether `name` plays in this booking (exact match after trimming).
    pub fn has_player(&self, name: &str) -> bool {
        self.active_players().any(|p| p == name)
    }

    /// Hours this booking counts towards a player's total.
    pub fn duration_units(&self) -> u32 {
        self.match_type.duration_units()
    }
}

/// A booking request before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub court: u32,
    pub time_slot: String,
    #[serde(default)]
    pub players: Vec<String>,
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
