//! Weekly booking grid.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

use super::Schedule;
use crate::models::{Booking, BookingId};

/// The seven dates, Monday first, of the week containing `date`.
pub fn week_of(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (0..7).map(|i| monday + Duration::days(i)).collect()
}

/// State of one (date, court, slot) position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CellState {
    Free,
    Booked { id: BookingId, players: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub court: u32,
    pub time_slot: String,
    #[serde(flatten)]
    pub state: CellState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayColumn {
    pub date: NaiveDate,
    pub weekday: String,
    pub cells: Vec<GridCell>,
}

impl DayColumn {
    pub fn booked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c.state, CellState::Booked { .. }))
            .count()
    }
}

/// A Monday-to-Sunday view of every court and slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekGrid {
    pub week_start: NaiveDate,
    pub days: Vec<DayColumn>,
}

impl WeekGrid {
    /// Lay out the week containing `date`. Bookings outside the week, or in
    /// cells the schedule no longer offers, are left out.
    pub fn build(date: NaiveDate, schedule: &Schedule, bookings: &[Booking]) -> Self {
        let dates = week_of(date);
        let week_start = dates[0];

        let days = dates
            .into_iter()
            .map(|day| {
                let mut cells = Vec::with_capacity(schedule.slots.len() * schedule.courts.len());
                for slot in &schedule.slots {
                    for &court in &schedule.courts {
                        let state = bookings
                            .iter()
                            .find(|b| b.date == day && b.court == court && b.time_slot == slot.label)
                            .map(|b| CellState::Booked {
                                id: b.id.clone(),
                                players: b.active_players().map(str::to_string).collect(),
                            })
                            .unwrap_or(CellState::Free);

                        cells.push(GridCell {
                            court,
                            time_slot: slot.label.clone(),
                            state,
                        });
                    }
                }

                DayColumn {
                    date: day,
                    weekday: weekday_name(day.weekday()).to_string(),
                    cells,
                }
            })
            .collect();

        Self { week_start, days }
    }

    pub fn week_end(&self) -> NaiveDate {
        self.week_start + Duration::days(6)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
