//! Date-partitioned booking storage.
//!
//! Bookings are kept in one partition per calendar date:
//! - `JsonlBookingStore` writes one JSONL file per date under the data dir
//! - `MemoryBookingStore` keeps partitions in memory
//!
//! Everything above this module talks to the `BookingStore` trait.

mod jsonl;
mod memory;

pub use jsonl::*;
pub use memory::*;

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::models::{Booking, BookingDraft, BookingId};
use crate::schedule::{validate_booking, BookingError, Schedule};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Booking rejected: {0}")]
    Rejected(#[from] BookingError),

    #[error("Partition {path:?} has {skipped} unreadable line(s); repair it before writing")]
    Corrupt { path: PathBuf, skipped: usize },

    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Paths rooted at `data_dir`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Directory holding one file per date.
    pub fn bookings_dir(&self) -> PathBuf {
        self.data_dir.join("bookings")
    }

    /// File holding the bookings of one date.
    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.bookings_dir()
            .join(format!("{}.jsonl", date.format("%Y-%m-%d")))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

/// A keyed store mapping a calendar date to that day's bookings.
pub trait BookingStore: Send + Sync {
    /// Bookings stored for `date`; an empty list when nothing was stored.
    fn read(&self, date: NaiveDate) -> Result<Vec<Booking>, StorageError>;

    /// Replace the bookings for `date`. Writing an empty list removes the partition.
    fn write(&self, date: NaiveDate, bookings: &[Booking]) -> Result<(), StorageError>;

    /// Dates with a stored partition, ascending.
    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError>;

    /// Union of all partitions in date order.
    fn read_all(&self) -> Result<Vec<Booking>, StorageError> {
        let mut all = Vec::new();
        for date in self.dates()? {
            all.extend(self.read(date)?);
        }
        Ok(all)
    }

    /// Bookings dated within `from..=to`.
    fn read_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>, StorageError> {
        let mut all = Vec::new();
        for date in self.dates()? {
            if date >= from && date <= to {
                all.extend(self.read(date)?);
            }
        }
        Ok(all)
    }
}

/// Validate a booking request against the day's partition and store it.
pub fn add_booking(
    store: &dyn BookingStore,
    schedule: &Schedule,
    date: NaiveDate,
    draft: &BookingDraft,
) -> Result<Booking, StorageError> {
    let mut day = store.read(date)?;
    let booking = validate_booking(schedule, date, draft, &day)?;

    day.push(booking.clone());
    store.write(date, &day)?;

    info!(
        "Booked court {} at {} on {} ({})",
        booking.court,
        booking.time_slot,
        date,
        booking.active_players().collect::<Vec<_>>().join(", ")
    );
    Ok(booking)
}

/// Remove a booking from its date partition, returning it.
pub fn cancel_booking(
    store: &dyn BookingStore,
    date: NaiveDate,
    id: &BookingId,
) -> Result<Booking, StorageError> {
    let mut day = store.read(date)?;
    let pos = day
        .iter()
        .position(|b| &b.id == id)
        .ok_or_else(|| StorageError::BookingNotFound(id.clone()))?;

    let removed = day.remove(pos);
    store.write(date, &day)?;

    info!("Cancelled booking {} on {}", id, date);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn draft(court: u32, slot: &str) -> BookingDraft {
        BookingDraft {
            court,
            time_slot: slot.to_string(),
            players: vec!["Ann".to_string(), "Bob".to_string()],
        }
    }

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.bookings_dir(), PathBuf::from("/data/bookings"));
        assert_eq!(
            config.partition_path(date("2025-06-14")),
            PathBuf::from("/data/bookings/2025-06-14.jsonl")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_add_booking_persists() {
        let store = MemoryBookingStore::new();
        let schedule = Schedule::default();

        let booking =
            add_booking(&store, &schedule, date("2025-06-14"), &draft(1, "08:00-09:00")).unwrap();

        assert_eq!(store.read(date("2025-06-14")).unwrap(), vec![booking]);
    }

    #[test]
    fn test_add_booking_rejects_taken_slot() {
        let store = MemoryBookingStore::new();
        let schedule = Schedule::default();
        add_booking(&store, &schedule, date("2025-06-14"), &draft(1, "08:00-09:00")).unwrap();

        let err = add_booking(&store, &schedule, date("2025-06-14"), &draft(1, "08:00-09:00"))
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::Rejected(BookingError::SlotTaken { .. })
        ));
        assert_eq!(store.read(date("2025-06-14")).unwrap().len(), 1);
    }

    #[test]
    fn test_cancel_booking() {
        let store = MemoryBookingStore::new();
        let schedule = Schedule::default();
        let booking =
            add_booking(&store, &schedule, date("2025-06-14"), &draft(1, "08:00-09:00")).unwrap();

        let removed = cancel_booking(&store, date("2025-06-14"), &booking.id).unwrap();

        assert_eq!(removed.id, booking.id);
        assert!(store.read(date("2025-06-14")).unwrap().is_empty());
        assert!(store.dates().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_missing_booking() {
        let store = MemoryBookingStore::new();
        let err = cancel_booking(&store, date("2025-06-14"), &BookingId::from("nope")).unwrap_err();
        assert!(matches!(err, StorageError::BookingNotFound(_)));
    }

    #[test]
    fn test_read_all_and_range() {
        let store = MemoryBookingStore::new();
        let schedule = Schedule::default();
        for day in ["2025-06-16", "2025-06-14", "2025-06-20"] {
            add_booking(&store, &schedule, date(day), &draft(1, "08:00-09:00")).unwrap();
        }

        let all = store.read_all().unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![date("2025-06-14"), date("2025-06-16"), date("2025-06-20")]
        );

        let range = store
            .read_range(date("2025-06-15"), date("2025-06-20"))
            .unwrap();
        assert_eq!(range.len(), 2);
    }
}
