//! In-memory booking store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::NaiveDate;

use super::{BookingStore, StorageError};
use crate::models::Booking;

/// Keeps every partition in a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    partitions: RwLock<BTreeMap<NaiveDate, Vec<Booking>>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from existing bookings, partitioned by their dates.
    pub fn from_bookings(bookings: Vec<Booking>) -> Self {
        let mut partitions: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
        for booking in bookings {
            partitions.entry(booking.date).or_default().push(booking);
        }
        Self {
            partitions: RwLock::new(partitions),
        }
    }
}

impl BookingStore for MemoryBookingStore {
    fn read(&self, date: NaiveDate) -> Result<Vec<Booking>, StorageError> {
        let partitions = self
            .partitions
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(partitions.get(&date).cloned().unwrap_or_default())
    }

    fn write(&self, date: NaiveDate, bookings: &[Booking]) -> Result<(), StorageError> {
        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        if bookings.is_empty() {
            partitions.remove(&date);
        } else {
            partitions.insert(date, bookings.to_vec());
        }
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let partitions = self
            .partitions
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(partitions.keys().copied().collect())
    }
}
