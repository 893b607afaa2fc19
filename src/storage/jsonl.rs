//! JSONL (JSON Lines) storage.
//!
//! Each date partition is one `.jsonl` file; each line is one booking.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{BookingStore, StorageConfig, StorageError};
use crate::models::Booking;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a writer for the file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a reader for the file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file. Lines that fail to parse are skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.read_counting_skipped()?.0)
    }

    /// Read all entities, also returning how many non-blank lines failed to parse.
    pub fn read_counting_skipped(&self) -> Result<(Vec<T>, usize), StorageError> {
        if !self.path.exists() {
            return Ok((Vec::new(), 0));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();
        let mut skipped = 0;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                    skipped += 1;
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok((entities, skipped))
    }
}

/// Booking store backed by one JSONL file per date.
#[derive(Debug, Clone)]
pub struct JsonlBookingStore {
    config: StorageConfig,
}

impl JsonlBookingStore {
    /// Create a store rooted at `config.data_dir`.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BookingStore for JsonlBookingStore {
    fn read(&self, date: NaiveDate) -> Result<Vec<Booking>, StorageError> {
        JsonlReader::new(self.config.partition_path(date)).read_all()
    }

    /// Fails with `StorageError::Corrupt` while the partition holds unparseable lines.
    fn write(&self, date: NaiveDate, bookings: &[Booking]) -> Result<(), StorageError> {
        let path = self.config.partition_path(date);

        let (_, skipped) = JsonlReader::<Booking>::new(path.clone()).read_counting_skipped()?;
        if skipped > 0 {
            warn!("Refusing to overwrite {:?}: {} unreadable line(s)", path, skipped);
            return Err(StorageError::Corrupt { path, skipped });
        }

        if bookings.is_empty() {
            if path.exists() {
                fs::remove_file(&path)?;
                info!("Removed empty partition {:?}", path);
            }
            return Ok(());
        }

        JsonlWriter::new(path).write_all(bookings)?;
        Ok(())
    }

    fn dates(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let dir = self.config.bookings_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut dates = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            let parsed = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            match parsed {
                Some(date) => dates.push(date),
                None => debug!("Ignoring non-partition file {:?}", path),
            }
        }

        dates.sort();
        Ok(dates)
    }
}
