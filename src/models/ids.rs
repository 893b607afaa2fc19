//! Booking IDs derived from the court cell a booking occupies.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A booking identifier derived from the cell it occupies.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    /// Wrap an existing id, e.g. one read back from a request path.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Hash the cell coordinates (`date`, `court`, `slot`) joined by `|`.
    ///
    /// One cell on one date always yields the same 16 hex digit id, so a
    /// booking can be cancelled by id without a lookup table.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BookingId({})", self.0)
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_deterministic() {
        let a = BookingId::generate(&["2025-06-14", "1", "08:00-09:00"]);
        let b = BookingId::generate(&["2025-06-14", "1", "08:00-09:00"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_booking_id_differs_by_court() {
        let a = BookingId::generate(&["2025-06-14", "1", "08:00-09:00"]);
        let b = BookingId::generate(&["2025-06-14", "2", "08:00-09:00"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_booking_id_hex_format() {
        let id = BookingId::generate(&["x"]);
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_booking_id_serializes_as_plain_string() {
        let id = BookingId::from("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
    }

    #[test]
    fn test_booking_id_display() {
        let id = BookingId::new("abc123def456".to_string());
        assert_eq!(format!("{}", id), "abc123def456");
        assert!(format!("{:?}", id).contains("abc123def456"));
    }
}
