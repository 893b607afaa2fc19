pub mod bookings;
pub mod notify;
pub mod schedule;
pub mod stats;
