//! Core data models for the court scheduler.

mod booking;
mod ids;
mod stats;

pub use booking::*;
pub use ids::*;
pub use stats::*;
