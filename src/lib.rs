//! # Court Booker
//!
//! A local scheduler for a small set of tennis courts.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (bookings, time slots, player stats)
//! - **schedule**: Court/slot catalogue, booking validity check, weekly grid
//! - **storage**: Date-partitioned booking store (JSONL, in-memory)
//! - **calculate**: Player statistics aggregation
//! - **notify**: Confirmation emails and concurrent dispatch
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod notify;
pub mod schedule;
pub mod storage;

pub use models::*;
