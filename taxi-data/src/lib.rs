//! Dataset adapters for the taxi ranking engine.
//!
//! Responsibilities:
//! - Load trip rows from files on disk.
//! - Implement [`taxi_core::TripSource`] over the loaded rows.
//!
//! Boundaries:
//! - Ranking rules live in `taxi-core`; this crate only reads and filters.
//! - Every source is built from an explicit [`TripSourceConfig`]. There is no
//!   process-wide dataset path.

#![forbid(unsafe_code)]

mod json;

pub use json::{JsonTripSource, TripSourceConfig, TripSourceError};
