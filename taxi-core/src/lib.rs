//! Core ranking engine for taxi trip data.
//!
//! Two leaf components do the work:
//! - the grid aggregator ([`aggregate`]) buckets pickup points into
//!   fixed-size cells and counts occupancy;
//! - the bounded selector ([`select_top_k`]) extracts the `k` highest-scoring
//!   items with repeated linear scans and a first-occurrence tie-break.
//!
//! The ranking pipelines in [`ranking`] compose them: fare-per-km ranking
//! feeds [`Trip`]s straight into the selector, busiest-zone ranking feeds
//! pickup points through the aggregator first. [`summarise`] reports totals,
//! averages, and an hourly pickup profile over the same filtered rows. Rows
//! arrive through a [`TripSource`], which applies the caller's filter
//! beforehand.
//!
//! Nothing here keeps state between calls or performs I/O.

#![forbid(unsafe_code)]

pub mod grid;
pub mod point;
pub mod ranking;
pub mod select;
pub mod source;
pub mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trip;

pub use grid::{
    CellKey, CellSize, DEFAULT_CELL_SIZE, GridAggregation, GridCell, GridError, aggregate,
};
pub use point::{Coordinate, GeoPoint, Locate, RawPoint};
pub use ranking::{
    DEFAULT_MAX_POINTS, DEFAULT_TOP_K, RankedTrip, ZoneCount, heatmap, rank_busiest_zones,
    rank_trips_by_fare_per_km,
};
pub use select::{Scored, ScoredItem, select_top_k};
pub use source::{TripFilter, TripSource};
pub use summary::{HourlyCount, TripSummary, summarise};
pub use trip::{Trip, TripRecord, TripRecordError};
