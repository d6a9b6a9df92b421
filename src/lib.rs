//! Facade crate for the taxi-rank engine.
//!
//! This crate re-exports the core ranking types and exposes the JSON trip
//! source behind a feature flag.

#![forbid(unsafe_code)]

pub use taxi_core::{
    CellKey, CellSize, Coordinate, DEFAULT_CELL_SIZE, DEFAULT_MAX_POINTS, DEFAULT_TOP_K,
    GeoPoint, GridAggregation, GridCell, GridError, HourlyCount, Locate, RankedTrip, RawPoint,
    Scored, ScoredItem, Trip, TripFilter, TripRecord, TripRecordError, TripSource, TripSummary,
    ZoneCount, aggregate, heatmap, rank_busiest_zones, rank_trips_by_fare_per_km, select_top_k,
    summarise,
};

#[cfg(feature = "source-json")]
pub use taxi_data::{JsonTripSource, TripSourceConfig, TripSourceError};
