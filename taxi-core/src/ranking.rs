//! The two ranking pipelines built on the grid aggregator and the top-K
//! selector, plus the plain heatmap rendering.

use log::debug;

use crate::{CellKey, CellSize, GridCell, Locate, Scored, Trip, aggregate, select_top_k};

/// Number of results returned when the caller does not choose.
pub const DEFAULT_TOP_K: usize = 10;

/// Ceiling on pickup points fed into one aggregation pass.
pub const DEFAULT_MAX_POINTS: usize = 50_000;

/// A trip scored by fare per kilometre.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedTrip {
    /// Trip identifier.
    pub trip_id: String,
    /// Fare divided by distance.
    pub fare_per_km: f64,
}

impl From<&Trip> for RankedTrip {
    fn from(trip: &Trip) -> Self {
        Self {
            trip_id: trip.trip_id().to_owned(),
            fare_per_km: trip.fare_per_km(),
        }
    }
}

impl Scored for RankedTrip {
    fn score(&self) -> f64 {
        self.fare_per_km
    }
}

/// An occupied grid cell rendered for output.
///
/// Serialises as `{lat, lng, count}`; the cell key is kept for callers but
/// not emitted.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ZoneCount {
    /// Latitude of the cell centroid.
    pub lat: f64,
    /// Longitude of the cell centroid.
    pub lng: f64,
    /// Number of pickups in the cell.
    pub count: u64,
    /// Indices of the cell.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub key: CellKey,
}

impl From<GridCell> for ZoneCount {
    fn from(cell: GridCell) -> Self {
        let centroid = cell.centroid();
        Self {
            lat: centroid.lat(),
            lng: centroid.lng(),
            count: cell.count(),
            key: cell.key(),
        }
    }
}

impl Scored for ZoneCount {
    #[expect(
        clippy::cast_precision_loss,
        reason = "pickup counts are far below 2^53"
    )]
    fn score(&self) -> f64 {
        self.count as f64
    }
}

/// Rank trips by fare per kilometre and keep the best `k`.
///
/// # Examples
/// ```
/// use taxi_core::{Trip, rank_trips_by_fare_per_km};
///
/// let trips = [
///     Trip::new("t1", 10.0, 2.0).expect("valid trip"),
///     Trip::new("t2", 30.0, 5.0).expect("valid trip"),
///     Trip::new("t3", 5.0, 1.0).expect("valid trip"),
/// ];
/// let top = rank_trips_by_fare_per_km(&trips, 2);
/// let ids: Vec<_> = top.iter().map(|trip| trip.trip_id.as_str()).collect();
/// assert_eq!(ids, ["t2", "t1"]);
/// ```
#[must_use]
pub fn rank_trips_by_fare_per_km<'a, I>(trips: I, k: usize) -> Vec<RankedTrip>
where
    I: IntoIterator<Item = &'a Trip>,
{
    let scored: Vec<RankedTrip> = trips.into_iter().map(RankedTrip::from).collect();
    let top = select_top_k(&scored, k);
    debug!("ranked {} trips by fare per km, kept {}", scored.len(), top.len());
    top
}

/// Aggregate pickup points and keep the `k` busiest cells.
///
/// Cells enter the selector in first-occupancy order, so equally busy cells
/// are reported in the order their first pickup appeared.
#[must_use]
pub fn rank_busiest_zones<I>(points: I, cell_size: CellSize, k: usize) -> Vec<ZoneCount>
where
    I: IntoIterator,
    I::Item: Locate,
{
    let zones = heatmap(points, cell_size);
    let top = select_top_k(&zones, k);
    debug!("ranked {} zones by pickup count, kept {}", zones.len(), top.len());
    top
}

/// Aggregate pickup points and render every occupied cell.
#[must_use]
pub fn heatmap<I>(points: I, cell_size: CellSize) -> Vec<ZoneCount>
where
    I: IntoIterator,
    I::Item: Locate,
{
    let grid = aggregate(points, cell_size);
    if grid.skipped() > 0 {
        debug!(
            "skipped {} pickup points without usable coordinates",
            grid.skipped()
        );
    }
    grid.cells().map(ZoneCount::from).collect()
}
