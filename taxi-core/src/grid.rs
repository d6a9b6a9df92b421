//! Fixed-size grid aggregation of geographic points.
//!
//! Points are bucketed by floor-dividing each coordinate by the cell size.
//! The resulting [`CellKey`] is a pair of integer indices; a [`GridCell`]
//! carries the occupancy count and exposes the cell centroid.
//!
//! Points that cannot be located are skipped rather than aborting the pass.
//! The number skipped is kept on the [`GridAggregation`] for diagnostics.

use std::collections::HashMap;

use thiserror::Error;

use crate::{GeoPoint, Locate};

/// Default edge length of a grid cell, in decimal degrees.
pub const DEFAULT_CELL_SIZE: f64 = 0.01;

/// Exclusive magnitude bound for an index to fit in `i64` (2^63).
const INDEX_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Errors raised when configuring a grid.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GridError {
    /// The cell size was zero, negative, or not finite.
    #[error("grid cell size must be a positive finite number of degrees, got {value}")]
    NonPositiveCellSize {
        /// Rejected value.
        value: f64,
    },
}

/// Validated edge length of a grid cell in decimal degrees.
///
/// # Examples
/// ```
/// use taxi_core::{CellSize, GridError};
///
/// let size = CellSize::new(0.01).expect("positive size");
/// assert_eq!(size.degrees(), 0.01);
/// assert!(matches!(
///     CellSize::new(0.0),
///     Err(GridError::NonPositiveCellSize { .. })
/// ));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CellSize(f64);

impl CellSize {
    /// Validate and wrap a cell size.
    ///
    /// # Errors
    /// Returns [`GridError::NonPositiveCellSize`] unless `degrees` is finite
    /// and strictly positive.
    pub fn new(degrees: f64) -> Result<Self, GridError> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(GridError::NonPositiveCellSize { value: degrees })
        }
    }

    /// The edge length in degrees.
    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self(DEFAULT_CELL_SIZE)
    }
}

impl TryFrom<f64> for CellSize {
    type Error = GridError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

/// Integer indices identifying a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellKey {
    /// `⌊lat / cell_size⌋`.
    pub lat_index: i64,
    /// `⌊lng / cell_size⌋`.
    pub lng_index: i64,
}

impl CellKey {
    /// Construct a key from raw indices.
    #[must_use]
    pub const fn new(lat_index: i64, lng_index: i64) -> Self {
        Self {
            lat_index,
            lng_index,
        }
    }

    /// The key of the cell containing `point`.
    ///
    /// Returns `None` when an index does not fit in `i64`, which only happens
    /// for extremely small cell sizes.
    ///
    /// # Examples
    /// ```
    /// use taxi_core::{CellKey, CellSize, GeoPoint};
    ///
    /// let size = CellSize::new(0.01).expect("positive size");
    /// let point = GeoPoint::new(40.758, -73.985).expect("finite point");
    /// assert_eq!(CellKey::containing(point, size), Some(CellKey::new(4075, -7399)));
    /// ```
    #[must_use]
    pub fn containing(point: GeoPoint, cell_size: CellSize) -> Option<Self> {
        Some(Self {
            lat_index: floor_index(point.lat(), cell_size)?,
            lng_index: floor_index(point.lng(), cell_size)?,
        })
    }

    /// Centre of the cell: `(index + 0.5) * cell_size` on each axis.
    ///
    /// Returns `None` only when the product overflows, which cannot happen
    /// for keys produced by [`CellKey::containing`].
    #[must_use]
    pub fn centroid(self, cell_size: CellSize) -> Option<GeoPoint> {
        GeoPoint::new(
            centre_of(self.lat_index, cell_size),
            centre_of(self.lng_index, cell_size),
        )
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "grid indices are floor-divided coordinates; the range is checked before the cast"
)]
fn floor_index(value: f64, cell_size: CellSize) -> Option<i64> {
    let quotient = (value / cell_size.degrees()).floor();
    if quotient.is_finite() && (-INDEX_LIMIT..INDEX_LIMIT).contains(&quotient) {
        Some(quotient as i64)
    } else {
        None
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "centroids are half a cell past the floor-divided index"
)]
fn centre_of(index: i64, cell_size: CellSize) -> f64 {
    (index as f64 + 0.5) * cell_size.degrees()
}

/// One occupied grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    key: CellKey,
    centroid: GeoPoint,
    count: u64,
}

impl GridCell {
    /// Identifier of the cell.
    #[must_use]
    pub const fn key(&self) -> CellKey {
        self.key
    }

    /// Number of points bucketed into the cell.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Centre of the cell.
    #[must_use]
    pub const fn centroid(&self) -> GeoPoint {
        self.centroid
    }
}

/// Result of one aggregation pass.
///
/// Cells are reported in order of first occupancy. The order carries no
/// meaning for the counts, but it makes downstream tie-breaks reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAggregation {
    cell_size: CellSize,
    slots: HashMap<CellKey, usize>,
    cells: Vec<GridCell>,
    skipped: usize,
}

impl GridAggregation {
    fn new(cell_size: CellSize) -> Self {
        Self {
            cell_size,
            slots: HashMap::new(),
            cells: Vec::new(),
            skipped: 0,
        }
    }

    /// Count one point in the cell `key`.
    ///
    /// The centroid is computed once, when the cell is first occupied.
    /// Returns `false` when a new cell has no finite centroid.
    fn record(&mut self, key: CellKey) -> bool {
        if let Some(slot) = self.slots.get(&key).copied() {
            if let Some(cell) = self.cells.get_mut(slot) {
                cell.count = cell.count.saturating_add(1);
            }
            return true;
        }
        let Some(centroid) = key.centroid(self.cell_size) else {
            return false;
        };
        self.slots.insert(key, self.cells.len());
        self.cells.push(GridCell {
            key,
            centroid,
            count: 1,
        });
        true
    }

    fn skip(&mut self) {
        self.skipped = self.skipped.saturating_add(1);
    }

    /// Size of the grid used for this pass.
    #[must_use]
    pub const fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    /// Number of distinct occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Report whether no point was bucketed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of points dropped because they could not be located.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Occupancy of the cell with `key`, if any point landed there.
    #[must_use]
    pub fn count(&self, key: CellKey) -> Option<u64> {
        self.get(key).map(|cell| cell.count)
    }

    /// The cell with `key`, if occupied.
    #[must_use]
    pub fn get(&self, key: CellKey) -> Option<GridCell> {
        let slot = self.slots.get(&key).copied()?;
        self.cells.get(slot).copied()
    }

    /// Iterate over every occupied cell in first-occupancy order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        self.cells.iter().copied()
    }
}

/// Bucket `points` into cells of `cell_size` and count occupancy.
///
/// Points that do not [`Locate`] to finite coordinates are skipped and
/// counted in [`GridAggregation::skipped`]. The pass keeps no state beyond
/// the returned value.
///
/// # Examples
/// ```
/// use taxi_core::{CellKey, CellSize, RawPoint, aggregate};
///
/// let points = vec![
///     RawPoint::new(40.758, -73.985),
///     RawPoint::new("40.7581", "-73.9851"),
///     RawPoint::new("bad", 0.0),
/// ];
/// let grid = aggregate(&points, CellSize::default());
/// assert_eq!(grid.count(CellKey::new(4075, -7399)), Some(2));
/// assert_eq!(grid.skipped(), 1);
/// ```
pub fn aggregate<I>(points: I, cell_size: CellSize) -> GridAggregation
where
    I: IntoIterator,
    I::Item: Locate,
{
    let mut grid = GridAggregation::new(cell_size);
    for point in points {
        let key = point
            .locate()
            .and_then(|located| CellKey::containing(located, cell_size));
        let counted = key.is_some_and(|occupied| grid.record(occupied));
        if !counted {
            grid.skip();
        }
    }
    grid
}
