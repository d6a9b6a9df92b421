//! In-memory `TripSource` implementation used by unit and behaviour tests.

use crate::source::{pickups_from_records, records_matching, trips_from_records};
use crate::{RawPoint, Trip, TripFilter, TripRecord, TripSource};

/// In-memory `TripSource` over a vector of records.
///
/// Every query performs a linear scan; use it only for small datasets.
#[derive(Default, Debug, Clone)]
pub struct MemoryTripSource {
    records: Vec<TripRecord>,
}

impl MemoryTripSource {
    /// Create a source from a collection of records.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = TripRecord>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Create a source whose records only carry pickup coordinates.
    pub fn with_pickups<I>(pickups: I) -> Self
    where
        I: IntoIterator<Item = RawPoint>,
    {
        Self::with_records(pickups.into_iter().enumerate().map(|(index, pickup)| {
            TripRecord {
                trip_id: format!("p{index}"),
                pickup_lat: pickup.lat,
                pickup_lng: pickup.lng,
                ..TripRecord::default()
            }
        }))
    }

    /// Stored records, in insertion order.
    #[must_use]
    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }
}

impl TripSource for MemoryTripSource {
    fn trips(&self, filter: &TripFilter) -> Box<dyn Iterator<Item = Trip> + Send + '_> {
        Box::new(trips_from_records(&self.records, filter.clone()))
    }

    fn pickup_points(
        &self,
        filter: &TripFilter,
        limit: usize,
    ) -> Box<dyn Iterator<Item = RawPoint> + Send + '_> {
        Box::new(pickups_from_records(&self.records, filter.clone(), limit))
    }

    fn matching_records(
        &self,
        filter: &TripFilter,
    ) -> Box<dyn Iterator<Item = TripRecord> + Send + '_> {
        Box::new(records_matching(&self.records, filter.clone()))
    }
}
