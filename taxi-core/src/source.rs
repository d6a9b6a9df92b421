//! Read-only access to trip data.
//!
//! The `TripSource` trait is the collaborator that materialises trips and
//! pickup points before the ranking code runs. Implementations apply the
//! caller's [`TripFilter`] and the fare/distance guard; the ranking code
//! assumes both have already happened.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::{RawPoint, Trip, TripRecord};

/// Row predicates supplied by the caller.
///
/// All bounds are inclusive. A record without a parsable pickup date fails
/// any date bound; a trip without a distance fails any distance bound.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use taxi_core::{TripFilter, TripRecord};
///
/// let filter = TripFilter::default()
///     .with_start(NaiveDate::from_ymd_opt(2016, 3, 1).expect("valid date"));
/// let record = TripRecord::new("t1", 10.0, 2.0).with_pickup_datetime("2016-03-14 17:24:55");
/// assert!(filter.matches(&record));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    /// Earliest pickup date.
    pub start: Option<NaiveDate>,
    /// Latest pickup date.
    pub end: Option<NaiveDate>,
    /// Accepted trip distances in kilometres.
    pub distance_km: Option<RangeInclusive<f64>>,
}

impl TripFilter {
    /// Set the earliest pickup date.
    #[must_use]
    pub const fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the latest pickup date.
    #[must_use]
    pub const fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Restrict trip distances to `range`.
    #[must_use]
    pub fn with_distance_km(mut self, range: RangeInclusive<f64>) -> Self {
        self.distance_km = Some(range);
        self
    }

    /// Report whether `record` passes every configured bound.
    #[must_use]
    pub fn matches(&self, record: &TripRecord) -> bool {
        self.matches_dates(record) && self.matches_distance(record)
    }

    fn matches_dates(&self, record: &TripRecord) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return true;
        }
        let Some(date) = record.pickup_date() else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    fn matches_distance(&self, record: &TripRecord) -> bool {
        match (&self.distance_km, record.distance_km) {
            (None, _) => true,
            (Some(range), Some(distance)) => range.contains(&distance),
            (Some(_), None) => false,
        }
    }
}

/// Read-only access to stored trips.
///
/// # Examples
///
/// ```rust
/// use taxi_core::{RawPoint, Trip, TripFilter, TripRecord, TripSource};
/// use taxi_core::source::{pickups_from_records, records_matching, trips_from_records};
///
/// struct VecSource(Vec<TripRecord>);
///
/// impl TripSource for VecSource {
///     fn trips(&self, filter: &TripFilter) -> Box<dyn Iterator<Item = Trip> + Send + '_> {
///         Box::new(trips_from_records(&self.0, filter.clone()))
///     }
///
///     fn pickup_points(
///         &self,
///         filter: &TripFilter,
///         limit: usize,
///     ) -> Box<dyn Iterator<Item = RawPoint> + Send + '_> {
///         Box::new(pickups_from_records(&self.0, filter.clone(), limit))
///     }
///
///     fn matching_records(
///         &self,
///         filter: &TripFilter,
///     ) -> Box<dyn Iterator<Item = TripRecord> + Send + '_> {
///         Box::new(records_matching(&self.0, filter.clone()))
///     }
/// }
///
/// let source = VecSource(vec![TripRecord::new("t1", 10.0, 2.0), TripRecord::new("t0", 3.0, 0.0)]);
/// let trips: Vec<_> = source.trips(&TripFilter::default()).collect();
/// assert_eq!(trips.len(), 1);
/// ```
pub trait TripSource {
    /// Return the trips that pass `filter`.
    ///
    /// Only rows with a fare amount and `distance_km > 0` are returned.
    fn trips(&self, filter: &TripFilter) -> Box<dyn Iterator<Item = Trip> + Send + '_>;

    /// Return at most `limit` pickup points from rows that pass `filter`.
    ///
    /// Points are returned raw; rows with missing or malformed coordinates
    /// still count towards `limit` and are dropped later by the aggregator.
    fn pickup_points(
        &self,
        filter: &TripFilter,
        limit: usize,
    ) -> Box<dyn Iterator<Item = RawPoint> + Send + '_>;

    /// Return every row that passes `filter`, whether or not it is rankable.
    fn matching_records(
        &self,
        filter: &TripFilter,
    ) -> Box<dyn Iterator<Item = TripRecord> + Send + '_>;
}

/// Filter `records` and keep the ones that convert into [`Trip`]s.
pub fn trips_from_records(
    records: &[TripRecord],
    filter: TripFilter,
) -> impl Iterator<Item = Trip> + Send + '_ {
    records
        .iter()
        .filter(move |record| filter.matches(record))
        .filter_map(|record| record.to_trip().ok())
}

/// Filter `records` and yield up to `limit` pickup points.
pub fn pickups_from_records(
    records: &[TripRecord],
    filter: TripFilter,
    limit: usize,
) -> impl Iterator<Item = RawPoint> + Send + '_ {
    records
        .iter()
        .filter(move |record| filter.matches(record))
        .map(TripRecord::pickup)
        .take(limit)
}

/// Filter `records` without applying the fare/distance guard.
pub fn records_matching(
    records: &[TripRecord],
    filter: TripFilter,
) -> impl Iterator<Item = TripRecord> + Send + '_ {
    records
        .iter()
        .filter(move |record| filter.matches(record))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryTripSource;
    use rstest::{fixture, rstest};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 3, day).expect("valid date")
    }

    #[fixture]
    fn source() -> MemoryTripSource {
        MemoryTripSource::with_records([
            TripRecord::new("early", 10.0, 2.0)
                .with_pickup_datetime("2016-03-01 08:00:00")
                .with_pickup(40.75, -73.98),
            TripRecord::new("zero", 10.0, 0.0)
                .with_pickup_datetime("2016-03-02 08:00:00")
                .with_pickup(40.75, -73.98),
            TripRecord {
                fare_amount: None,
                ..TripRecord::new("unpriced", 0.0, 3.0)
            }
            .with_pickup_datetime("2016-03-03 08:00:00"),
            TripRecord::new("late", 30.0, 5.0)
                .with_pickup_datetime("2016-03-20 23:59:59")
                .with_pickup("40.64", "-73.78"),
        ])
    }

    fn ids(trips: impl Iterator<Item = Trip>) -> Vec<String> {
        trips.map(|trip| trip.trip_id().to_owned()).collect()
    }

    #[rstest]
    fn trips_drop_rows_without_fare_or_positive_distance(source: MemoryTripSource) {
        let trips = ids(source.trips(&TripFilter::default()));
        assert_eq!(trips, ["early", "late"]);
    }

    #[rstest]
    #[case(TripFilter::default().with_start(date(2)), &["late"])]
    #[case(TripFilter::default().with_end(date(19)), &["early"])]
    #[case(TripFilter::default().with_start(date(1)).with_end(date(20)), &["early", "late"])]
    #[case(TripFilter::default().with_distance_km(0.0..=3.0), &["early"])]
    fn trips_respect_filter(
        source: MemoryTripSource,
        #[case] filter: TripFilter,
        #[case] expected: &[&str],
    ) {
        assert_eq!(ids(source.trips(&filter)), expected);
    }

    #[rstest]
    fn date_bounds_exclude_rows_without_timestamp() {
        let source = MemoryTripSource::with_records([TripRecord::new("t", 1.0, 1.0)]);
        let filter = TripFilter::default().with_start(date(1));
        assert_eq!(source.trips(&filter).count(), 0);
        assert_eq!(source.trips(&TripFilter::default()).count(), 1);
    }

    #[rstest]
    fn matching_records_skip_the_fare_guard(source: MemoryTripSource) {
        let all: Vec<_> = source
            .matching_records(&TripFilter::default())
            .map(|record| record.trip_id)
            .collect();
        assert_eq!(all, ["early", "zero", "unpriced", "late"]);

        let windowed = source
            .matching_records(&TripFilter::default().with_end(date(2)))
            .count();
        assert_eq!(windowed, 2);
    }

    #[rstest]
    fn pickup_points_ignore_fare_guard_and_honour_limit(source: MemoryTripSource) {
        let all: Vec<_> = source.pickup_points(&TripFilter::default(), 10).collect();
        assert_eq!(all.len(), 4);
        let capped: Vec<_> = source.pickup_points(&TripFilter::default(), 2).collect();
        assert_eq!(capped.len(), 2);
        assert!(source.pickup_points(&TripFilter::default(), 0).next().is_none());
    }
}
