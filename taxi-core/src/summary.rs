//! Headline statistics over a filtered set of trip rows.
//!
//! Unlike the rankings, the summary reads every row that passed the caller's
//! filter. Rows that fail the fare/distance guard still count as trips, and
//! their recorded values still feed the averages and the revenue total.

use std::collections::BTreeMap;

use chrono::Timelike;
use log::debug;

use crate::TripRecord;

/// Pickups recorded in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourlyCount {
    /// Hour of the day, `0..=23`.
    pub hour: u32,
    /// Number of pickups in that hour.
    pub count: u64,
}

/// Totals, means, and the hourly pickup profile of a set of rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TripSummary {
    /// Number of rows summarised.
    pub total_trips: u64,
    /// Mean recorded distance, or `None` when no row carried one.
    pub avg_distance_km: Option<f64>,
    /// Mean recorded duration, or `None` when no row carried one.
    pub avg_duration_min: Option<f64>,
    /// Sum of recorded fares.
    pub total_revenue: f64,
    /// Pickup counts for every hour with at least one parsable timestamp,
    /// in ascending hour order.
    pub trips_per_hour: Vec<HourlyCount>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    sum: f64,
    count: u64,
}

impl Tally {
    #[expect(clippy::float_arithmetic, reason = "running sum of finite values")]
    fn add(&mut self, value: Option<f64>) {
        if let Some(finite) = value.filter(|candidate| candidate.is_finite()) {
            self.sum += finite;
            self.count = self.count.saturating_add(1);
        }
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "row counts are far below 2^53"
    )]
    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Summarise `records`.
///
/// Missing or non-finite values are left out of the matching average or
/// total; the row itself still counts towards `total_trips`.
///
/// # Examples
/// ```
/// use taxi_core::{TripRecord, summarise};
///
/// let rows = [
///     TripRecord::new("t1", 10.0, 2.0).with_pickup_datetime("2016-03-01 08:15:00"),
///     TripRecord::new("t2", 30.0, 4.0).with_pickup_datetime("2016-03-01 08:45:00"),
/// ];
/// let summary = summarise(&rows);
/// assert_eq!(summary.total_trips, 2);
/// assert_eq!(summary.avg_distance_km, Some(3.0));
/// assert_eq!(summary.total_revenue, 40.0);
/// assert_eq!(summary.trips_per_hour.len(), 1);
/// ```
#[must_use]
pub fn summarise<'a, I>(records: I) -> TripSummary
where
    I: IntoIterator<Item = &'a TripRecord>,
{
    let mut total_trips = 0_u64;
    let mut distance = Tally::default();
    let mut duration = Tally::default();
    let mut fares = Tally::default();
    let mut hours: BTreeMap<u32, u64> = BTreeMap::new();

    for record in records {
        total_trips = total_trips.saturating_add(1);
        distance.add(record.distance_km);
        duration.add(record.duration_min);
        fares.add(record.fare_amount);
        if let Some(time) = record.pickup_time() {
            let slot = hours.entry(time.hour()).or_insert(0);
            *slot = slot.saturating_add(1);
        }
    }
    debug!(
        "summarised {total_trips} rows across {} pickup hours",
        hours.len()
    );

    TripSummary {
        total_trips,
        avg_distance_km: distance.mean(),
        avg_duration_min: duration.mean(),
        total_revenue: fares.sum,
        trips_per_hour: hours
            .into_iter()
            .map(|(hour, count)| HourlyCount { hour, count })
            .collect(),
    }
}
