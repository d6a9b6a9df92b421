//! Trip rows as stored upstream and the validated trips the ranking uses.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::{Coordinate, RawPoint};

/// Timestamp layouts accepted for `pickup_datetime`.
const PICKUP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Errors returned by [`Trip::new`] and [`TripRecord::to_trip`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TripRecordError {
    /// The row had no fare amount.
    #[error("trip {trip_id} has no fare amount")]
    MissingFare {
        /// Identifier of the rejected trip.
        trip_id: String,
    },
    /// The row had no distance.
    #[error("trip {trip_id} has no distance")]
    MissingDistance {
        /// Identifier of the rejected trip.
        trip_id: String,
    },
    /// The distance was zero, negative, or `NaN`.
    #[error("trip {trip_id} has non-positive distance {distance_km} km")]
    NonPositiveDistance {
        /// Identifier of the rejected trip.
        trip_id: String,
        /// Rejected distance.
        distance_km: f64,
    },
}

/// A trip eligible for fare-per-km ranking.
///
/// Construction enforces `distance_km > 0`, so [`Trip::fare_per_km`] never
/// divides by zero.
///
/// # Examples
/// ```
/// use taxi_core::Trip;
///
/// let trip = Trip::new("t2", 30.0, 5.0).expect("positive distance");
/// assert_eq!(trip.fare_per_km(), 6.0);
/// assert!(Trip::new("t0", 10.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    trip_id: String,
    fare_amount: f64,
    distance_km: f64,
}

impl Trip {
    /// Validate and construct a trip.
    ///
    /// # Errors
    /// Returns [`TripRecordError::NonPositiveDistance`] unless
    /// `distance_km > 0`.
    pub fn new(
        trip_id: impl Into<String>,
        fare_amount: f64,
        distance_km: f64,
    ) -> Result<Self, TripRecordError> {
        let trip_id = trip_id.into();
        if distance_km > 0.0 {
            Ok(Self {
                trip_id,
                fare_amount,
                distance_km,
            })
        } else {
            Err(TripRecordError::NonPositiveDistance {
                trip_id,
                distance_km,
            })
        }
    }

    /// Trip identifier.
    #[must_use]
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    /// Fare charged for the trip.
    #[must_use]
    pub const fn fare_amount(&self) -> f64 {
        self.fare_amount
    }

    /// Distance travelled in kilometres; always positive.
    #[must_use]
    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Fare divided by distance.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "fare-per-km is a plain ratio over a positive distance"
    )]
    pub fn fare_per_km(&self) -> f64 {
        self.fare_amount / self.distance_km
    }
}

/// One trip row as read from a dataset, before any filtering.
///
/// Every field except the identifier may be absent. Pickup coordinates keep
/// their raw form so the grid aggregator can apply its own lenient parsing.
/// Fare, distance, and duration are decoded the same way: a JSON number or a
/// numeric string is accepted, and any other string or non-finite value is
/// read as absent, so the row fails the collaborator guard instead of failing
/// the whole load.
///
/// # Examples
/// ```
/// use taxi_core::TripRecord;
///
/// let row: TripRecord = serde_json::from_str(
///     r#"{"trip_id": "t1", "fare_amount": "12.50", "distance_km": 2, "duration_min": "n/a"}"#,
/// )
/// .expect("lenient row");
/// assert_eq!(row.fare_amount, Some(12.5));
/// assert_eq!(row.distance_km, Some(2.0));
/// assert_eq!(row.duration_min, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripRecord {
    /// Trip identifier.
    pub trip_id: String,
    /// Fare amount, when recorded.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "lenient_amount")
    )]
    pub fare_amount: Option<f64>,
    /// Distance in kilometres, when recorded.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "lenient_amount")
    )]
    pub distance_km: Option<f64>,
    /// Trip duration in minutes, when recorded.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "lenient_amount")
    )]
    pub duration_min: Option<f64>,
    /// Pickup timestamp such as `2016-03-14 17:24:55`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup_datetime: Option<String>,
    /// Pickup latitude.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup_lat: Option<Coordinate>,
    /// Pickup longitude.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup_lng: Option<Coordinate>,
}

impl TripRecord {
    /// A record with an identifier, fare, and distance and nothing else.
    pub fn new(trip_id: impl Into<String>, fare_amount: f64, distance_km: f64) -> Self {
        Self {
            trip_id: trip_id.into(),
            fare_amount: Some(fare_amount),
            distance_km: Some(distance_km),
            ..Self::default()
        }
    }

    /// Attach a pickup timestamp.
    #[must_use]
    pub fn with_pickup_datetime(mut self, pickup_datetime: impl Into<String>) -> Self {
        self.pickup_datetime = Some(pickup_datetime.into());
        self
    }

    /// Attach a trip duration in minutes.
    #[must_use]
    pub const fn with_duration_min(mut self, duration_min: f64) -> Self {
        self.duration_min = Some(duration_min);
        self
    }

    /// Attach pickup coordinates.
    #[must_use]
    pub fn with_pickup(mut self, lat: impl Into<Coordinate>, lng: impl Into<Coordinate>) -> Self {
        self.pickup_lat = Some(lat.into());
        self.pickup_lng = Some(lng.into());
        self
    }

    /// Convert the row into a rankable trip.
    ///
    /// This is the collaborator guard: only rows with a fare and a distance
    /// strictly greater than zero become trips.
    ///
    /// # Errors
    /// Returns a [`TripRecordError`] describing the first missing or invalid
    /// field.
    pub fn to_trip(&self) -> Result<Trip, TripRecordError> {
        let fare_amount = self.fare_amount.ok_or_else(|| TripRecordError::MissingFare {
            trip_id: self.trip_id.clone(),
        })?;
        let distance_km = self
            .distance_km
            .ok_or_else(|| TripRecordError::MissingDistance {
                trip_id: self.trip_id.clone(),
            })?;
        Trip::new(self.trip_id.clone(), fare_amount, distance_km)
    }

    /// Pickup location in raw form.
    #[must_use]
    pub fn pickup(&self) -> RawPoint {
        RawPoint {
            lat: self.pickup_lat.clone(),
            lng: self.pickup_lng.clone(),
        }
    }

    /// Parsed pickup timestamp, or `None` when absent or unparsable.
    #[must_use]
    pub fn pickup_time(&self) -> Option<NaiveDateTime> {
        let raw = self.pickup_datetime.as_deref()?.trim();
        PICKUP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }

    /// Calendar date of the pickup.
    #[must_use]
    pub fn pickup_date(&self) -> Option<NaiveDate> {
        self.pickup_time().map(|time| time.date())
    }
}

#[cfg(feature = "serde")]
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Coordinate> = serde::Deserialize::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Coordinate::value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(-1.5)]
    #[case(f64::NAN)]
    fn trip_rejects_non_positive_distance(#[case] distance: f64) {
        let result = Trip::new("t", 10.0, distance);
        assert!(matches!(
            result,
            Err(TripRecordError::NonPositiveDistance { .. })
        ));
    }

    #[rstest]
    fn record_without_fare_is_not_a_trip() {
        let record = TripRecord {
            fare_amount: None,
            ..TripRecord::new("t1", 0.0, 2.0)
        };
        assert_eq!(
            record.to_trip(),
            Err(TripRecordError::MissingFare {
                trip_id: "t1".into()
            })
        );
    }

    #[rstest]
    fn record_without_distance_is_not_a_trip() {
        let record = TripRecord {
            distance_km: None,
            ..TripRecord::new("t1", 10.0, 0.0)
        };
        assert!(matches!(
            record.to_trip(),
            Err(TripRecordError::MissingDistance { .. })
        ));
    }

    #[rstest]
    fn record_with_fare_and_distance_converts() {
        let trip = TripRecord::new("t3", 5.0, 1.0)
            .to_trip()
            .expect("valid record");
        assert_eq!(trip.trip_id(), "t3");
        assert_eq!(trip.fare_per_km(), 5.0);
    }

    #[rstest]
    #[case("2016-03-14 17:24:55")]
    #[case("2016-03-14T17:24:55")]
    #[case(" 2016-03-14 17:24:55 ")]
    fn pickup_time_accepts_dataset_layouts(#[case] raw: &str) {
        let record = TripRecord::new("t", 1.0, 1.0).with_pickup_datetime(raw);
        assert_eq!(
            record.pickup_date(),
            NaiveDate::from_ymd_opt(2016, 3, 14)
        );
    }

    #[cfg(feature = "serde")]
    #[rstest]
    #[case(r#"{"trip_id": "t", "fare_amount": 12.5, "distance_km": 3}"#, Some(12.5), Some(3.0))]
    #[case(r#"{"trip_id": "t", "fare_amount": "12.5", "distance_km": " 3 "}"#, Some(12.5), Some(3.0))]
    #[case(r#"{"trip_id": "t", "fare_amount": "free", "distance_km": null}"#, None, None)]
    #[case(r#"{"trip_id": "t"}"#, None, None)]
    fn amounts_accept_numbers_and_numeric_strings(
        #[case] json: &str,
        #[case] fare: Option<f64>,
        #[case] distance: Option<f64>,
    ) {
        let record: TripRecord = serde_json::from_str(json).expect("row decodes");
        assert_eq!(record.fare_amount, fare);
        assert_eq!(record.distance_km, distance);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn unparsable_fare_fails_the_guard_rather_than_decoding() {
        let record: TripRecord =
            serde_json::from_str(r#"{"trip_id": "t9", "fare_amount": "TBC", "distance_km": 4.0}"#)
                .expect("row decodes");
        assert!(matches!(
            record.to_trip(),
            Err(TripRecordError::MissingFare { .. })
        ));
    }

    #[rstest]
    fn unparsable_pickup_time_is_none() {
        let record = TripRecord::new("t", 1.0, 1.0).with_pickup_datetime("yesterday");
        assert!(record.pickup_time().is_none());
    }
}
