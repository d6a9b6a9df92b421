//! JSON-backed trip source.

use std::fmt;
use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use taxi_core::source::{pickups_from_records, records_matching, trips_from_records};
use taxi_core::{RawPoint, Trip, TripFilter, TripRecord, TripSource};
use taxi_fs::open_utf8_file;
use thiserror::Error;

/// Location of a trip dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSourceConfig {
    /// JSON file holding an array of trip records.
    pub dataset: Utf8PathBuf,
}

impl TripSourceConfig {
    /// Point the source at `dataset`.
    pub fn new(dataset: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }
}

/// Errors raised while loading a trip dataset.
#[derive(Debug, Error)]
pub enum TripSourceError {
    /// The dataset file could not be opened.
    #[error("failed to open trip dataset at {path}: {source}")]
    Open {
        /// Location of the dataset on disk.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The dataset was not a JSON array of trip records.
    #[error("failed to parse trip dataset at {path}: {source}")]
    Parse {
        /// Location of the dataset on disk.
        path: Utf8PathBuf,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only trip source holding every record of a JSON dataset in memory.
///
/// The file is read once by [`JsonTripSource::open`]; queries scan the loaded
/// rows in file order.
///
/// # Examples
/// ```no_run
/// use taxi_core::{TripFilter, TripSource, rank_trips_by_fare_per_km};
/// use taxi_data::{JsonTripSource, TripSourceConfig};
///
/// # fn main() -> Result<(), taxi_data::TripSourceError> {
/// let source = JsonTripSource::open(&TripSourceConfig::new("trips.json"))?;
/// let trips: Vec<_> = source.trips(&TripFilter::default()).collect();
/// let top = rank_trips_by_fare_per_km(&trips, 10);
/// # let _ = top;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JsonTripSource {
    path: Utf8PathBuf,
    records: Vec<TripRecord>,
}

impl fmt::Debug for JsonTripSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonTripSource")
            .field("path", &self.path)
            .field("records", &self.records.len())
            .finish()
    }
}

impl JsonTripSource {
    /// Load the dataset named by `config`.
    ///
    /// # Errors
    /// Returns [`TripSourceError::Open`] when the file cannot be opened and
    /// [`TripSourceError::Parse`] when it is not a JSON array of records.
    pub fn open(config: &TripSourceConfig) -> Result<Self, TripSourceError> {
        let path = config.dataset.clone();
        let file = open_utf8_file(&path).map_err(|source| TripSourceError::Open {
            path: path.clone(),
            source,
        })?;
        let records: Vec<TripRecord> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| TripSourceError::Parse {
                path: path.clone(),
                source,
            })?;
        info!("loaded {} trip records from {path}", records.len());
        Ok(Self { path, records })
    }

    /// Location the records were read from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Number of rows in the dataset, before any filtering.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TripSource for JsonTripSource {
    fn trips(&self, filter: &TripFilter) -> Box<dyn Iterator<Item = Trip> + Send + '_> {
        debug!("querying trips from {} with {filter:?}", self.path);
        Box::new(trips_from_records(&self.records, filter.clone()))
    }

    fn pickup_points(
        &self,
        filter: &TripFilter,
        limit: usize,
    ) -> Box<dyn Iterator<Item = RawPoint> + Send + '_> {
        debug!(
            "querying at most {limit} pickups from {} with {filter:?}",
            self.path
        );
        Box::new(pickups_from_records(&self.records, filter.clone(), limit))
    }

    fn matching_records(
        &self,
        filter: &TripFilter,
    ) -> Box<dyn Iterator<Item = TripRecord> + Send + '_> {
        debug!("querying rows from {} with {filter:?}", self.path);
        Box::new(records_matching(&self.records, filter.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dataset(contents: &str) -> (NamedTempFile, TripSourceConfig) {
        let mut file = NamedTempFile::new().expect("create dataset");
        file.write_all(contents.as_bytes()).expect("write dataset");
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf-8 path");
        (file, TripSourceConfig::new(path))
    }

    #[fixture]
    fn dataset() -> (NamedTempFile, TripSourceConfig) {
        write_dataset(
            r#"[
                {"trip_id": "a", "fare_amount": 12.0, "distance_km": 3.0,
                 "pickup_datetime": "2016-03-14 17:24:55",
                 "pickup_lat": 40.758, "pickup_lng": -73.985},
                {"trip_id": "b", "fare_amount": null, "distance_km": 2.0,
                 "pickup_lat": "40.7585", "pickup_lng": "-73.9855"},
                {"trip_id": "c", "fare_amount": 7.5, "distance_km": 0.0}
            ]"#,
        )
    }

    #[rstest]
    fn loads_every_row(dataset: (NamedTempFile, TripSourceConfig)) {
        let (_guard, config) = dataset;
        let source = JsonTripSource::open(&config).expect("open dataset");
        assert_eq!(source.len(), 3);
        assert_eq!(source.path(), config.dataset.as_path());
    }

    #[rstest]
    fn trips_skip_rows_without_fare_or_distance(dataset: (NamedTempFile, TripSourceConfig)) {
        let (_guard, config) = dataset;
        let source = JsonTripSource::open(&config).expect("open dataset");
        let ids: Vec<_> = source
            .trips(&TripFilter::default())
            .map(|trip| trip.trip_id().to_owned())
            .collect();
        assert_eq!(ids, ["a"]);
    }

    #[rstest]
    fn pickups_keep_raw_rows_up_to_limit(dataset: (NamedTempFile, TripSourceConfig)) {
        let (_guard, config) = dataset;
        let source = JsonTripSource::open(&config).expect("open dataset");
        assert_eq!(source.pickup_points(&TripFilter::default(), 2).count(), 2);
        assert_eq!(source.pickup_points(&TripFilter::default(), 10).count(), 3);
    }

    #[rstest]
    fn numeric_string_amounts_do_not_abort_the_load() {
        let (_guard, config) = write_dataset(
            r#"[
                {"trip_id": "quoted", "fare_amount": "18.00", "distance_km": "4.5",
                 "duration_min": "21"},
                {"trip_id": "garbled", "fare_amount": "call office", "distance_km": 2.0}
            ]"#,
        );
        let source = JsonTripSource::open(&config).expect("lenient amounts load");
        assert_eq!(source.len(), 2);
        let ids: Vec<_> = source
            .trips(&TripFilter::default())
            .map(|trip| trip.trip_id().to_owned())
            .collect();
        assert_eq!(ids, ["quoted"]);
        let durations: Vec<_> = source
            .matching_records(&TripFilter::default())
            .map(|record| record.duration_min)
            .collect();
        assert_eq!(durations, [Some(21.0), None]);
    }

    #[rstest]
    fn missing_file_is_an_open_error() {
        let config = TripSourceConfig::new("/nonexistent/taxi/trips.json");
        let err = JsonTripSource::open(&config).expect_err("missing dataset");
        assert!(matches!(err, TripSourceError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/taxi/trips.json"));
    }

    #[rstest]
    #[case("{\"trip_id\": \"a\"}")]
    #[case("[{\"fare_amount\": 3.0}]")]
    #[case("not json")]
    fn malformed_dataset_is_a_parse_error(#[case] contents: &str) {
        let (_guard, config) = write_dataset(contents);
        let err = JsonTripSource::open(&config).expect_err("malformed dataset");
        assert!(matches!(err, TripSourceError::Parse { .. }));
    }

    #[rstest]
    fn empty_array_is_an_empty_source() {
        let (_guard, config) = write_dataset("[]");
        let source = JsonTripSource::open(&config).expect("open dataset");
        assert!(source.is_empty());
        assert_eq!(source.trips(&TripFilter::default()).count(), 0);
    }
}
