//! Test helpers for writing datasets and substituting the trip source.

use super::*;
use camino::Utf8PathBuf;
use std::fs;
use taxi_core::RawPoint;
use taxi_core::test_support::MemoryTripSource;
use tempfile::TempDir;

/// Three rankable trips plus one the collaborator guard must drop.
pub(super) const SAMPLE_TRIPS: &str = r#"[
    {"trip_id": "t1", "fare_amount": 10.0, "distance_km": 2.0,
     "pickup_datetime": "2016-03-01 08:15:00"},
    {"trip_id": "t2", "fare_amount": 30.0, "distance_km": 5.0,
     "pickup_datetime": "2016-03-02 09:30:00"},
    {"trip_id": "t3", "fare_amount": 5.0, "distance_km": 1.0,
     "pickup_datetime": "2016-03-03 18:45:00"},
    {"trip_id": "stationary", "fare_amount": 52.0, "distance_km": 0.0,
     "pickup_datetime": "2016-03-02 11:00:00"}
]"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directories");
    }
    fs::write(path, contents).expect("write test file");
}

/// Temporary directory holding a dataset path and an output path.
#[derive(Debug)]
pub(super) struct Workspace {
    _tmp: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) dataset: Utf8PathBuf,
    pub(super) output: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let dataset = root.join("trips.json");
        let output = root.join("reports/ranking.json");
        Self {
            _tmp: tmp,
            root,
            dataset,
            output,
        }
    }

    pub(super) fn write_dataset(&self, contents: &str) {
        write_utf8(&self.dataset, contents.as_bytes());
    }
}

/// Hands out a clone of an in-memory source regardless of the dataset path.
#[derive(Debug, Default)]
pub(super) struct MemorySourceBuilder {
    pub(super) source: MemoryTripSource,
}

impl TripSourceBuilder for MemorySourceBuilder {
    fn build(&self, _dataset: &Utf8Path) -> Result<Box<dyn TripSource>, CliError> {
        Ok(Box::new(self.source.clone()))
    }
}

/// Pickups with two rows in the Times Square cell, one at JFK, and one
/// unparsable row.
pub(super) fn pickup_source() -> MemoryTripSource {
    MemoryTripSource::with_pickups([
        RawPoint::new(40.758, -73.985),
        RawPoint::new(40.641, -73.778),
        RawPoint::new("40.7585", "-73.9855"),
        RawPoint::new("", "not a number"),
    ])
}

/// Decode captured stdout as a JSON array.
pub(super) fn json_rows(stdout: &[u8]) -> Vec<serde_json::Value> {
    let text = std::str::from_utf8(stdout).expect("stdout utf-8");
    assert!(text.ends_with('\n'), "output should end with a newline");
    serde_json::from_str(text).expect("output should be a JSON array")
}

pub(super) fn string_field(row: &serde_json::Value, key: &str) -> String {
    row.get(key)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_else(|| panic!("row {row} lacks string field {key}"))
        .to_owned()
}

pub(super) fn number_field(row: &serde_json::Value, key: &str) -> f64 {
    row.get(key)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or_else(|| panic!("row {row} lacks numeric field {key}"))
}
