//! Command-line interface for ranking taxi trips and pickup zones and for
//! summarising trips in a pickup window.
#![forbid(unsafe_code)]

use std::convert::Infallible;
use std::io::Write;
use std::ops::RangeInclusive;
use std::str::FromStr;

use camino::Utf8Path;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use taxi_core::{DEFAULT_TOP_K, TripFilter, TripSource};
use taxi_data::{JsonTripSource, TripSourceConfig};

mod error;
mod summary;
mod top_trips;
mod zones;

pub use error::CliError;

use summary::SummaryArgs;
use top_trips::TopTripsArgs;
use zones::{BusiestZonesArgs, HeatmapArgs};

pub(crate) const ARG_DATASET: &str = "dataset";
pub(crate) const ARG_TOP_N: &str = "top-n";
pub(crate) const ARG_GRID_SIZE: &str = "grid-size";
pub(crate) const ARG_MAX_POINTS: &str = "max-points";
pub(crate) const ARG_START: &str = "start";
pub(crate) const ARG_END: &str = "end";
pub(crate) const ARG_MIN_DISTANCE: &str = "min-distance";
pub(crate) const ARG_MAX_DISTANCE: &str = "max-distance";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_TOP_TRIPS_DATASET: &str = "TAXI_RANK_CMDS_TOP_TRIPS_DATASET";
pub(crate) const ENV_BUSIEST_ZONES_DATASET: &str = "TAXI_RANK_CMDS_BUSIEST_ZONES_DATASET";
pub(crate) const ENV_HEATMAP_DATASET: &str = "TAXI_RANK_CMDS_HEATMAP_DATASET";
pub(crate) const ENV_SUMMARY_DATASET: &str = "TAXI_RANK_CMDS_SUMMARY_DATASET";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Run the taxi-rank CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments or configuration are invalid, the
/// dataset cannot be loaded, or the result cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let builder = JsonTripSourceBuilder;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::TopTrips(args) => top_trips::run_top_trips_with(args, &builder, &mut stdout),
        Command::BusiestZones(args) => {
            zones::run_busiest_zones_with(args, &builder, &mut stdout)
        }
        Command::Heatmap(args) => zones::run_heatmap_with(args, &builder, &mut stdout),
        Command::Summary(args) => summary::run_summary_with(args, &builder, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "taxi-rank",
    about = "Rank taxi trips by fare per kilometre and pickup zones by demand, and summarise trips",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank trips by fare per kilometre.
    TopTrips(TopTripsArgs),
    /// Rank grid cells by pickup count.
    BusiestZones(BusiestZonesArgs),
    /// Count pickups in every occupied grid cell.
    Heatmap(HeatmapArgs),
    /// Summarise trips in a pickup window.
    Summary(SummaryArgs),
}

/// Raw `--top-n` value as supplied by any configuration layer.
///
/// Resolution is lenient: anything that is not a non-negative integer falls
/// back to [`DEFAULT_TOP_K`] with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum TopN {
    Count(i64),
    Text(String),
}

impl FromStr for TopN {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::Text(raw.to_owned()))
    }
}

impl TopN {
    pub(crate) fn resolve(&self) -> usize {
        let parsed = match self {
            Self::Count(count) => usize::try_from(*count).ok(),
            Self::Text(text) => text.trim().parse::<usize>().ok(),
        };
        parsed.unwrap_or_else(|| {
            warn!("ignoring invalid --{ARG_TOP_N} value {self:?}; using {DEFAULT_TOP_K}");
            DEFAULT_TOP_K
        })
    }
}

pub(crate) fn resolve_top_n(raw: Option<&TopN>) -> usize {
    raw.map_or(DEFAULT_TOP_K, TopN::resolve)
}

/// Build the pickup-date part of a filter from raw option values.
pub(crate) fn pickup_window(start: Option<&str>, end: Option<&str>) -> Result<TripFilter, CliError> {
    Ok(TripFilter {
        start: parse_date(ARG_START, start)?,
        end: parse_date(ARG_END, end)?,
        distance_km: None,
    })
}

fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, CliError> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
            CliError::InvalidDate {
                field,
                value: value.to_owned(),
                source,
            }
        })
    })
    .transpose()
}

/// Combine optional distance bounds into an inclusive range.
///
/// A missing lower bound is zero and a missing upper bound is unbounded.
pub(crate) fn distance_range(
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Option<RangeInclusive<f64>>, CliError> {
    if min.is_none() && max.is_none() {
        return Ok(None);
    }
    let lower = min.unwrap_or(0.0);
    let upper = max.unwrap_or(f64::INFINITY);
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(CliError::InvalidDistanceRange {
            min: lower,
            max: upper,
        });
    }
    Ok(Some(lower..=upper))
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match taxi_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Opens the trip source for one command invocation.
pub(crate) trait TripSourceBuilder {
    fn build(&self, dataset: &Utf8Path) -> Result<Box<dyn TripSource>, CliError>;
}

/// Loads the dataset as a JSON array of trip records.
pub(crate) struct JsonTripSourceBuilder;

impl TripSourceBuilder for JsonTripSourceBuilder {
    fn build(&self, dataset: &Utf8Path) -> Result<Box<dyn TripSource>, CliError> {
        let source = JsonTripSource::open(&TripSourceConfig::new(dataset))?;
        Ok(Box::new(source))
    }
}

/// Serialise `value` as pretty JSON to `output`, or to `stdout` when unset.
pub(crate) fn write_output<T>(
    value: &T,
    output: Option<&Utf8Path>,
    stdout: &mut dyn Write,
) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    let Some(path) = output else {
        return write_payload(stdout, &payload);
    };
    let mut file = taxi_fs::create_utf8_file(path).map_err(|source| CliError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })?;
    write_payload(&mut file, &payload)?;
    info!("wrote result to {path}");
    Ok(())
}

fn write_payload(writer: &mut dyn Write, payload: &str) -> Result<(), CliError> {
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    writer.flush().map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
