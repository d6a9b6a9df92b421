//! `top-trips` command: rank trips by fare per kilometre.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use taxi_core::{Trip, TripFilter, TripSource, rank_trips_by_fare_per_km};

use crate::{
    ARG_DATASET, ARG_END, ARG_MAX_DISTANCE, ARG_MIN_DISTANCE, ARG_OUTPUT, ARG_START, ARG_TOP_N,
    CliError, ENV_TOP_TRIPS_DATASET, TopN, TripSourceBuilder, distance_range, pickup_window,
    require_existing, resolve_top_n, write_output,
};

/// CLI arguments for the `top-trips` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "top-trips",
    long_about = "Rank trips by fare divided by distance. Only trips with a \
                 fare and a positive distance are ranked; equal scores keep \
                 their dataset order.",
    about = "Rank trips by fare per kilometre"
)]
#[ortho_config(prefix = "TAXI_RANK")]
pub(crate) struct TopTripsArgs {
    /// JSON file holding an array of trip records.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Number of trips to return (default 10).
    #[arg(long = ARG_TOP_N, value_name = "count", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) top_n: Option<TopN>,
    /// Earliest pickup date, inclusive (YYYY-MM-DD).
    #[arg(long = ARG_START, value_name = "date")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Latest pickup date, inclusive (YYYY-MM-DD).
    #[arg(long = ARG_END, value_name = "date")]
    #[serde(default)]
    pub(crate) end: Option<String>,
    /// Shortest trip distance in kilometres.
    #[arg(long = ARG_MIN_DISTANCE, value_name = "km")]
    #[serde(default)]
    pub(crate) min_distance: Option<f64>,
    /// Longest trip distance in kilometres.
    #[arg(long = ARG_MAX_DISTANCE, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance: Option<f64>,
    /// Write the JSON result to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TopTripsArgs {
    pub(crate) fn into_config(self) -> Result<TopTripsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TopTripsConfig::try_from(merged)
    }
}

/// Resolved `top-trips` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TopTripsConfig {
    pub(crate) dataset: Utf8PathBuf,
    pub(crate) top_n: usize,
    pub(crate) filter: TripFilter,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<TopTripsArgs> for TopTripsConfig {
    type Error = CliError;

    fn try_from(args: TopTripsArgs) -> Result<Self, Self::Error> {
        let dataset = args.dataset.ok_or(CliError::MissingArgument {
            field: ARG_DATASET,
            env: ENV_TOP_TRIPS_DATASET,
        })?;
        let mut filter = pickup_window(args.start.as_deref(), args.end.as_deref())?;
        filter.distance_km = distance_range(args.min_distance, args.max_distance)?;
        Ok(Self {
            dataset,
            top_n: resolve_top_n(args.top_n.as_ref()),
            filter,
            output: args.output,
        })
    }
}

pub(crate) fn run_top_trips_with(
    args: TopTripsArgs,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_top_trips(&config, builder, stdout)
}

pub(crate) fn execute_top_trips(
    config: &TopTripsConfig,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.dataset, ARG_DATASET)?;
    let source = builder.build(&config.dataset)?;
    let trips: Vec<Trip> = source.trips(&config.filter).collect();
    let ranked = rank_trips_by_fare_per_km(&trips, config.top_n);
    info!(
        "ranked {} eligible trips, returning {}",
        trips.len(),
        ranked.len()
    );
    write_output(&ranked, config.output.as_deref(), stdout)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TopTripsConfig, CliError> {
    let merged = TopTripsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TopTripsConfig::try_from(merged)
}
