//! `summary` command: headline statistics for a pickup window.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use taxi_core::{TripFilter, TripRecord, TripSource, summarise};

use crate::{
    ARG_DATASET, ARG_END, ARG_OUTPUT, ARG_START, CliError, ENV_SUMMARY_DATASET, TripSourceBuilder,
    pickup_window, require_existing, write_output,
};

/// CLI arguments for the `summary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "summary",
    long_about = "Report the trip count, mean distance, mean duration, total \
                 revenue, and pickups per hour of day for every row in the \
                 pickup window. Rows without a fare or a positive distance \
                 are still counted.",
    about = "Summarise trips in a pickup window"
)]
#[ortho_config(prefix = "TAXI_RANK")]
pub(crate) struct SummaryArgs {
    /// JSON file holding an array of trip records.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Earliest pickup date, inclusive (YYYY-MM-DD).
    #[arg(long = ARG_START, value_name = "date")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Latest pickup date, inclusive (YYYY-MM-DD).
    #[arg(long = ARG_END, value_name = "date")]
    #[serde(default)]
    pub(crate) end: Option<String>,
    /// Write the JSON result to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl SummaryArgs {
    pub(crate) fn into_config(self) -> Result<SummaryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SummaryConfig::try_from(merged)
    }
}

/// Resolved `summary` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SummaryConfig {
    pub(crate) dataset: Utf8PathBuf,
    pub(crate) filter: TripFilter,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<SummaryArgs> for SummaryConfig {
    type Error = CliError;

    fn try_from(args: SummaryArgs) -> Result<Self, Self::Error> {
        let dataset = args.dataset.ok_or(CliError::MissingArgument {
            field: ARG_DATASET,
            env: ENV_SUMMARY_DATASET,
        })?;
        Ok(Self {
            dataset,
            filter: pickup_window(args.start.as_deref(), args.end.as_deref())?,
            output: args.output,
        })
    }
}

pub(crate) fn run_summary_with(
    args: SummaryArgs,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_summary(&config, builder, stdout)
}

pub(crate) fn execute_summary(
    config: &SummaryConfig,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.dataset, ARG_DATASET)?;
    let source = builder.build(&config.dataset)?;
    let records: Vec<TripRecord> = source.matching_records(&config.filter).collect();
    let summary = summarise(&records);
    info!("summarised {} trips", summary.total_trips);
    write_output(&summary, config.output.as_deref(), stdout)
}
