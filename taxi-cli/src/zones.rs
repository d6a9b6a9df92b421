//! `busiest-zones` and `heatmap` commands: aggregate pickups on a grid.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use taxi_core::{
    CellSize, DEFAULT_CELL_SIZE, DEFAULT_MAX_POINTS, RawPoint, TripFilter, TripSource, heatmap,
    rank_busiest_zones,
};

use crate::{
    ARG_DATASET, ARG_END, ARG_GRID_SIZE, ARG_MAX_POINTS, ARG_OUTPUT, ARG_START, ARG_TOP_N,
    CliError, ENV_BUSIEST_ZONES_DATASET, ENV_HEATMAP_DATASET, TopN, TripSourceBuilder,
    pickup_window, require_existing, resolve_top_n, write_output,
};

/// CLI arguments for the `busiest-zones` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "busiest-zones",
    long_about = "Bucket pickup locations into square grid cells and rank \
                 the cells by pickup count. Each zone is reported at its \
                 cell centroid; equally busy zones keep the order in which \
                 their first pickup appeared.",
    about = "Rank grid cells by pickup count"
)]
#[ortho_config(prefix = "TAXI_RANK")]
pub(crate) struct BusiestZonesArgs {
    /// JSON file holding an array of trip records.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Number of zones to return (default 10).
    #[arg(long = ARG_TOP_N, value_name = "count", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) top_n: Option<TopN>,
    /// Cell edge length in degrees (default 0.01).
    #[arg(long = ARG_GRID_SIZE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) grid_size: Option<f64>,
    /// Ceiling on pickup rows fed to the grid (default 50000).
    #[arg(long = ARG_MAX_POINTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_points: Option<usize>,
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

impl BusiestZonesArgs {
    pub(crate) fn into_config(self) -> Result<ZoneConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ZoneConfig::try_from(merged)
    }
}

/// CLI arguments for the `heatmap` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "heatmap",
    long_about = "Bucket pickup locations into square grid cells and report \
                 every occupied cell with its pickup count.",
    about = "Count pickups in every occupied grid cell"
)]
#[ortho_config(prefix = "TAXI_RANK")]
pub(crate) struct HeatmapArgs {
    /// JSON file holding an array of trip records.
    #[arg(long = ARG_DATASET, value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Cell edge length in degrees (default 0.01).
    #[arg(long = ARG_GRID_SIZE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) grid_size: Option<f64>,
    /// Ceiling on pickup rows fed to the grid (default 50000).
    #[arg(long = ARG_MAX_POINTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_points: Option<usize>,
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

impl HeatmapArgs {
    pub(crate) fn into_config(self) -> Result<GridConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GridConfig::try_from(merged)
    }
}

/// Resolved grid settings shared by both zone commands.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GridConfig {
    pub(crate) dataset: Utf8PathBuf,
    pub(crate) cell_size: CellSize,
    pub(crate) max_points: usize,
    pub(crate) filter: TripFilter,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl GridConfig {
    fn resolve(
        dataset: Utf8PathBuf,
        grid_size: Option<f64>,
        max_points: Option<usize>,
        dates: (Option<&str>, Option<&str>),
        output: Option<Utf8PathBuf>,
    ) -> Result<Self, CliError> {
        let (start, end) = dates;
        Ok(Self {
            dataset,
            cell_size: CellSize::new(grid_size.unwrap_or(DEFAULT_CELL_SIZE))?,
            max_points: max_points.unwrap_or(DEFAULT_MAX_POINTS),
            filter: pickup_window(start, end)?,
            output,
        })
    }

    fn load_pickups(&self, builder: &dyn TripSourceBuilder) -> Result<Vec<RawPoint>, CliError> {
        require_existing(&self.dataset, ARG_DATASET)?;
        let source = builder.build(&self.dataset)?;
        let points: Vec<RawPoint> = source
            .pickup_points(&self.filter, self.max_points)
            .collect();
        info!(
            "aggregating {} pickups on a {} degree grid",
            points.len(),
            self.cell_size.degrees()
        );
        Ok(points)
    }
}

impl TryFrom<HeatmapArgs> for GridConfig {
    type Error = CliError;

    fn try_from(args: HeatmapArgs) -> Result<Self, Self::Error> {
        let dataset = args.dataset.ok_or(CliError::MissingArgument {
            field: ARG_DATASET,
            env: ENV_HEATMAP_DATASET,
        })?;
        Self::resolve(
            dataset,
            args.grid_size,
            args.max_points,
            (args.start.as_deref(), args.end.as_deref()),
            args.output,
        )
    }
}

/// Resolved `busiest-zones` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ZoneConfig {
    pub(crate) grid: GridConfig,
    pub(crate) top_n: usize,
}

impl TryFrom<BusiestZonesArgs> for ZoneConfig {
    type Error = CliError;

    fn try_from(args: BusiestZonesArgs) -> Result<Self, Self::Error> {
        let dataset = args.dataset.ok_or(CliError::MissingArgument {
            field: ARG_DATASET,
            env: ENV_BUSIEST_ZONES_DATASET,
        })?;
        let grid = GridConfig::resolve(
            dataset,
            args.grid_size,
            args.max_points,
            (args.start.as_deref(), args.end.as_deref()),
            args.output,
        )?;
        Ok(Self {
            grid,
            top_n: resolve_top_n(args.top_n.as_ref()),
        })
    }
}

pub(crate) fn run_busiest_zones_with(
    args: BusiestZonesArgs,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_busiest_zones(&config, builder, stdout)
}

pub(crate) fn execute_busiest_zones(
    config: &ZoneConfig,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let points = config.grid.load_pickups(builder)?;
    let zones = rank_busiest_zones(&points, config.grid.cell_size, config.top_n);
    write_output(&zones, config.grid.output.as_deref(), stdout)
}

pub(crate) fn run_heatmap_with(
    args: HeatmapArgs,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_heatmap(&config, builder, stdout)
}

pub(crate) fn execute_heatmap(
    config: &GridConfig,
    builder: &dyn TripSourceBuilder,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let points = config.load_pickups(builder)?;
    let cells = heatmap(&points, config.cell_size);
    info!("heatmap covers {} occupied cells", cells.len());
    write_output(&cells, config.output.as_deref(), stdout)
}

#[cfg(test)]
pub(crate) fn zone_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ZoneConfig, CliError> {
    let merged = BusiestZonesArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ZoneConfig::try_from(merged)
}
