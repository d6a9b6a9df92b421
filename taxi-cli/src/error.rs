//! Error types emitted by the taxi-rank CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use taxi_core::GridError;
use taxi_data::TripSourceError;
use thiserror::Error;

/// Errors emitted by the taxi-rank CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was supplied.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a regular file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was supplied.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Long flag name of the option.
        field: &'static str,
        /// Path that was supplied.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A date option was not `YYYY-MM-DD`.
    #[error("invalid --{field} date {value:?}, expected YYYY-MM-DD: {source}")]
    InvalidDate {
        /// Long flag name of the option.
        field: &'static str,
        /// Value that failed to parse.
        value: String,
        /// Parser failure.
        #[source]
        source: chrono::ParseError,
    },
    /// The distance bounds were inverted or not finite.
    #[error("invalid distance range {min}..={max} km")]
    InvalidDistanceRange {
        /// Lower bound in kilometres.
        min: f64,
        /// Upper bound in kilometres.
        max: f64,
    },
    /// The grid cell size was rejected.
    #[error("invalid --grid-size: {0}")]
    InvalidCellSize(#[from] GridError),
    /// Loading the trip dataset failed.
    #[error(transparent)]
    LoadTrips(#[from] TripSourceError),
    /// Serialising the ranking result failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        /// Requested output location.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Writing the ranking result failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
