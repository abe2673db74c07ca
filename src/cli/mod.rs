//! Command-line interface for interop-metrics.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **summary**: List the metric kinds found in a run folder and their extents
//! - **heatmap**: Print the q-score heatmap for a run
//! - **by-lane**: Summarize a tile metric per lane
//! - **layouts**: List the supported InterOp format versions and their record layouts
//!
//! ## Usage
//!
//! ```text
//! # What was loaded from a run folder
//! interop-metrics summary /data/runs/230101_M00001_0001_000000000-ABCDE
//!
//! # Q-score heatmap for lane 1, as TSV
//! interop-metrics heatmap RUN_DIR --lane 1 --format tsv
//!
//! # Cluster density per lane, with the PF series
//! interop-metrics by-lane RUN_DIR --value cluster-density
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Invalid arguments |
//! | 2 | Malformed InterOp file |
//! | 3 | Unexpected error |
//! | 4 | No InterOp records found |

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::corrected_intensity::CorrectedIntensityMetric;
use crate::core::error::MetricError;
use crate::core::error_metric::ErrorMetric;
use crate::core::extraction::ExtractionMetric;
use crate::core::image::ImageMetric;
use crate::core::index::IndexMetric;
use crate::core::metric::DecodeMetric;
use crate::core::q::QMetric;
use crate::core::q_collapsed::QCollapsedMetric;
use crate::core::run::{RunInfo, RunMetrics, RunSlot};
use crate::core::tile::TileMetric;
use crate::core::types::{MetricKind, TileNaming};
use crate::parsing::reader::read_metric_file;

pub mod by_lane;
pub mod heatmap;
pub mod layouts;
pub mod summary;

#[derive(Parser)]
#[command(name = "interop-metrics")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Decode and summarize Illumina InterOp metric files")]
#[command(
    long_about = "interop-metrics reads the binary InterOp files a sequencer writes during a run.\n\nIt decodes every supported format version and reports:\n- Which metric kinds are present and their extents\n- Q-score heatmaps per cycle\n- Per-lane summaries of tile metrics"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List loaded metric kinds with their version and extents
    Summary(summary::SummaryArgs),

    /// Q-score heatmap (cycles by q-score, percent of maximum)
    Heatmap(heatmap::HeatmapArgs),

    /// Per-lane summary of a tile metric
    ByLane(by_lane::ByLaneArgs),

    /// List supported format versions and record layouts
    Layouts,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Options shared by every command that reads a run folder
#[derive(clap::Args)]
pub struct RunArgs {
    /// Run folder (containing an InterOp directory) or the InterOp directory itself
    #[arg(required = true)]
    pub run_dir: PathBuf,

    /// How tile numbers encode the surface
    #[arg(long, default_value = "four-digit")]
    pub tile_naming: TileNamingArg,

    /// Flow cell barcode, reported alongside the results
    #[arg(long)]
    pub flowcell: Option<String>,

    /// Lanes on the flow cell (default: largest lane in the metrics)
    #[arg(long)]
    pub lane_count: Option<u16>,

    /// Surfaces per lane (default: largest surface in the tile numbers)
    #[arg(long)]
    pub surface_count: Option<u16>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum TileNamingArg {
    /// Tiles numbered like 1101
    FourDigit,
    /// Tiles numbered like 11101
    FiveDigit,
}

impl From<TileNamingArg> for TileNaming {
    fn from(arg: TileNamingArg) -> Self {
        match arg {
            TileNamingArg::FourDigit => TileNaming::FourDigit,
            TileNamingArg::FiveDigit => TileNaming::FiveDigit,
        }
    }
}

/// Failures of the command layer itself
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No InterOp files found in {}", .0.display())]
    NoInteropFiles(PathBuf),

    #[error("InterOp files in {} contain no records", .0.display())]
    EmptyInterop(PathBuf),

    #[error("{kind} metrics are required but {file} was not found in {}", .dir.display())]
    MissingMetrics {
        kind: MetricKind,
        file: &'static str,
        dir: PathBuf,
    },
}

/// Execute the parsed command line
///
/// # Errors
///
/// Returns an error if the run folder cannot be loaded or the command fails.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Summary(args) => summary::run(&args, cli.format, cli.verbose),
        Commands::Heatmap(args) => heatmap::run(&args, cli.format, cli.verbose),
        Commands::ByLane(args) => by_lane::run(&args, cli.format, cli.verbose),
        Commands::Layouts => layouts::run(cli.format),
    }
}

/// Process exit code for a failed command
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::InvalidArgument(_) => 1,
            CliError::NoInteropFiles(_)
            | CliError::EmptyInterop(_)
            | CliError::MissingMetrics { .. } => 4,
        };
    }
    match err.downcast_ref::<MetricError>() {
        Some(metric_err) if metric_err.is_format_error() => 2,
        _ => 3,
    }
}

/// Directory holding the InterOp files: `<run_dir>/InterOp` if present, else `run_dir`
#[must_use]
pub fn interop_dir(run_dir: &Path) -> PathBuf {
    let nested = run_dir.join("InterOp");
    if nested.is_dir() {
        nested
    } else {
        run_dir.to_path_buf()
    }
}

/// Load every InterOp file present in a run folder.
///
/// Each kind is decoded on its own thread. Missing files are skipped.
///
/// # Errors
///
/// Returns the first decoding failure, `CliError::NoInteropFiles` if no file
/// was found, or `CliError::EmptyInterop` if every file held zero records.
pub fn read_run_metrics(run_dir: &Path, info: RunInfo) -> anyhow::Result<RunMetrics> {
    let dir = interop_dir(run_dir);
    let run = RunMetrics::new(info);
    debug!("Loading InterOp files from {}", dir.display());

    let results: Vec<anyhow::Result<bool>> = std::thread::scope(|s| {
        let handles = vec![
            s.spawn(|| load::<TileMetric>(&run, &dir)),
            s.spawn(|| load::<ErrorMetric>(&run, &dir)),
            s.spawn(|| load::<ExtractionMetric>(&run, &dir)),
            s.spawn(|| load::<ImageMetric>(&run, &dir)),
            s.spawn(|| load::<QMetric>(&run, &dir)),
            s.spawn(|| load::<QCollapsedMetric>(&run, &dir)),
            s.spawn(|| load::<CorrectedIntensityMetric>(&run, &dir)),
            s.spawn(|| load::<IndexMetric>(&run, &dir)),
        ];
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result.map_err(anyhow::Error::from),
                Err(_) => Err(anyhow::anyhow!("InterOp loader thread panicked")),
            })
            .collect()
    });

    let mut loaded = 0;
    for result in results {
        if result? {
            loaded += 1;
        }
    }
    if loaded == 0 {
        return Err(CliError::NoInteropFiles(dir).into());
    }
    if run.is_empty() {
        return Err(CliError::EmptyInterop(dir).into());
    }
    info!("Loaded {loaded} InterOp files from {}", dir.display());
    Ok(run)
}

/// Decode one kind into its slot; `Ok(false)` when its file is absent
fn load<M: DecodeMetric + RunSlot>(run: &RunMetrics, dir: &Path) -> Result<bool, MetricError> {
    let Some(file_name) = M::KIND.file_name() else {
        return Ok(false);
    };
    let path = dir.join(file_name);
    if !path.is_file() {
        debug!("{} not present, skipping {} metrics", path.display(), M::KIND);
        return Ok(false);
    }
    let set = read_metric_file::<M>(&path)?;
    debug!(
        "{}: version {}, {} records",
        path.display(),
        set.version(),
        set.len()
    );
    run.set(set)?;
    Ok(true)
}

/// Build the run metadata from command-line options
pub(crate) fn run_info(args: &RunArgs) -> RunInfo {
    RunInfo {
        flowcell_barcode: args.flowcell.clone(),
        lane_count: args.lane_count.unwrap_or(0),
        surface_count: args.surface_count.unwrap_or(0),
        tile_naming: args.tile_naming.into(),
    }
}

/// Reject a 0 lane or surface, which would silently match nothing
pub(crate) fn check_lane_and_surface(
    lane: Option<u16>,
    surface: Option<u16>,
) -> Result<(), CliError> {
    if lane == Some(0) {
        return Err(CliError::InvalidArgument("lanes are numbered from 1".to_string()));
    }
    if surface == Some(0) {
        return Err(CliError::InvalidArgument("surfaces are numbered from 1".to_string()));
    }
    Ok(())
}
