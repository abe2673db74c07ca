//! By-lane command - distribution of a tile metric across each lane's tiles.

use clap::Args;
use serde::Serialize;

use crate::cli::{
    check_lane_and_surface, interop_dir, read_run_metrics, run_info, CliError, OutputFormat,
    RunArgs,
};
use crate::core::types::MetricKind;
use crate::logic::by_lane::{by_lane_title, populate_candle_stick_by_lane, TileMetricValue};
use crate::logic::filter::FilterOptions;

/// Arguments for the by-lane command
#[derive(Args)]
pub struct ByLaneArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Tile metric to summarize
    #[arg(long, default_value = "cluster-density")]
    pub value: ValueArg,

    /// Read number, required for per-read values (aligned, phasing, prephasing)
    #[arg(short, long)]
    pub read: Option<u16>,

    /// Only include tiles on this surface
    #[arg(short, long)]
    pub surface: Option<u16>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ValueArg {
    ClusterDensity,
    ClusterCount,
    PercentPf,
    PercentAligned,
    PercentPhasing,
    PercentPrephasing,
}

impl From<ValueArg> for TileMetricValue {
    fn from(arg: ValueArg) -> Self {
        match arg {
            ValueArg::ClusterDensity => Self::ClusterDensity,
            ValueArg::ClusterCount => Self::ClusterCount,
            ValueArg::PercentPf => Self::PercentPf,
            ValueArg::PercentAligned => Self::PercentAligned,
            ValueArg::PercentPhasing => Self::PercentPhasing,
            ValueArg::PercentPrephasing => Self::PercentPrephasing,
        }
    }
}

/// Distribution of one series' values within a lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneSummary {
    pub series: String,
    pub lane: u16,
    pub count: usize,
    pub min: f32,
    pub lower_quartile: f32,
    pub median: f32,
    pub upper_quartile: f32,
    pub max: f32,
    pub mean: f32,
}

impl LaneSummary {
    /// Summarize a lane's values; `values` must not be empty
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn new(series: &str, lane: u16, values: &[f32]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f32::total_cmp);
        let mean = sorted.iter().map(|v| f64::from(*v)).sum::<f64>() / sorted.len() as f64;
        Self {
            series: series.to_string(),
            lane,
            count: sorted.len(),
            min: sorted[0],
            lower_quartile: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            upper_quartile: percentile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: mean as f32,
        }
    }
}

/// Linear-interpolated percentile of sorted, non-empty values
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f32], fraction: f32) -> f32 {
    let position = fraction * (sorted.len() - 1) as f32;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let weight = position - below as f32;
    sorted[below] + (sorted[above] - sorted[below]) * weight
}

/// Execute the by-lane command
///
/// # Errors
///
/// Returns an error if the run folder cannot be loaded, has no tile metrics,
/// or the arguments are inconsistent.
pub fn run(args: &ByLaneArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    check_lane_and_surface(None, args.surface)?;
    let value = TileMetricValue::from(args.value);
    if value.is_per_read() && args.read.is_none() {
        return Err(CliError::InvalidArgument(format!("--read is required for {value}")).into());
    }

    let info = run_info(&args.run);
    let mut options = FilterOptions::new(info.tile_naming);
    options.surface = args.surface;
    options.read = args.read;

    let run = read_run_metrics(&args.run.run_dir, info)?;
    let Some(tiles) = run.tile_metrics() else {
        return Err(CliError::MissingMetrics {
            kind: MetricKind::Tile,
            file: MetricKind::Tile.file_name().unwrap_or_default(),
            dir: interop_dir(&args.run.run_dir),
        }
        .into());
    };

    let mut summaries = Vec::new();
    for series in std::iter::once(value).chain(value.pf_counterpart()) {
        let name = series.to_string();
        summaries.extend(populate_candle_stick_by_lane(
            tiles,
            &options,
            |metric| series.value(metric, args.read),
            |lane, values| LaneSummary::new(&name, lane, values),
        )?);
    }
    if verbose {
        eprintln!("{} tiles, {} lane summaries", tiles.len(), summaries.len());
    }

    let title = by_lane_title(&run, &options, value);
    match format {
        OutputFormat::Text => {
            if !title.is_empty() {
                println!("{title}");
            }
            print_text(&summaries);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "title": title,
                "lane_count": run.lane_count(),
                "summaries": summaries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => print_tsv(&summaries),
    }
    Ok(())
}

fn print_text(summaries: &[LaneSummary]) {
    println!(
        "{:<18} {:>4} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Series", "Lane", "Tiles", "Min", "Q1", "Median", "Q3", "Max", "Mean"
    );
    for s in summaries {
        println!(
            "{:<18} {:>4} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.series,
            s.lane,
            s.count,
            s.min,
            s.lower_quartile,
            s.median,
            s.upper_quartile,
            s.max,
            s.mean
        );
    }
}

fn print_tsv(summaries: &[LaneSummary]) {
    println!("series\tlane\tcount\tmin\tlower_quartile\tmedian\tupper_quartile\tmax\tmean");
    for s in summaries {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.series,
            s.lane,
            s.count,
            s.min,
            s.lower_quartile,
            s.median,
            s.upper_quartile,
            s.max,
            s.mean
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_summary() {
        let summary = LaneSummary::new("Density", 1, &[4.0, 1.0, 3.0, 2.0, 5.0]);
        assert_eq!(summary.count, 5);
        assert!((summary.min - 1.0).abs() < f32::EPSILON);
        assert!((summary.lower_quartile - 2.0).abs() < f32::EPSILON);
        assert!((summary.median - 3.0).abs() < f32::EPSILON);
        assert!((summary.upper_quartile - 4.0).abs() < f32::EPSILON);
        assert!((summary.max - 5.0).abs() < f32::EPSILON);
        assert!((summary.mean - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_percentile_interpolates() {
        assert!((percentile(&[1.0, 2.0], 0.5) - 1.5).abs() < f32::EPSILON);
        assert!((percentile(&[7.0], 0.75) - 7.0).abs() < f32::EPSILON);
    }
}
