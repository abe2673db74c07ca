//! Heatmap command - q-score distribution per cycle.

use clap::Args;
use tracing::warn;

use crate::cli::{
    check_lane_and_surface, read_run_metrics, run_info, CliError, OutputFormat, RunArgs,
};
use crate::logic::filter::FilterOptions;
use crate::logic::heatmap::{heatmap_title, plot_qscore_heatmap, HeatmapData};

/// Arguments for the heatmap command
#[derive(Args)]
pub struct HeatmapArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Only include this lane
    #[arg(short, long)]
    pub lane: Option<u16>,

    /// Only include tiles on this surface (uses per-tile q-scores)
    #[arg(short, long)]
    pub surface: Option<u16>,
}

/// Execute the heatmap command
///
/// # Errors
///
/// Returns an error if the run folder cannot be loaded or the q-scores are inconsistent.
pub fn run(args: &HeatmapArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    check_lane_and_surface(args.lane, args.surface)?;

    let info = run_info(&args.run);
    let mut options = FilterOptions::new(info.tile_naming);
    options.lane = args.lane;
    options.surface = args.surface;

    let run = read_run_metrics(&args.run.run_dir, info)?;
    if let Some(lane) = args.lane.filter(|&lane| lane > run.lane_count()) {
        return Err(CliError::InvalidArgument(format!(
            "lane {lane} is beyond the flow cell's {} lanes",
            run.lane_count()
        ))
        .into());
    }
    let heatmap = plot_qscore_heatmap(&run, &options)?;
    let title = heatmap_title(&run, &options);
    if heatmap.is_empty() {
        warn!("No q-score metrics in {}", args.run.run_dir.display());
    }
    if verbose {
        eprintln!(
            "Heatmap: {} cycles x {} q-scores",
            heatmap.row_count(),
            heatmap.column_count()
        );
    }

    match format {
        OutputFormat::Text => {
            println!("{title}");
            print_text(&heatmap);
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "title": title,
                "lane": args.lane,
                "surface": args.surface,
                "heatmap": heatmap,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => print_tsv(&heatmap),
    }
    Ok(())
}

fn print_text(heatmap: &HeatmapData) {
    print!("{:>6}", "Cycle");
    for q in 1..=heatmap.column_count() {
        print!(" {:>6}", format!("Q{q}"));
    }
    println!();
    for (cycle, row) in heatmap.rows().enumerate() {
        print!("{:>6}", cycle + 1);
        for value in row {
            print!(" {value:>6.2}");
        }
        println!();
    }
}

fn print_tsv(heatmap: &HeatmapData) {
    let header: Vec<String> = (1..=heatmap.column_count()).map(|q| format!("Q{q}")).collect();
    println!("cycle\t{}", header.join("\t"));
    for (cycle, row) in heatmap.rows().enumerate() {
        let values: Vec<String> = row.iter().map(|v| format!("{v:.4}")).collect();
        println!("{}\t{}", cycle + 1, values.join("\t"));
    }
}
