//! Summary command - list what was decoded from a run folder.

use clap::Args;

use crate::cli::{read_run_metrics, run_info, OutputFormat, RunArgs};
use crate::core::run::{KindSummary, RunMetrics};

/// Arguments for the summary command
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Also derive the per-lane q-score collection
    #[arg(long)]
    pub by_lane: bool,
}

/// Execute the summary command
///
/// # Errors
///
/// Returns an error if the run folder cannot be loaded.
pub fn run(args: &SummaryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let run = read_run_metrics(&args.run.run_dir, run_info(&args.run))?;
    if args.by_lane {
        run.q_by_lane_metrics()?;
    }
    let summaries = run.summaries();

    if verbose {
        eprintln!(
            "Run: {} ({} metric kinds, max lane {})",
            args.run.run_dir.display(),
            summaries.len(),
            run.max_lane()
        );
    }

    match format {
        OutputFormat::Text => print_text(&run, &summaries),
        OutputFormat::Json => print_json(&run, &summaries)?,
        OutputFormat::Tsv => print_tsv(&summaries),
    }
    Ok(())
}

fn print_text(run: &RunMetrics, summaries: &[KindSummary]) {
    if let Some(barcode) = &run.info().flowcell_barcode {
        println!("Flow cell: {barcode}");
    }
    println!(
        "Lanes: {}, surfaces: {}",
        run.lane_count(),
        run.surface_count()
    );
    println!(
        "{:<20} {:>7} {:>9} {:>5} {:>6} {:>5} {:>5}",
        "Kind", "Version", "Records", "Lanes", "Cycles", "Reads", "Bins"
    );
    for s in summaries {
        let bins = if s.compressed {
            s.bin_count.to_string()
        } else {
            "-".to_string()
        };
        println!(
            "{:<20} {:>7} {:>9} {:>5} {:>6} {:>5} {:>5}",
            s.kind.to_string(),
            s.version,
            s.records,
            s.max_lane,
            s.max_cycle,
            s.max_read,
            bins
        );
    }
}

fn print_json(run: &RunMetrics, summaries: &[KindSummary]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "run": run.info(),
        "lane_count": run.lane_count(),
        "surface_count": run.surface_count(),
        "metrics": summaries,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(summaries: &[KindSummary]) {
    println!("kind\tversion\trecords\tmax_lane\tmax_cycle\tmax_read\tbin_count\tcompressed");
    for s in summaries {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            s.kind, s.version, s.records, s.max_lane, s.max_cycle, s.max_read, s.bin_count, s.compressed
        );
    }
}
