//! Layouts command - list supported InterOp format versions.

use crate::cli::OutputFormat;
use crate::parsing::layout::{Layout, Repeat, LAYOUTS, MAX_Q_BINS};

/// Execute the layouts command
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for layout in LAYOUTS {
                println!(
                    "{} v{} ({:?} header, {})",
                    layout.kind,
                    layout.version,
                    layout.header,
                    describe_width(layout)
                );
                for field in layout.fields {
                    let repeat = match field.repeat {
                        Repeat::Times(1) => String::new(),
                        Repeat::Times(n) => format!(" x {n}"),
                        Repeat::PerBin => " x bins".to_string(),
                    };
                    println!("    {:<28} {:?}{repeat}", field.name, field.ty);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(LAYOUTS)?),
        OutputFormat::Tsv => {
            println!("kind\tversion\theader\tfield\ttype\trepeat");
            for layout in LAYOUTS {
                for field in layout.fields {
                    let repeat = match field.repeat {
                        Repeat::Times(n) => n.to_string(),
                        Repeat::PerBin => "bins".to_string(),
                    };
                    println!(
                        "{}\t{}\t{:?}\t{}\t{:?}\t{}",
                        layout.kind, layout.version, layout.header, field.name, field.ty, repeat
                    );
                }
            }
        }
    }
    Ok(())
}

fn describe_width(layout: &Layout) -> String {
    if layout.fields.iter().any(|f| f.repeat == Repeat::PerBin) {
        let uncompressed = layout
            .record_width(usize::from(MAX_Q_BINS))
            .unwrap_or_default();
        return format!("record width depends on bin count, {uncompressed} bytes at {MAX_Q_BINS} bins");
    }
    match layout.record_width(0) {
        Some(width) => format!("{width} byte records"),
        None => "variable-width records".to_string(),
    }
}
