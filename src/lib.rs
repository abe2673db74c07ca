//! # interop-metrics
//!
//! A library for decoding Illumina InterOp binary metric files and aggregating
//! them into per-lane and per-cycle views.
//!
//! A sequencing run writes one InterOp file per metric kind (tile, error,
//! extraction, image, q-score, ...). Each file is a short header followed by
//! fixed or variable width little-endian records. `interop-metrics` decodes
//! every supported format version into typed, uniquely keyed collections and
//! builds the aggregates plotting and reporting tools consume.
//!
//! ## Features
//!
//! - **Streaming decode**: records are read one at a time against a static layout table
//! - **Strict validation**: unsupported versions, bad headers, truncation and duplicate keys are typed errors
//! - **Compressed q-scores**: binned histograms are decoded with their bin table and spread back to raw q-values
//! - **Aggregation**: per-lane q-score roll-up, q-score heatmaps, per-lane grouping of tile values
//!
//! ## Example
//!
//! ```rust,no_run
//! use interop_metrics::core::q::QMetric;
//! use interop_metrics::core::run::RunMetrics;
//! use interop_metrics::logic::filter::FilterOptions;
//! use interop_metrics::logic::heatmap::plot_qscore_heatmap;
//! use interop_metrics::parsing::reader::read_metric_file;
//! use std::path::Path;
//!
//! let run = RunMetrics::default();
//! run.set(read_metric_file::<QMetric>(Path::new("InterOp/QMetricsOut.bin")).unwrap())
//!     .unwrap();
//!
//! let heatmap = plot_qscore_heatmap(&run, &FilterOptions::default().with_lane(1)).unwrap();
//! for (cycle, row) in heatmap.rows().enumerate() {
//!     println!("{}: {:?}", cycle + 1, row);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Record types, keys, collections and errors
//! - [`parsing`]: Layout table and streaming decoder
//! - [`logic`]: Filters and aggregations
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod logic;
pub mod parsing;

// Re-export commonly used types for convenience
pub use core::error::MetricError;
pub use core::metric::{DecodeMetric, Metric};
pub use core::metric_set::MetricSet;
pub use core::run::RunMetrics;
pub use core::types::*;
pub use parsing::reader::{read_metric_file, read_metrics, MetricReader};
