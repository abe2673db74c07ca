//! Core data types for InterOp metrics.
//!
//! This module provides the types every other layer builds on:
//!
//! - [`MetricKind`](types::MetricKind), [`MetricKey`](types::MetricKey): what a file holds and how records are addressed
//! - [`Metric`](metric::Metric), [`DecodeMetric`](metric::DecodeMetric): the record capabilities
//! - [`MetricSet`](metric_set::MetricSet): a uniquely keyed collection of one kind
//! - [`MetricError`](error::MetricError): the failures decoding and aggregation can report
//! - [`RunMetrics`](run::RunMetrics): one collection per kind for a whole run
//!
//! ## Record Types
//!
//! | Kind | Type | Keyed on |
//! |------|------|----------|
//! | Tile | [`TileMetric`](tile::TileMetric) | lane, tile |
//! | Error | [`ErrorMetric`](error_metric::ErrorMetric) | lane, tile, cycle |
//! | Extraction | [`ExtractionMetric`](extraction::ExtractionMetric) | lane, tile, cycle |
//! | Image | [`ImageMetric`](image::ImageMetric) | lane, tile, cycle |
//! | Q | [`QMetric`](q::QMetric) | lane, tile, cycle |
//! | QByLane | [`QByLaneMetric`](q::QByLaneMetric) | lane, cycle |
//! | QCollapsed | [`QCollapsedMetric`](q_collapsed::QCollapsedMetric) | lane, tile, cycle |
//! | CorrectedIntensity | [`CorrectedIntensityMetric`](corrected_intensity::CorrectedIntensityMetric) | lane, tile, cycle |
//! | Index | [`IndexMetric`](index::IndexMetric) | lane, tile, read |

pub mod corrected_intensity;
pub mod error;
pub mod error_metric;
pub mod extraction;
pub mod image;
pub mod index;
pub mod metric;
pub mod metric_set;
pub mod q;
pub mod q_collapsed;
pub mod run;
pub mod tile;
pub mod types;
