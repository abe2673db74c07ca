//! Per-lane grouping of a scalar value extracted from each record.
//!
//! The grouping is generic over record kind and over the summary produced for
//! each lane, so any statistic (five-number summary, mean, count) can be
//! plugged in by the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::Metric;
use crate::core::metric_set::MetricSet;
use crate::core::run::RunMetrics;
use crate::core::tile::{ReadMetric, TileMetric};
use crate::logic::filter::FilterOptions;

/// Group the values of records passing `options` by lane and summarize each lane.
///
/// NaN values are skipped. Lanes left without any value are omitted from the
/// output, which is ordered by lane.
///
/// # Errors
///
/// Returns `MetricError::IndexOutOfBounds` if a matching record has lane 0.
pub fn populate_candle_stick_by_lane<M, P, V, S>(
    set: &MetricSet<M>,
    options: &FilterOptions,
    value: V,
    mut summarize: S,
) -> Result<Vec<P>, MetricError>
where
    M: Metric,
    V: Fn(&M) -> f32,
    S: FnMut(u16, &[f32]) -> P,
{
    let mut by_lane: BTreeMap<u16, Vec<f32>> = BTreeMap::new();
    for metric in set.iter().filter(|m| options.valid_tile(*m)) {
        if metric.lane() == 0 {
            return Err(MetricError::IndexOutOfBounds(format!(
                "{} record {} has lane 0",
                M::KIND,
                metric.key()
            )));
        }
        let v = value(metric);
        if v.is_nan() {
            continue;
        }
        by_lane.entry(metric.lane()).or_default().push(v);
    }

    Ok(by_lane
        .into_iter()
        .map(|(lane, values)| summarize(lane, &values))
        .collect())
}

/// A scalar that can be read off a [`TileMetric`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileMetricValue {
    ClusterDensity,
    ClusterDensityPf,
    ClusterCount,
    ClusterCountPf,
    PercentPf,
    PercentAligned,
    PercentPhasing,
    PercentPrephasing,
}

impl TileMetricValue {
    /// The value for one tile; NaN when the tile does not record it.
    ///
    /// Per-read values need a read; without one they are NaN.
    #[must_use]
    pub fn value(self, metric: &TileMetric, read: Option<u16>) -> f32 {
        let or_nan = |v: Option<f32>| v.unwrap_or(f32::NAN);
        let per_read = |f: fn(&ReadMetric) -> f32| {
            read.and_then(|r| metric.read_metric(r)).map_or(f32::NAN, f)
        };
        match self {
            Self::ClusterDensity => or_nan(metric.cluster_density),
            Self::ClusterDensityPf => or_nan(metric.cluster_density_pf),
            Self::ClusterCount => or_nan(metric.cluster_count),
            Self::ClusterCountPf => or_nan(metric.cluster_count_pf),
            Self::PercentPf => metric.percent_pf_clusters(),
            Self::PercentAligned => per_read(|r| r.percent_aligned.unwrap_or(f32::NAN)),
            Self::PercentPhasing => per_read(|r| r.percent_phasing()),
            Self::PercentPrephasing => per_read(|r| r.percent_prephasing()),
        }
    }

    /// The pass-filter series plotted beside this one, if any
    #[must_use]
    pub fn pf_counterpart(self) -> Option<Self> {
        match self {
            Self::ClusterDensity => Some(Self::ClusterDensityPf),
            Self::ClusterCount => Some(Self::ClusterCountPf),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_per_read(self) -> bool {
        matches!(
            self,
            Self::PercentAligned | Self::PercentPhasing | Self::PercentPrephasing
        )
    }
}

impl std::fmt::Display for TileMetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ClusterDensity => "Density",
            Self::ClusterDensityPf => "Density PF",
            Self::ClusterCount => "Cluster Count",
            Self::ClusterCountPf => "Cluster Count PF",
            Self::PercentPf => "% PF",
            Self::PercentAligned => "% Aligned",
            Self::PercentPhasing => "% Phasing",
            Self::PercentPrephasing => "% Prephasing",
        };
        write!(f, "{name}")
    }
}

/// By-lane title: flow cell barcode, the read for per-read values, and the
/// surface when one is selected on a flow cell with more than one
#[must_use]
pub fn by_lane_title(run: &RunMetrics, options: &FilterOptions, value: TileMetricValue) -> String {
    let mut parts = Vec::new();
    if let Some(barcode) = run.info().flowcell_barcode.as_deref().filter(|b| !b.is_empty()) {
        parts.push(barcode.to_string());
    }
    if value.is_per_read() && options.is_specific_read() {
        parts.push(options.read_description());
    }
    if run.surface_count() > 1 && options.is_specific_surface() {
        parts.push(options.surface_description());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::{DecodeMetric, MetricHeader};
    use crate::core::run::RunInfo;

    fn tile(lane: u16, tile: u32, codes: &[(u16, f32)]) -> TileMetric {
        let mut metric = TileMetric::new(lane, tile);
        for &(code, value) in codes {
            metric
                .merge(TileMetric::from_code(lane, tile, code, value))
                .unwrap();
        }
        metric
    }

    fn tile_set(tiles: Vec<TileMetric>) -> MetricSet<TileMetric> {
        let mut set = MetricSet::new(MetricHeader::new(2));
        for metric in tiles {
            set.insert(metric).unwrap();
        }
        set
    }

    fn count_and_mean(lane: u16, values: &[f32]) -> (u16, usize, f32) {
        #[allow(clippy::cast_precision_loss)]
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        (lane, values.len(), mean)
    }

    #[test]
    fn test_groups_by_lane_in_order() {
        let set = tile_set(vec![
            tile(2, 1101, &[(100, 30.0)]),
            tile(1, 1101, &[(100, 10.0)]),
            tile(1, 1102, &[(100, 20.0)]),
        ]);
        let points = populate_candle_stick_by_lane(
            &set,
            &FilterOptions::default(),
            |m| TileMetricValue::ClusterDensity.value(m, None),
            count_and_mean,
        )
        .unwrap();
        assert_eq!(points, vec![(1, 2, 15.0), (2, 1, 30.0)]);
    }

    #[test]
    fn test_nan_values_and_empty_lanes_are_dropped() {
        let set = tile_set(vec![
            tile(1, 1101, &[(100, 10.0)]),
            tile(1, 1102, &[(102, 5.0)]),
            tile(3, 1101, &[(102, 5.0)]),
        ]);
        let points = populate_candle_stick_by_lane(
            &set,
            &FilterOptions::default(),
            |m| TileMetricValue::ClusterDensity.value(m, None),
            count_and_mean,
        )
        .unwrap();
        assert_eq!(points, vec![(1, 1, 10.0)]);
    }

    #[test]
    fn test_filter_applies() {
        let set = tile_set(vec![tile(1, 1101, &[(100, 10.0)]), tile(1, 2101, &[(100, 50.0)])]);
        let options = FilterOptions::default().with_surface(2);
        let points = populate_candle_stick_by_lane(
            &set,
            &options,
            |m| TileMetricValue::ClusterDensity.value(m, None),
            count_and_mean,
        )
        .unwrap();
        assert_eq!(points, vec![(1, 1, 50.0)]);
    }

    #[test]
    fn test_lane_zero_fails() {
        let set = tile_set(vec![tile(0, 1101, &[(100, 10.0)])]);
        let err = populate_candle_stick_by_lane(
            &set,
            &FilterOptions::default(),
            |m| TileMetricValue::ClusterDensity.value(m, None),
            count_and_mean,
        )
        .unwrap_err();
        assert!(matches!(err, MetricError::IndexOutOfBounds(_)));
    }

    #[test]
    fn test_per_read_values() {
        let set = tile_set(vec![tile(1, 1101, &[(200, 0.002), (201, 0.001), (301, 85.5)])]);
        let metric = set.iter().next().unwrap();
        assert!((TileMetricValue::PercentPhasing.value(metric, Some(1)) - 0.2).abs() < 1e-6);
        assert!((TileMetricValue::PercentPrephasing.value(metric, Some(1)) - 0.1).abs() < 1e-6);
        assert!((TileMetricValue::PercentAligned.value(metric, Some(2)) - 85.5).abs() < 1e-6);
        assert!(TileMetricValue::PercentAligned.value(metric, Some(1)).is_nan());
        assert!(TileMetricValue::PercentPhasing.value(metric, None).is_nan());
    }

    #[test]
    fn test_pf_counterpart() {
        assert_eq!(
            TileMetricValue::ClusterDensity.pf_counterpart(),
            Some(TileMetricValue::ClusterDensityPf)
        );
        assert_eq!(TileMetricValue::PercentAligned.pf_counterpart(), None);
        assert!(TileMetricValue::PercentAligned.is_per_read());
        assert!(!TileMetricValue::PercentPf.is_per_read());
    }

    #[test]
    fn test_title() {
        let run = RunMetrics::new(RunInfo {
            flowcell_barcode: Some("HABCDEF".to_string()),
            surface_count: 2,
            ..RunInfo::default()
        });
        let options = FilterOptions::default().with_read(1).with_surface(2);
        assert_eq!(
            by_lane_title(&run, &options, TileMetricValue::PercentPhasing),
            "HABCDEF Read 1 Bottom"
        );
        assert_eq!(
            by_lane_title(&run, &options, TileMetricValue::ClusterDensity),
            "HABCDEF Bottom"
        );
        assert_eq!(
            by_lane_title(&RunMetrics::default(), &options, TileMetricValue::PercentPhasing),
            "Read 1"
        );
    }
}
