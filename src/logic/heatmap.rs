//! Q-score heatmap: percent of bases per cycle (rows) and quality value (columns).
//!
//! Source cycles and quality values are 1-based; grid rows and columns are
//! 0-based, so cycle `c` and quality `q` land in cell `(c - 1, q - 1)`.

use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::core::error::MetricError;
use crate::core::metric_set::MetricSet;
use crate::core::q::{BinTable, QBin, QScoreRecord};
use crate::core::run::RunMetrics;
use crate::logic::filter::FilterOptions;
use crate::logic::q_metric::max_qval;

/// Dense row-major grid of heatmap values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapData {
    rows: usize,
    columns: usize,
    values: Vec<f32>,
}

impl HeatmapData {
    /// A zero-filled grid
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            values: vec![0.0; rows * columns],
        }
    }

    /// Reshape to `rows x columns`, zeroing every cell
    pub fn resize(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;
        self.values.clear();
        self.values.resize(rows * columns, 0.0);
    }

    pub fn clear(&mut self) {
        self.resize(0, 0);
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row < self.rows && column < self.columns {
            Some(self.values[row * self.columns + column])
        } else {
            None
        }
    }

    /// One row per cycle
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.chunks(self.columns.max(1)).take(self.rows)
    }

    /// Largest cell value, 0 for an empty grid
    #[must_use]
    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}

impl Index<(usize, usize)> for HeatmapData {
    type Output = f32;

    fn index(&self, (row, column): (usize, usize)) -> &f32 {
        assert!(column < self.columns, "column {column} out of {}", self.columns);
        &self.values[row * self.columns + column]
    }
}

impl IndexMut<(usize, usize)> for HeatmapData {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f32 {
        assert!(column < self.columns, "column {column} out of {}", self.columns);
        &mut self.values[row * self.columns + column]
    }
}

/// Grid cell for a 1-based cycle and 1-based histogram position
fn cell(data: &HeatmapData, cycle: u16, position: usize) -> Result<(usize, usize), MetricError> {
    let row = usize::from(cycle).wrapping_sub(1);
    let column = position.wrapping_sub(1);
    if row >= data.row_count() || column >= data.column_count() {
        return Err(MetricError::IndexOutOfBounds(format!(
            "cycle {cycle}, q-score {position} outside {} x {} heatmap",
            data.row_count(),
            data.column_count()
        )));
    }
    Ok((row, column))
}

/// Fill a heatmap from the records that pass `options`.
///
/// Counts from every matching tile are summed, the grid is scaled to percent
/// of its maximum cell, and compressed collections are then spread back out
/// to raw quality resolution.
///
/// # Errors
///
/// Returns `MetricError::IndexOutOfBounds` if the collection has records but no
/// bins, or a record addresses a cell outside the grid.
#[allow(clippy::cast_precision_loss)]
pub fn populate_heatmap<M: QScoreRecord>(
    set: &MetricSet<M>,
    options: &FilterOptions,
) -> Result<HeatmapData, MetricError> {
    let max_q = max_qval(set)?;
    let max_cycle = usize::from(set.max_cycle());
    let mut data = HeatmapData::new(max_cycle, max_q);

    for metric in set.iter().filter(|m| options.valid_tile(*m)) {
        match set.bins() {
            Some(bins) => {
                for (i, bin) in bins.iter().enumerate() {
                    let at = cell(&data, metric.cycle(), usize::from(bin.value))?;
                    data[at] += metric.hist_count(i) as f32;
                }
            }
            None => {
                for i in 0..metric.hist_len() {
                    let at = cell(&data, metric.cycle(), i + 1)?;
                    data[at] += metric.hist_count(i) as f32;
                }
            }
        }
    }

    normalize_heatmap(&mut data);
    if let Some(bins) = set.bins() {
        remap_to_bins(bins, max_cycle, &mut data);
    }
    Ok(data)
}

/// Scale every cell to a percentage of the largest cell; an all-zero grid stays zero
pub fn normalize_heatmap(data: &mut HeatmapData) {
    let max = data.max_value();
    for value in &mut data.values {
        *value = if max > 0.0 { 100.0 * *value / max } else { 0.0 };
    }
}

/// Spread reduced-bin values across the raw quality values each bin covers.
///
/// Before the call, bin `i`'s value for a cycle sits in the column of its
/// reported quality (`value_i - 1`). Afterwards every column in
/// `[lower_i - 1, upper_i - 1)` holds that same value. Bins with an empty
/// range write nothing.
pub fn remap_to_bins(bins: &BinTable, max_cycle: usize, data: &mut HeatmapData) {
    let columns = data.column_count();
    let source = |bin: &QBin| usize::from(bin.value).checked_sub(1).filter(|&c| c < columns);

    for row in 0..max_cycle.min(data.row_count()) {
        let reduced: Vec<f32> = bins
            .iter()
            .map(|bin| source(bin).map_or(0.0, |column| data[(row, column)]))
            .collect();
        for (bin, value) in bins.iter().zip(reduced) {
            let lower = usize::from(bin.lower).saturating_sub(1);
            let upper = usize::from(bin.upper).saturating_sub(1).min(columns);
            for column in lower..upper {
                data[(row, column)] = value;
            }
        }
    }
}

/// Q-score heatmap for a run.
///
/// A specific surface is only available per tile, so the per-tile collection is
/// used then; otherwise the per-lane collection is derived (once) and used. A
/// run without q-score metrics yields an empty heatmap.
///
/// # Errors
///
/// Propagates failures from [`populate_heatmap`] and from deriving the per-lane collection.
pub fn plot_qscore_heatmap(
    run: &RunMetrics,
    options: &FilterOptions,
) -> Result<HeatmapData, MetricError> {
    if options.is_specific_surface() {
        match run.q_metrics() {
            Some(set) if !set.is_empty() => populate_heatmap(set, options),
            _ => Ok(HeatmapData::default()),
        }
    } else {
        match run.q_by_lane_metrics()? {
            Some(set) if !set.is_empty() => populate_heatmap(set, options),
            _ => Ok(HeatmapData::default()),
        }
    }
}

/// Heatmap title: flow cell barcode, lane description, and the surface when
/// one is selected on a flow cell with more than one
#[must_use]
pub fn heatmap_title(run: &RunMetrics, options: &FilterOptions) -> String {
    let mut title = run.info().flowcell_barcode.clone().unwrap_or_default();
    if !title.is_empty() {
        title.push(' ');
    }
    title.push_str(&options.lane_description());
    if run.surface_count() > 1 && options.is_specific_surface() {
        title.push(' ');
        title.push_str(&options.surface_description());
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metric::MetricHeader;
    use crate::core::q::{QHistogram, QMetric};
    use crate::core::run::RunInfo;

    fn two_bins() -> BinTable {
        BinTable::new(vec![QBin::new(14, 1, 16), QBin::new(30, 16, 51)])
    }

    #[test]
    fn test_normalize() {
        let mut data = HeatmapData::new(2, 2);
        data[(0, 0)] = 10.0;
        data[(0, 1)] = 40.0;
        data[(1, 0)] = 20.0;
        normalize_heatmap(&mut data);
        assert!((data[(0, 0)] - 25.0).abs() < 1e-4);
        assert!((data[(0, 1)] - 100.0).abs() < 1e-4);
        assert!((data[(1, 0)] - 50.0).abs() < 1e-4);
        assert!(data[(1, 1)].abs() < f32::EPSILON);
    }

    #[test]
    fn test_normalize_all_zero() {
        let mut data = HeatmapData::new(3, 4);
        normalize_heatmap(&mut data);
        assert!(data.rows().flatten().all(|v| *v == 0.0));
    }

    #[test]
    fn test_remap_broadcasts_bin_values() {
        let mut data = HeatmapData::new(2, 50);
        data[(0, 13)] = 10.0;
        data[(0, 29)] = 40.0;
        data[(1, 13)] = 5.0;
        remap_to_bins(&two_bins(), 2, &mut data);

        for column in 0..15 {
            assert!((data[(0, column)] - 10.0).abs() < f32::EPSILON, "column {column}");
            assert!((data[(1, column)] - 5.0).abs() < f32::EPSILON, "column {column}");
        }
        for column in 15..50 {
            assert!((data[(0, column)] - 40.0).abs() < f32::EPSILON, "column {column}");
            assert!(data[(1, column)].abs() < f32::EPSILON, "column {column}");
        }
    }

    #[test]
    fn test_one_based_cycle_and_value_land_at_origin() {
        let mut counts = vec![0u32; 50];
        counts[0] = 7;
        let mut set = MetricSet::new(MetricHeader::new(4));
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Raw(counts)))
            .unwrap();
        set.insert(QMetric::new(1, 1101, 2, QHistogram::Raw(vec![0; 50])))
            .unwrap();

        let data = populate_heatmap(&set, &FilterOptions::default()).unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.column_count(), 50);
        assert!((data[(0, 0)] - 100.0).abs() < f32::EPSILON);
        assert!(data[(1, 1)].abs() < f32::EPSILON);
    }

    #[test]
    fn test_populate_accumulates_matching_tiles() {
        let mut set = MetricSet::new(MetricHeader::new(4));
        let mut a = vec![0u32; 50];
        a[29] = 30;
        let mut b = vec![0u32; 50];
        b[29] = 10;
        b[9] = 20;
        let mut c = vec![0u32; 50];
        c[9] = 1000;
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Raw(a))).unwrap();
        set.insert(QMetric::new(1, 1102, 1, QHistogram::Raw(b))).unwrap();
        set.insert(QMetric::new(2, 1101, 1, QHistogram::Raw(c))).unwrap();

        let data = populate_heatmap(&set, &FilterOptions::default().with_lane(1)).unwrap();
        assert!((data[(0, 29)] - 100.0).abs() < 1e-4);
        assert!((data[(0, 9)] - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_populate_compressed() {
        let mut set = MetricSet::new(MetricHeader::new(6).with_bins(two_bins()));
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Binned(vec![10, 40])))
            .unwrap();
        set.insert(QMetric::new(1, 1102, 1, QHistogram::Binned(vec![10, 40])))
            .unwrap();

        let data = populate_heatmap(&set, &FilterOptions::default()).unwrap();
        assert_eq!(data.row_count(), 1);
        assert_eq!(data.column_count(), 50);
        assert!((data[(0, 0)] - 25.0).abs() < 1e-4);
        assert!((data[(0, 14)] - 25.0).abs() < 1e-4);
        assert!((data[(0, 15)] - 100.0).abs() < 1e-4);
        assert!((data[(0, 49)] - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_remap_ignores_degenerate_bins() {
        let bins = BinTable::new(vec![
            QBin::new(0, 0, 0),
            QBin::new(3, 4, 2),
            QBin::new(2, 1, 3),
        ]);
        let mut data = HeatmapData::new(1, 5);
        data[(0, 1)] = 7.0;
        data[(0, 4)] = 9.0;
        remap_to_bins(&bins, 1, &mut data);

        assert!((data[(0, 0)] - 7.0).abs() < f32::EPSILON);
        assert!((data[(0, 1)] - 7.0).abs() < f32::EPSILON);
        assert!(data[(0, 2)].abs() < f32::EPSILON);
        assert!((data[(0, 4)] - 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_populate_with_unvalidated_bins_fails() {
        let bins = BinTable::new(vec![QBin::new(0, 0, 0)]);
        let mut set = MetricSet::new(MetricHeader::new(6).with_bins(bins));
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Binned(vec![5])))
            .unwrap();
        let err = populate_heatmap(&set, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, MetricError::IndexOutOfBounds(_)));
    }

    #[test]
    fn test_title() {
        let options = FilterOptions::default().with_lane(2).with_surface(1);
        let single = RunMetrics::new(RunInfo {
            surface_count: 1,
            ..RunInfo::default()
        });
        assert_eq!(heatmap_title(&single, &options), "Lane 2");

        let dual = RunMetrics::new(RunInfo {
            flowcell_barcode: Some("HABCDEF".to_string()),
            surface_count: 2,
            ..RunInfo::default()
        });
        assert_eq!(heatmap_title(&dual, &options), "HABCDEF Lane 2 Top");
        assert_eq!(
            heatmap_title(&dual, &FilterOptions::default()),
            "HABCDEF All Lanes"
        );
    }

    #[test]
    fn test_populate_empty_set() {
        let set: MetricSet<QMetric> = MetricSet::default();
        let data = populate_heatmap(&set, &FilterOptions::default()).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_populate_zero_bins_fails() {
        let mut set = MetricSet::new(MetricHeader::new(6).with_bins(BinTable::default()));
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Binned(Vec::new())))
            .unwrap();
        let err = populate_heatmap(&set, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, MetricError::IndexOutOfBounds(_)));
    }

    #[test]
    fn test_cycle_zero_is_out_of_bounds() {
        let mut set = MetricSet::new(MetricHeader::new(4));
        set.insert(QMetric::new(1, 1101, 0, QHistogram::Raw(vec![1; 50])))
            .unwrap();
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Raw(vec![1; 50])))
            .unwrap();
        let err = populate_heatmap(&set, &FilterOptions::default()).unwrap_err();
        assert!(matches!(err, MetricError::IndexOutOfBounds(_)));
    }
}
