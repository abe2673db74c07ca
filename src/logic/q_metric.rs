use std::collections::BTreeMap;

use crate::core::error::MetricError;
use crate::core::metric::MetricHeader;
use crate::core::metric_set::MetricSet;
use crate::core::q::{QByLaneMetric, QHistogram, QMetric, QScoreRecord};

/// Largest raw quality value a q-score collection can report.
///
/// Uncompressed: the histogram length of its records. Compressed: the
/// largest raw value covered by the bin table. An empty collection reports 0.
///
/// # Errors
///
/// Returns `MetricError::IndexOutOfBounds` if the collection has records but no bins.
pub fn max_qval<M: QScoreRecord>(set: &MetricSet<M>) -> Result<usize, MetricError> {
    if set.is_empty() {
        return Ok(0);
    }
    let max = match set.bins() {
        Some(bins) => bins.max_qval().map_or(0, usize::from),
        None => set.iter().next().map_or(0, |metric| metric.hist_len()),
    };
    if max == 0 {
        return Err(MetricError::IndexOutOfBounds(format!(
            "{} q-score records but no bins (compressed: {})",
            set.len(),
            set.is_compressed()
        )));
    }
    Ok(max)
}

/// Sum per-tile q-score histograms into one record per lane and cycle.
///
/// The result keeps the source's bin table, so it is compressed exactly when
/// the source is. Records are ordered by lane, then cycle.
///
/// # Errors
///
/// Returns `MetricError::DuplicateKey` only if the grouping produced a repeated
/// key, which cannot happen for a well-formed source.
pub fn create_q_metrics_by_lane(
    source: &MetricSet<QMetric>,
) -> Result<MetricSet<QByLaneMetric>, MetricError> {
    let mut sums: BTreeMap<(u16, u16), Vec<u64>> = BTreeMap::new();
    for metric in source {
        let counts = metric.histogram.counts();
        let sum = sums.entry((metric.lane, metric.cycle)).or_default();
        if sum.len() < counts.len() {
            sum.resize(counts.len(), 0);
        }
        for (total, &count) in sum.iter_mut().zip(counts) {
            *total += u64::from(count);
        }
    }

    let header = MetricHeader {
        version: source.version(),
        bins: source.bins().cloned(),
    };
    let compressed = source.is_compressed();
    let mut by_lane = MetricSet::new(header);
    for ((lane, cycle), counts) in sums {
        let histogram = if compressed {
            QHistogram::Binned(counts)
        } else {
            QHistogram::Raw(counts)
        };
        by_lane.insert(QByLaneMetric::new(lane, cycle, histogram))?;
    }
    Ok(by_lane)
}
