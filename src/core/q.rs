//! Q-score histogram records and the reduced-bin model.
//!
//! Uncompressed files store one count per raw quality value `1..=50`.
//! Compressed files store one count per reduced bin, where bin `i` covers the
//! raw values `[lower_i, upper_i)` and is reported at quality `value_i`. The
//! bin table is stored once in the file header and shared by every record.

use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;
use crate::parsing::layout::MAX_Q_BINS;

/// One reduced q-score bin covering raw values `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QBin {
    /// Quality value the bin is reported at
    pub value: u16,
    pub lower: u16,
    pub upper: u16,
}

impl QBin {
    #[must_use]
    pub fn new(value: u16, lower: u16, upper: u16) -> Self {
        Self {
            value,
            lower,
            upper,
        }
    }

    #[must_use]
    pub fn contains(&self, qscore: u16) -> bool {
        self.lower <= qscore && qscore < self.upper
    }
}

/// Ordered, contiguous reduced bins shared by a compressed Q collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinTable(Vec<QBin>);

impl BinTable {
    #[must_use]
    pub fn new(bins: Vec<QBin>) -> Self {
        Self(bins)
    }

    /// Check that bins start at raw value 1, are contiguous, and each
    /// reported value lies inside its own range.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending bin.
    pub fn validate(&self) -> Result<(), String> {
        let Some(first) = self.0.first() else {
            return Ok(());
        };
        if first.lower != 1 {
            return Err(format!("first bin starts at {}, not 1", first.lower));
        }
        for (i, bin) in self.0.iter().enumerate() {
            if bin.lower >= bin.upper {
                return Err(format!(
                    "bin {i} has empty range [{}, {})",
                    bin.lower, bin.upper
                ));
            }
            if !bin.contains(bin.value) {
                return Err(format!(
                    "bin {i} value {} outside [{}, {})",
                    bin.value, bin.lower, bin.upper
                ));
            }
            if let Some(next) = self.0.get(i + 1) {
                if next.lower != bin.upper {
                    return Err(format!(
                        "bin {} starts at {} but bin {i} ends at {}",
                        i + 1,
                        next.lower,
                        bin.upper
                    ));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QBin> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[QBin] {
        &self.0
    }

    /// Largest raw quality value covered by the table, `None` when empty
    #[must_use]
    pub fn max_qval(&self) -> Option<u16> {
        self.0.last().map(|bin| bin.upper.saturating_sub(1))
    }
}

impl<'a> IntoIterator for &'a BinTable {
    type Item = &'a QBin;
    type IntoIter = std::slice::Iter<'a, QBin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Histogram payload: one count per raw value, or one count per reduced bin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QHistogram<T = u32> {
    Raw(Vec<T>),
    Binned(Vec<T>),
}

impl<T: Copy + Into<u64>> QHistogram<T> {
    #[must_use]
    pub fn counts(&self) -> &[T] {
        match self {
            Self::Raw(counts) | Self::Binned(counts) => counts,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts().is_empty()
    }

    #[must_use]
    pub fn is_binned(&self) -> bool {
        matches!(self, Self::Binned(_))
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts().iter().map(|&c| c.into()).sum()
    }

    /// Count of bases at or above `qscore`.
    ///
    /// Raw index `i` holds quality `i + 1`; a reduced bin counts when its
    /// reported value is at or above the threshold.
    #[must_use]
    pub fn total_over_qscore(&self, qscore: u16, bins: Option<&BinTable>) -> u64 {
        match (self, bins) {
            (Self::Binned(counts), Some(bins)) => counts
                .iter()
                .zip(bins)
                .filter(|(_, bin)| bin.value >= qscore)
                .map(|(&c, _)| c.into())
                .sum(),
            _ => self
                .counts()
                .iter()
                .skip(usize::from(qscore.saturating_sub(1)))
                .map(|&c| c.into())
                .sum(),
        }
    }
}

/// Records that carry a q-score histogram for one cycle
pub trait QScoreRecord: Metric {
    fn hist_len(&self) -> usize;

    fn hist_count(&self, bin: usize) -> u64;
}

/// Per-tile, per-cycle q-score histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    pub histogram: QHistogram,
}

impl QMetric {
    #[must_use]
    pub fn new(lane: u16, tile: u32, cycle: u16, histogram: QHistogram) -> Self {
        Self {
            lane,
            tile,
            cycle,
            histogram,
        }
    }

    /// Count stored at histogram position `bin` (0 when out of range)
    #[must_use]
    pub fn qscore_hist(&self, bin: usize) -> u32 {
        self.histogram.counts().get(bin).copied().unwrap_or(0)
    }

    /// Percent of bases at or above `qscore`, NaN when the histogram is empty
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_over_qscore(&self, qscore: u16, bins: Option<&BinTable>) -> f32 {
        let total = self.histogram.total();
        if total == 0 {
            return f32::NAN;
        }
        100.0 * self.histogram.total_over_qscore(qscore, bins) as f32 / total as f32
    }
}

impl Metric for QMetric {
    const KIND: MetricKind = MetricKind::Q;

    fn lane(&self) -> u16 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    fn cycle(&self) -> u16 {
        self.cycle
    }
}

impl DecodeMetric for QMetric {
    fn decode(cursor: &mut RecordCursor<'_>, header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let cycle = cursor.read_u16()?;
        let histogram = match &header.bins {
            Some(bins) => QHistogram::Binned(cursor.read_u32_vec(bins.len())?),
            None => QHistogram::Raw(cursor.read_u32_vec(usize::from(MAX_Q_BINS))?),
        };
        Ok(Self::new(lane, tile, cycle, histogram))
    }
}

impl QScoreRecord for QMetric {
    fn hist_len(&self) -> usize {
        self.histogram.len()
    }

    fn hist_count(&self, bin: usize) -> u64 {
        u64::from(self.qscore_hist(bin))
    }
}

/// Q-score histogram summed over every tile of a lane for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QByLaneMetric {
    pub lane: u16,
    pub cycle: u16,
    pub histogram: QHistogram<u64>,
}

impl QByLaneMetric {
    #[must_use]
    pub fn new(lane: u16, cycle: u16, histogram: QHistogram<u64>) -> Self {
        Self {
            lane,
            cycle,
            histogram,
        }
    }
}

impl Metric for QByLaneMetric {
    const KIND: MetricKind = MetricKind::QByLane;

    fn lane(&self) -> u16 {
        self.lane
    }

    /// Lane-level records have no tile
    fn tile(&self) -> u32 {
        0
    }

    fn cycle(&self) -> u16 {
        self.cycle
    }
}

impl QScoreRecord for QByLaneMetric {
    fn hist_len(&self) -> usize {
        self.histogram.len()
    }

    fn hist_count(&self, bin: usize) -> u64 {
        self.histogram.counts().get(bin).copied().unwrap_or(0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Contiguous bins from raw value 1, each `(width, value offset)`
    fn contiguous(spec: &[(u16, u16)]) -> BinTable {
        let mut lower = 1;
        let bins = spec
            .iter()
            .map(|&(width, offset)| {
                let bin = QBin::new(lower + offset % width, lower, lower + width);
                lower += width;
                bin
            })
            .collect();
        BinTable::new(bins)
    }

    proptest! {
        #[test]
        fn test_valid_tables_cover_every_value_once(
            spec in prop::collection::vec((1u16..10, 0u16..10), 1..8)
        ) {
            let table = contiguous(&spec);
            prop_assert!(table.validate().is_ok());

            let max = table.max_qval().unwrap();
            prop_assert_eq!(max, spec.iter().map(|(width, _)| width).sum::<u16>());
            for q in 1..=max {
                let hits = table.iter().filter(|bin| bin.contains(q)).count();
                prop_assert_eq!(hits, 1, "q{}", q);
            }
            prop_assert!(!table.iter().any(|bin| bin.contains(0) || bin.contains(max + 1)));
        }

        #[test]
        fn test_shifted_bin_breaks_contiguity(
            spec in prop::collection::vec((2u16..10, 0u16..10), 2..8),
            which in 1usize..8,
        ) {
            let table = contiguous(&spec);
            let mut bins = table.as_slice().to_vec();
            let i = which % bins.len();
            bins[i].lower += 1;
            bins[i].value = bins[i].value.max(bins[i].lower);
            prop_assert!(BinTable::new(bins).validate().is_err());
        }
    }
}
