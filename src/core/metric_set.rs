use std::collections::HashMap;

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::q::BinTable;
use crate::core::types::{KeyAxis, MetricKey};

/// All records of one metric kind for a run, in the order they were read.
///
/// Keys are unique: inserting a second record under an existing key fails
/// rather than overwriting. Extents (`max_lane`, `max_cycle`, `max_read`) are
/// tracked as records are inserted.
#[derive(Debug, Clone)]
pub struct MetricSet<M> {
    version: u8,
    bins: Option<BinTable>,
    metrics: Vec<M>,

    /// Index: key -> position in `metrics`
    key_to_index: HashMap<MetricKey, usize>,

    max_lane: u16,
    max_cycle: u16,
    max_read: u16,
}

impl<M: Metric> MetricSet<M> {
    /// Create an empty set for records decoded under `header`
    #[must_use]
    pub fn new(header: MetricHeader) -> Self {
        Self {
            version: header.version,
            bins: header.bins,
            metrics: Vec::new(),
            key_to_index: HashMap::new(),
            max_lane: 0,
            max_cycle: 0,
            max_read: 0,
        }
    }

    /// Append a record
    ///
    /// # Errors
    ///
    /// Returns `MetricError::DuplicateKey` if a record with the same key is present.
    pub fn insert(&mut self, metric: M) -> Result<(), MetricError> {
        let key = metric.key();
        if self.key_to_index.contains_key(&key) {
            return Err(MetricError::DuplicateKey { kind: M::KIND, key });
        }
        self.track(key);
        self.key_to_index.insert(key, self.metrics.len());
        self.metrics.push(metric);
        Ok(())
    }

    fn track(&mut self, key: MetricKey) {
        self.max_lane = self.max_lane.max(key.lane);
        match M::KIND.axis() {
            KeyAxis::Cycle => self.max_cycle = self.max_cycle.max(key.id),
            KeyAxis::Read => self.max_read = self.max_read.max(key.id),
            KeyAxis::Tile => {}
        }
    }

    /// Look up a record by key
    #[must_use]
    pub fn get(&self, key: &MetricKey) -> Option<&M> {
        self.key_to_index.get(key).map(|&idx| &self.metrics[idx])
    }

    /// Iterate records in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.metrics.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[M] {
        &self.metrics
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Format version the records were decoded from (0 for an empty source)
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    #[must_use]
    pub fn max_lane(&self) -> u16 {
        self.max_lane
    }

    #[must_use]
    pub fn max_cycle(&self) -> u16 {
        self.max_cycle
    }

    #[must_use]
    pub fn max_read(&self) -> u16 {
        self.max_read
    }

    /// The shared bin table, if the records use reduced q-score bins
    #[must_use]
    pub fn bins(&self) -> Option<&BinTable> {
        self.bins.as_ref()
    }

    /// Number of reduced bins; 0 when no bin table is present
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.as_ref().map_or(0, BinTable::len)
    }

    /// Whether the records carry reduced-bin histograms.
    ///
    /// Fixed when the set is created from its header.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.bins.is_some()
    }
}

impl<M: DecodeMetric> MetricSet<M> {
    /// Insert a record fragment, merging it into an existing record with the same key
    ///
    /// # Errors
    ///
    /// Returns `MetricError::DuplicateKey` if the fragment repeats data already
    /// stored for its key.
    pub fn insert_fragment(&mut self, fragment: M) -> Result<(), MetricError> {
        let key = fragment.key();
        match self.key_to_index.get(&key) {
            Some(&idx) => self.metrics[idx].merge(fragment),
            None => self.insert(fragment),
        }
    }
}

impl<M: Metric> Default for MetricSet<M> {
    fn default() -> Self {
        Self::new(MetricHeader::default())
    }
}

impl<'a, M> IntoIterator for &'a MetricSet<M> {
    type Item = &'a M;
    type IntoIter = std::slice::Iter<'a, M>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_metric::ErrorMetric;
    use crate::core::q::{QBin, QHistogram, QMetric};
    use crate::core::types::MetricKind;

    fn error_metric(lane: u16, tile: u32, cycle: u16) -> ErrorMetric {
        ErrorMetric::new(lane, tile, cycle, 0.5, [0; 5])
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut set = MetricSet::new(MetricHeader::new(3));
        set.insert(error_metric(1, 1101, 1)).unwrap();
        set.insert(error_metric(2, 1101, 7)).unwrap();
        set.insert(error_metric(1, 1102, 3)).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.version(), 3);
        assert_eq!(set.max_lane(), 2);
        assert_eq!(set.max_cycle(), 7);
        assert_eq!(set.max_read(), 0);
        assert_eq!(set.bin_count(), 0);
        assert!(!set.is_compressed());

        let found = set.get(&MetricKey::new(1, 1102, 3)).unwrap();
        assert_eq!(found.cycle(), 3);
        assert!(set.get(&MetricKey::new(3, 1101, 1)).is_none());
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut set = MetricSet::new(MetricHeader::new(3));
        set.insert(error_metric(2, 1101, 1)).unwrap();
        set.insert(error_metric(1, 1101, 1)).unwrap();
        set.insert(error_metric(1, 1101, 2)).unwrap();

        let lanes: Vec<u16> = set.iter().map(Metric::lane).collect();
        assert_eq!(lanes, vec![2, 1, 1]);
    }

    #[test]
    fn test_duplicate_key_fails_regardless_of_order() {
        let first = || error_metric(1, 1101, 1);
        let second = || ErrorMetric::new(1, 1101, 1, 0.9, [1; 5]);

        for (a, b) in [(first(), second()), (second(), first())] {
            let mut set = MetricSet::new(MetricHeader::new(3));
            set.insert(a).unwrap();
            let err = set.insert(b).unwrap_err();
            assert!(matches!(
                err,
                MetricError::DuplicateKey {
                    kind: MetricKind::Error,
                    ..
                }
            ));
            assert_eq!(set.len(), 1);
        }
    }

    #[test]
    fn test_compression_comes_from_header() {
        let bins = BinTable::new(vec![QBin::new(14, 1, 16), QBin::new(30, 16, 51)]);
        let mut set = MetricSet::new(MetricHeader::new(6).with_bins(bins));
        set.insert(QMetric::new(1, 1101, 1, QHistogram::Binned(vec![3, 4])))
            .unwrap();
        assert!(set.is_compressed());
        assert_eq!(set.bin_count(), 2);

        let empty: MetricSet<QMetric> = MetricSet::default();
        assert!(!empty.is_compressed());
        assert!(empty.is_empty());
        assert_eq!(empty.version(), 0);
    }
}
