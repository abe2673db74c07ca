use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// Clusters assigned to one index sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub index_seq: String,
    pub sample_id: String,
    pub project: String,
    pub cluster_count: u32,
}

/// Demultiplexing counts for one tile and index read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetric {
    pub lane: u16,
    pub tile: u32,
    pub read: u16,
    pub indices: Vec<IndexInfo>,
}

impl IndexMetric {
    #[must_use]
    pub fn new(lane: u16, tile: u32, read: u16, indices: Vec<IndexInfo>) -> Self {
        Self {
            lane,
            tile,
            read,
            indices,
        }
    }

    #[must_use]
    pub fn total_clusters(&self) -> u64 {
        self.indices.iter().map(|i| u64::from(i.cluster_count)).sum()
    }
}

impl Metric for IndexMetric {
    const KIND: MetricKind = MetricKind::Index;

    fn lane(&self) -> u16 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    fn read(&self) -> u16 {
        self.read
    }
}

impl DecodeMetric for IndexMetric {
    const FRAGMENTED: bool = true;

    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let read = cursor.read_u16()?;
        let index_seq = cursor.read_str()?;
        let cluster_count = cursor.read_u32()?;
        let sample_id = cursor.read_str()?;
        let project = cursor.read_str()?;
        Ok(Self::new(
            lane,
            tile,
            read,
            vec![IndexInfo {
                index_seq,
                sample_id,
                project,
                cluster_count,
            }],
        ))
    }

    fn merge(&mut self, fragment: Self) -> Result<(), MetricError> {
        for info in fragment.indices {
            if self.indices.iter().any(|i| i.index_seq == info.index_seq) {
                return Err(MetricError::DuplicateKey {
                    kind: Self::KIND,
                    key: self.key(),
                });
            }
            self.indices.push(info);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(seq: &str, count: u32) -> IndexInfo {
        IndexInfo {
            index_seq: seq.to_string(),
            sample_id: format!("sample_{seq}"),
            project: "proj".to_string(),
            cluster_count: count,
        }
    }

    #[test]
    fn test_merge_appends_indices() {
        let mut metric = IndexMetric::new(1, 1101, 2, vec![info("ACGT", 10)]);
        metric
            .merge(IndexMetric::new(1, 1101, 2, vec![info("TTGG", 5)]))
            .unwrap();
        assert_eq!(metric.indices.len(), 2);
        assert_eq!(metric.total_clusters(), 15);
        assert_eq!(metric.key().id, 2);
    }

    #[test]
    fn test_repeated_index_is_duplicate() {
        let mut metric = IndexMetric::new(1, 1101, 2, vec![info("ACGT", 10)]);
        let err = metric
            .merge(IndexMetric::new(1, 1101, 2, vec![info("ACGT", 3)]))
            .unwrap_err();
        assert!(matches!(err, MetricError::DuplicateKey { .. }));
    }
}
