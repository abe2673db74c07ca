use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// PhiX error rate for one tile and cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    /// Percent of aligned bases called in error
    pub error_rate: f32,
    /// Number of reads with 0, 1, 2, 3 and 4 errors
    pub mismatch_counts: [u32; 5],
}

impl ErrorMetric {
    #[must_use]
    pub fn new(lane: u16, tile: u32, cycle: u16, error_rate: f32, mismatch_counts: [u32; 5]) -> Self {
        Self {
            lane,
            tile,
            cycle,
            error_rate,
            mismatch_counts,
        }
    }

    /// Number of reads with exactly `errors` mismatches (0 beyond 4)
    #[must_use]
    pub fn mismatch_count(&self, errors: usize) -> u32 {
        self.mismatch_counts.get(errors).copied().unwrap_or(0)
    }
}

impl Metric for ErrorMetric {
    const KIND: MetricKind = MetricKind::Error;

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

impl DecodeMetric for ErrorMetric {
    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let cycle = cursor.read_u16()?;
        let error_rate = cursor.read_f32()?;
        let mismatch_counts = cursor.read_u32_array::<5>()?;
        Ok(Self::new(lane, tile, cycle, error_rate, mismatch_counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&3u16.to_le_bytes());
        bytes.extend_from_slice(&2104u16.to_le_bytes());
        bytes.extend_from_slice(&12u16.to_le_bytes());
        bytes.extend_from_slice(&0.25f32.to_le_bytes());
        for count in [100u32, 5, 1, 0, 0] {
            bytes.extend_from_slice(&count.to_le_bytes());
        }

        let mut cursor = RecordCursor::new(&bytes, MetricKind::Error, 3, 2);
        let metric = ErrorMetric::decode(&mut cursor, &MetricHeader::new(3)).unwrap();
        cursor.finish().unwrap();

        assert_eq!(metric.lane, 3);
        assert_eq!(metric.tile, 2104);
        assert_eq!(metric.cycle, 12);
        assert!((metric.error_rate - 0.25).abs() < f32::EPSILON);
        assert_eq!(metric.mismatch_count(1), 5);
        assert_eq!(metric.mismatch_count(7), 0);
    }
}
