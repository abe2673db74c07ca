use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// .NET ticks (100ns since 0001-01-01) at the Unix epoch
const TICKS_AT_UNIX_EPOCH: u64 = 621_355_968_000_000_000;
const TICKS_PER_SECOND: u64 = 10_000_000;
/// The top two bits of a serialized .NET `DateTime` hold its `DateTimeKind`
const TICKS_MASK: u64 = 0x3FFF_FFFF_FFFF_FFFF;

/// Focus and intensity measured during image extraction for one tile and cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    /// Full width at half maximum per channel
    pub focus: [f32; 4],
    /// 90th percentile intensity per channel
    pub max_intensity: [u16; 4],
    /// Raw acquisition timestamp as serialized .NET ticks
    pub date_time_ticks: u64,
}

impl ExtractionMetric {
    #[must_use]
    pub fn new(
        lane: u16,
        tile: u32,
        cycle: u16,
        focus: [f32; 4],
        max_intensity: [u16; 4],
        date_time_ticks: u64,
    ) -> Self {
        Self {
            lane,
            tile,
            cycle,
            focus,
            max_intensity,
            date_time_ticks,
        }
    }

    /// Focus score for a channel, NaN for an unknown channel
    #[must_use]
    pub fn focus_score(&self, channel: usize) -> f32 {
        self.focus.get(channel).copied().unwrap_or(f32::NAN)
    }

    /// Acquisition time, `None` when the ticks predate the Unix epoch or overflow
    #[must_use]
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        let ticks = (self.date_time_ticks & TICKS_MASK).checked_sub(TICKS_AT_UNIX_EPOCH)?;
        let seconds = i64::try_from(ticks / TICKS_PER_SECOND).ok()?;
        let nanos = u32::try_from((ticks % TICKS_PER_SECOND) * 100).ok()?;
        DateTime::from_timestamp(seconds, nanos)
    }
}

impl Metric for ExtractionMetric {
    const KIND: MetricKind = MetricKind::Extraction;

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

impl DecodeMetric for ExtractionMetric {
    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let cycle = cursor.read_u16()?;
        let focus = cursor.read_f32_array::<4>()?;
        let max_intensity = cursor.read_u16_array::<4>()?;
        let date_time_ticks = cursor.read_u64()?;
        Ok(Self::new(
            lane,
            tile,
            cycle,
            focus,
            max_intensity,
            date_time_ticks,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_time_from_ticks() {
        // 2016-05-05T00:00:00Z, with the DateTimeKind::Utc flag set
        let seconds: u64 = 1_462_406_400;
        let ticks = (TICKS_AT_UNIX_EPOCH + seconds * TICKS_PER_SECOND) | (1 << 62);
        let metric = ExtractionMetric::new(1, 1101, 1, [2.5; 4], [1000; 4], ticks);
        let when = metric.date_time().unwrap();
        assert_eq!(when.to_rfc3339(), "2016-05-05T00:00:00+00:00");
    }

    #[test]
    fn test_date_time_before_epoch() {
        let metric = ExtractionMetric::new(1, 1101, 1, [0.0; 4], [0; 4], 5);
        assert!(metric.date_time().is_none());
    }

    #[test]
    fn test_decode() {
        let mut bytes = Vec::new();
        for v in [1u16, 1101, 4] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in [2.0f32, 2.1, 2.2, 2.3] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        for v in [400u16, 500, 600, 700] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(&TICKS_AT_UNIX_EPOCH.to_le_bytes());

        let mut cursor = RecordCursor::new(&bytes, MetricKind::Extraction, 2, 2);
        let metric = ExtractionMetric::decode(&mut cursor, &MetricHeader::new(2)).unwrap();
        cursor.finish().unwrap();
        assert_eq!(metric.cycle, 4);
        assert_eq!(metric.max_intensity, [400, 500, 600, 700]);
        assert!((metric.focus_score(3) - 2.3).abs() < 1e-6);
        assert!(metric.focus_score(4).is_nan());
        assert_eq!(metric.date_time().unwrap().timestamp(), 0);
    }
}
