use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// Q20/Q30 counts collapsed from the full q-score histogram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QCollapsedMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    pub q20: u32,
    pub q30: u32,
    pub total: u32,
    pub median_qscore: u32,
}

impl QCollapsedMetric {
    #[allow(clippy::cast_precision_loss)]
    fn percent(count: u32, total: u32) -> f32 {
        if total == 0 {
            f32::NAN
        } else {
            100.0 * count as f32 / total as f32
        }
    }

    #[must_use]
    pub fn percent_over_q20(&self) -> f32 {
        Self::percent(self.q20, self.total)
    }

    #[must_use]
    pub fn percent_over_q30(&self) -> f32 {
        Self::percent(self.q30, self.total)
    }
}

impl Metric for QCollapsedMetric {
    const KIND: MetricKind = MetricKind::QCollapsed;

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

impl DecodeMetric for QCollapsedMetric {
    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        Ok(Self {
            lane: cursor.read_u16()?,
            tile: u32::from(cursor.read_u16()?),
            cycle: cursor.read_u16()?,
            q20: cursor.read_u32()?,
            q30: cursor.read_u32()?,
            total: cursor.read_u32()?,
            median_qscore: cursor.read_u32()?,
        })
    }
}
