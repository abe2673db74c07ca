use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// Phasing-corrected intensities and base-call counts for one tile and cycle.
///
/// Version 3 files drop the average intensity, the all-cluster corrected
/// intensities, and the signal-to-noise ratio; those fields are `None` there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectedIntensityMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    pub average_intensity: Option<u16>,
    /// Average corrected intensity over all clusters, per channel (A, C, G, T)
    pub corrected_intensity_all: Option<[u16; 4]>,
    /// Average corrected intensity over clusters called as each base
    pub corrected_intensity_called: [u16; 4],
    /// Number of base calls for NC, A, C, G, T
    pub called_counts: [u32; 5],
    pub signal_to_noise: Option<f32>,
}

impl CorrectedIntensityMetric {
    /// Total base calls, including no-calls
    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.called_counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Percent of calls that were a given base (0 = NC, 1..=4 = A, C, G, T)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_base(&self, base: usize) -> f32 {
        let total = self.total_calls();
        match self.called_counts.get(base) {
            Some(&count) if total > 0 => 100.0 * count as f32 / total as f32,
            _ => f32::NAN,
        }
    }
}

impl Metric for CorrectedIntensityMetric {
    const KIND: MetricKind = MetricKind::CorrectedIntensity;

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

impl DecodeMetric for CorrectedIntensityMetric {
    fn decode(cursor: &mut RecordCursor<'_>, header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let cycle = cursor.read_u16()?;
        match header.version {
            2 => {
                let average_intensity = cursor.read_u16()?;
                let corrected_intensity_all = cursor.read_u16_array::<4>()?;
                let corrected_intensity_called = cursor.read_u16_array::<4>()?;
                let called_counts = cursor.read_u32_array::<5>()?;
                let signal_to_noise = cursor.read_f32()?;
                Ok(Self {
                    lane,
                    tile,
                    cycle,
                    average_intensity: Some(average_intensity),
                    corrected_intensity_all: Some(corrected_intensity_all),
                    corrected_intensity_called,
                    called_counts,
                    signal_to_noise: Some(signal_to_noise),
                })
            }
            3 => Ok(Self {
                lane,
                tile,
                cycle,
                average_intensity: None,
                corrected_intensity_all: None,
                corrected_intensity_called: cursor.read_u16_array::<4>()?,
                called_counts: cursor.read_u32_array::<5>()?,
                signal_to_noise: None,
            }),
            version => Err(MetricError::UnsupportedVersion {
                kind: Self::KIND,
                version,
            }),
        }
    }
}
