use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// Contrast range for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelContrast {
    pub channel: u16,
    pub min_contrast: u16,
    pub max_contrast: u16,
}

/// Image contrast for one tile and cycle.
///
/// Each on-disk record holds a single channel; records for the same tile and
/// cycle are merged as they are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetric {
    pub lane: u16,
    pub tile: u32,
    pub cycle: u16,
    /// Sorted by channel
    pub channels: Vec<ChannelContrast>,
}

impl ImageMetric {
    #[must_use]
    pub fn new(lane: u16, tile: u32, cycle: u16, channels: Vec<ChannelContrast>) -> Self {
        Self {
            lane,
            tile,
            cycle,
            channels,
        }
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn contrast(&self, channel: u16) -> Option<&ChannelContrast> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

impl Metric for ImageMetric {
    const KIND: MetricKind = MetricKind::Image;

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

impl DecodeMetric for ImageMetric {
    const FRAGMENTED: bool = true;

    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let cycle = cursor.read_u16()?;
        let contrast = ChannelContrast {
            channel: cursor.read_u16()?,
            min_contrast: cursor.read_u16()?,
            max_contrast: cursor.read_u16()?,
        };
        Ok(Self::new(lane, tile, cycle, vec![contrast]))
    }

    fn merge(&mut self, fragment: Self) -> Result<(), MetricError> {
        for contrast in fragment.channels {
            match self
                .channels
                .binary_search_by_key(&contrast.channel, |c| c.channel)
            {
                Ok(_) => {
                    return Err(MetricError::DuplicateKey {
                        kind: Self::KIND,
                        key: self.key(),
                    })
                }
                Err(pos) => self.channels.insert(pos, contrast),
            }
        }
        Ok(())
    }
}
