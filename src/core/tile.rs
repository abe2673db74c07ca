//! Tile-level metrics (cluster density, counts, phasing, alignment).
//!
//! Version 2 files store one `(lane, tile, code, value)` record per measured
//! value. The code identifies the measurement:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 100 | cluster density |
//! | 101 | PF cluster density |
//! | 102 | cluster count |
//! | 103 | PF cluster count |
//! | 200 + 2(r-1) | phasing for read r |
//! | 201 + 2(r-1) | prephasing for read r |
//! | 300 + (r-1) | percent aligned for read r |
//! | 400 | control lane |
//!
//! Records sharing a lane and tile are merged into one [`TileMetric`].

use serde::{Deserialize, Serialize};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, Metric, MetricHeader};
use crate::core::types::MetricKind;
use crate::parsing::cursor::RecordCursor;

/// Per-read values for one tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMetric {
    pub read: u16,
    pub percent_aligned: Option<f32>,
    /// Fraction of molecules falling behind, as stored on disk
    pub phasing: Option<f32>,
    /// Fraction of molecules jumping ahead, as stored on disk
    pub prephasing: Option<f32>,
}

impl ReadMetric {
    #[must_use]
    pub fn new(read: u16) -> Self {
        Self {
            read,
            percent_aligned: None,
            phasing: None,
            prephasing: None,
        }
    }

    #[must_use]
    pub fn percent_phasing(&self) -> f32 {
        self.phasing.map_or(f32::NAN, |v| v * 100.0)
    }

    #[must_use]
    pub fn percent_prephasing(&self) -> f32 {
        self.prephasing.map_or(f32::NAN, |v| v * 100.0)
    }

    fn merge(&mut self, other: Self) -> bool {
        fill(&mut self.percent_aligned, other.percent_aligned)
            && fill(&mut self.phasing, other.phasing)
            && fill(&mut self.prephasing, other.prephasing)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileMetric {
    pub lane: u16,
    pub tile: u32,
    pub cluster_density: Option<f32>,
    pub cluster_density_pf: Option<f32>,
    pub cluster_count: Option<f32>,
    pub cluster_count_pf: Option<f32>,
    pub control_lane: Option<f32>,
    /// Sorted by read number
    pub reads: Vec<ReadMetric>,
}

impl TileMetric {
    #[must_use]
    pub fn new(lane: u16, tile: u32) -> Self {
        Self {
            lane,
            tile,
            cluster_density: None,
            cluster_density_pf: None,
            cluster_count: None,
            cluster_count_pf: None,
            control_lane: None,
            reads: Vec::new(),
        }
    }

    /// Build the fragment a single `(code, value)` record describes.
    ///
    /// Unknown codes produce a fragment with no values set.
    #[must_use]
    pub fn from_code(lane: u16, tile: u32, code: u16, value: f32) -> Self {
        let mut metric = Self::new(lane, tile);
        match code {
            100 => metric.cluster_density = Some(value),
            101 => metric.cluster_density_pf = Some(value),
            102 => metric.cluster_count = Some(value),
            103 => metric.cluster_count_pf = Some(value),
            200..=299 => {
                let offset = code - 200;
                let mut read = ReadMetric::new(offset / 2 + 1);
                if offset % 2 == 0 {
                    read.phasing = Some(value);
                } else {
                    read.prephasing = Some(value);
                }
                metric.reads.push(read);
            }
            300..=399 => {
                let mut read = ReadMetric::new(code - 300 + 1);
                read.percent_aligned = Some(value);
                metric.reads.push(read);
            }
            400 => metric.control_lane = Some(value),
            _ => {}
        }
        metric
    }

    /// Values for a read, if any were recorded
    #[must_use]
    pub fn read_metric(&self, read: u16) -> Option<&ReadMetric> {
        self.reads.iter().find(|r| r.read == read)
    }

    #[must_use]
    pub fn percent_pf_clusters(&self) -> f32 {
        match (self.cluster_count_pf, self.cluster_count) {
            (Some(pf), Some(total)) if total > 0.0 => 100.0 * pf / total,
            _ => f32::NAN,
        }
    }
}

/// Store `value` in an empty slot; false if both are already set
fn fill(slot: &mut Option<f32>, value: Option<f32>) -> bool {
    match (slot.is_some(), value) {
        (true, Some(_)) => false,
        (false, Some(v)) => {
            *slot = Some(v);
            true
        }
        (_, None) => true,
    }
}

impl Metric for TileMetric {
    const KIND: MetricKind = MetricKind::Tile;

    fn lane(&self) -> u16 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }
}

impl DecodeMetric for TileMetric {
    const FRAGMENTED: bool = true;

    fn decode(cursor: &mut RecordCursor<'_>, _header: &MetricHeader) -> Result<Self, MetricError> {
        let lane = cursor.read_u16()?;
        let tile = u32::from(cursor.read_u16()?);
        let code = cursor.read_u16()?;
        let value = cursor.read_f32()?;
        Ok(Self::from_code(lane, tile, code, value))
    }

    fn merge(&mut self, fragment: Self) -> Result<(), MetricError> {
        let duplicate = || MetricError::DuplicateKey {
            kind: Self::KIND,
            key: fragment.key(),
        };
        let merged = fill(&mut self.cluster_density, fragment.cluster_density)
            && fill(&mut self.cluster_density_pf, fragment.cluster_density_pf)
            && fill(&mut self.cluster_count, fragment.cluster_count)
            && fill(&mut self.cluster_count_pf, fragment.cluster_count_pf)
            && fill(&mut self.control_lane, fragment.control_lane);
        if !merged {
            return Err(duplicate());
        }
        for read in fragment.reads.iter().cloned() {
            match self.reads.binary_search_by_key(&read.read, |r| r.read) {
                Ok(pos) => {
                    if !self.reads[pos].merge(read) {
                        return Err(duplicate());
                    }
                }
                Err(pos) => self.reads.insert(pos, read),
            }
        }
        Ok(())
    }
}
