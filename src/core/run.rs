//! The run-level aggregate: one write-once collection per metric kind.
//!
//! Slots are [`OnceLock`]s, so independent kinds can be loaded from several
//! threads through a shared `&RunMetrics`. Each slot accepts exactly one
//! collection.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::corrected_intensity::CorrectedIntensityMetric;
use crate::core::error::MetricError;
use crate::core::error_metric::ErrorMetric;
use crate::core::extraction::ExtractionMetric;
use crate::core::image::ImageMetric;
use crate::core::index::IndexMetric;
use crate::core::metric::Metric;
use crate::core::metric_set::MetricSet;
use crate::core::q::{QByLaneMetric, QMetric};
use crate::core::q_collapsed::QCollapsedMetric;
use crate::core::tile::TileMetric;
use crate::core::types::{MetricKind, TileNaming};
use crate::logic::q_metric::create_q_metrics_by_lane;

/// Run configuration supplied by the host (normally read from the run folder's XML)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub flowcell_barcode: Option<String>,
    pub lane_count: u16,
    pub surface_count: u16,
    pub tile_naming: TileNaming,
}

/// Extents of one loaded collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub kind: MetricKind,
    pub version: u8,
    pub records: usize,
    pub max_lane: u16,
    pub max_cycle: u16,
    pub max_read: u16,
    pub bin_count: usize,
    pub compressed: bool,
}

impl KindSummary {
    #[must_use]
    pub fn of<M: Metric>(set: &MetricSet<M>) -> Self {
        Self {
            kind: M::KIND,
            version: set.version(),
            records: set.len(),
            max_lane: set.max_lane(),
            max_cycle: set.max_cycle(),
            max_read: set.max_read(),
            bin_count: set.bin_count(),
            compressed: set.is_compressed(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunMetrics {
    info: RunInfo,
    tile: OnceLock<MetricSet<TileMetric>>,
    error: OnceLock<MetricSet<ErrorMetric>>,
    extraction: OnceLock<MetricSet<ExtractionMetric>>,
    image: OnceLock<MetricSet<ImageMetric>>,
    q: OnceLock<MetricSet<QMetric>>,
    q_by_lane: OnceLock<MetricSet<QByLaneMetric>>,
    q_collapsed: OnceLock<MetricSet<QCollapsedMetric>>,
    corrected_intensity: OnceLock<MetricSet<CorrectedIntensityMetric>>,
    index: OnceLock<MetricSet<IndexMetric>>,
}

/// A record type with a slot in [`RunMetrics`]
pub trait RunSlot: Metric {
    fn slot(run: &RunMetrics) -> &OnceLock<MetricSet<Self>>;
}

macro_rules! run_slot {
    ($metric:ty, $field:ident) => {
        impl RunSlot for $metric {
            fn slot(run: &RunMetrics) -> &OnceLock<MetricSet<Self>> {
                &run.$field
            }
        }
    };
}

run_slot!(TileMetric, tile);
run_slot!(ErrorMetric, error);
run_slot!(ExtractionMetric, extraction);
run_slot!(ImageMetric, image);
run_slot!(QMetric, q);
run_slot!(QByLaneMetric, q_by_lane);
run_slot!(QCollapsedMetric, q_collapsed);
run_slot!(CorrectedIntensityMetric, corrected_intensity);
run_slot!(IndexMetric, index);

impl RunMetrics {
    #[must_use]
    pub fn new(info: RunInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn info(&self) -> &RunInfo {
        &self.info
    }

    /// Store the collection for `M`'s kind.
    ///
    /// # Errors
    ///
    /// Returns `MetricError::AlreadyLoaded` if the slot already holds a collection.
    pub fn set<M: RunSlot>(&self, set: MetricSet<M>) -> Result<(), MetricError> {
        M::slot(self)
            .set(set)
            .map_err(|_| MetricError::AlreadyLoaded(M::KIND))
    }

    /// The collection for `M`'s kind, if loaded
    #[must_use]
    pub fn metrics<M: RunSlot>(&self) -> Option<&MetricSet<M>> {
        M::slot(self).get()
    }

    #[must_use]
    pub fn tile_metrics(&self) -> Option<&MetricSet<TileMetric>> {
        self.tile.get()
    }

    #[must_use]
    pub fn q_metrics(&self) -> Option<&MetricSet<QMetric>> {
        self.q.get()
    }

    /// Per-lane q-score collection, derived from the per-tile one on first use.
    ///
    /// The per-tile collection is left untouched. `None` when neither
    /// collection is loaded.
    ///
    /// # Errors
    ///
    /// Propagates failures from building the per-lane collection.
    pub fn q_by_lane_metrics(&self) -> Result<Option<&MetricSet<QByLaneMetric>>, MetricError> {
        if let Some(by_lane) = self.q_by_lane.get() {
            return Ok(Some(by_lane));
        }
        let Some(q) = self.q.get() else {
            return Ok(None);
        };
        let by_lane = create_q_metrics_by_lane(q)?;
        // Another thread may have won the race with an identical derivation
        let _ = self.q_by_lane.set(by_lane);
        Ok(self.q_by_lane.get())
    }

    /// One summary per loaded collection, in [`MetricKind::ALL`] order
    #[must_use]
    pub fn summaries(&self) -> Vec<KindSummary> {
        let mut summaries = Vec::new();
        let mut push = |summary: Option<KindSummary>| summaries.extend(summary);
        push(self.tile.get().map(KindSummary::of));
        push(self.error.get().map(KindSummary::of));
        push(self.extraction.get().map(KindSummary::of));
        push(self.image.get().map(KindSummary::of));
        push(self.q.get().map(KindSummary::of));
        push(self.q_by_lane.get().map(KindSummary::of));
        push(self.q_collapsed.get().map(KindSummary::of));
        push(self.corrected_intensity.get().map(KindSummary::of));
        push(self.index.get().map(KindSummary::of));
        summaries
    }

    /// Largest lane seen in any loaded collection
    #[must_use]
    pub fn max_lane(&self) -> u16 {
        self.summaries()
            .iter()
            .map(|s| s.max_lane)
            .max()
            .unwrap_or(0)
    }

    /// Lanes on the flow cell: configured, else the largest lane seen
    #[must_use]
    pub fn lane_count(&self) -> u16 {
        if self.info.lane_count > 0 {
            return self.info.lane_count;
        }
        self.max_lane()
    }

    /// Surfaces per lane: configured, else the largest surface any tile or
    /// per-tile q-score record sits on
    #[must_use]
    pub fn surface_count(&self) -> u16 {
        if self.info.surface_count > 0 {
            return self.info.surface_count;
        }
        let naming = self.info.tile_naming;
        let tiles = self.tile.get().into_iter().flat_map(|set| set.iter().map(Metric::tile));
        let q = self.q.get().into_iter().flat_map(|set| set.iter().map(Metric::tile));
        tiles
            .chain(q)
            .map(|tile| naming.surface(tile))
            .max()
            .unwrap_or(0)
    }

    /// True when no slot holds any records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries().iter().all(|s| s.records == 0)
    }
}
