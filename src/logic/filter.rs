use serde::{Deserialize, Serialize};

use crate::core::metric::Metric;
use crate::core::types::{KeyAxis, TileNaming};

/// Selects which records of a collection take part in a query.
///
/// Every dimension left as `None` matches all records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub lane: Option<u16>,
    pub surface: Option<u16>,
    pub read: Option<u16>,
    pub channel: Option<u8>,
    pub tile_naming: TileNaming,
}

impl FilterOptions {
    #[must_use]
    pub fn new(tile_naming: TileNaming) -> Self {
        Self {
            tile_naming,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_lane(mut self, lane: u16) -> Self {
        self.lane = Some(lane);
        self
    }

    #[must_use]
    pub fn with_surface(mut self, surface: u16) -> Self {
        self.surface = Some(surface);
        self
    }

    #[must_use]
    pub fn with_read(mut self, read: u16) -> Self {
        self.read = Some(read);
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Whether a record passes the lane and surface filters, and the read
    /// filter for read-keyed kinds.
    ///
    /// Lane-level records (tile 0) are on surface 0 and never match a specific surface.
    #[must_use]
    pub fn valid_tile<M: Metric>(&self, metric: &M) -> bool {
        if self.lane.is_some_and(|lane| lane != metric.lane()) {
            return false;
        }
        if self
            .surface
            .is_some_and(|surface| surface != self.tile_naming.surface(metric.tile()))
        {
            return false;
        }
        if M::KIND.axis() == KeyAxis::Read && !self.valid_read(metric.read()) {
            return false;
        }
        true
    }

    #[must_use]
    pub fn valid_read(&self, read: u16) -> bool {
        self.read.map_or(true, |r| r == read)
    }

    #[must_use]
    pub fn valid_channel(&self, channel: u8) -> bool {
        self.channel.map_or(true, |c| c == channel)
    }

    #[must_use]
    pub fn is_specific_surface(&self) -> bool {
        self.surface.is_some()
    }

    #[must_use]
    pub fn is_specific_read(&self) -> bool {
        self.read.is_some()
    }

    /// `Lane N`, or `All Lanes`
    #[must_use]
    pub fn lane_description(&self) -> String {
        self.lane
            .map_or_else(|| "All Lanes".to_string(), |lane| format!("Lane {lane}"))
    }

    /// `Read N`, or `All Reads`
    #[must_use]
    pub fn read_description(&self) -> String {
        self.read
            .map_or_else(|| "All Reads".to_string(), |read| format!("Read {read}"))
    }

    /// `Top` or `Bottom` for surfaces 1 and 2, `All Surfaces` when unset
    #[must_use]
    pub fn surface_description(&self) -> String {
        match self.surface {
            None => "All Surfaces".to_string(),
            Some(1) => "Top".to_string(),
            Some(2) => "Bottom".to_string(),
            Some(surface) => format!("Surface {surface}"),
        }
    }
}
