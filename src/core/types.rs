use serde::{Deserialize, Serialize};

/// The kind of metric stored in one InterOp file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Tile,
    Error,
    Extraction,
    Image,
    Q,
    QByLane,
    QCollapsed,
    CorrectedIntensity,
    Index,
}

impl MetricKind {
    /// Every kind, in the order they are reported
    pub const ALL: [MetricKind; 9] = [
        Self::Tile,
        Self::Error,
        Self::Extraction,
        Self::Image,
        Self::Q,
        Self::QByLane,
        Self::QCollapsed,
        Self::CorrectedIntensity,
        Self::Index,
    ];

    /// Name of the InterOp file holding this kind, if it is ever read from disk.
    ///
    /// `QByLane` is only ever derived from per-tile Q metrics.
    #[must_use]
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            Self::Tile => Some("TileMetricsOut.bin"),
            Self::Error => Some("ErrorMetricsOut.bin"),
            Self::Extraction => Some("ExtractionMetricsOut.bin"),
            Self::Image => Some("ImageMetricsOut.bin"),
            Self::Q => Some("QMetricsOut.bin"),
            Self::QByLane => None,
            Self::QCollapsed => Some("QMetrics2030Out.bin"),
            Self::CorrectedIntensity => Some("CorrectedIntMetricsOut.bin"),
            Self::Index => Some("IndexMetricsOut.bin"),
        }
    }

    /// Which coordinate fills the third slot of this kind's [`MetricKey`]
    #[must_use]
    pub fn axis(self) -> KeyAxis {
        match self {
            Self::Tile => KeyAxis::Tile,
            Self::Index => KeyAxis::Read,
            Self::Error
            | Self::Extraction
            | Self::Image
            | Self::Q
            | Self::QByLane
            | Self::QCollapsed
            | Self::CorrectedIntensity => KeyAxis::Cycle,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tile => write!(f, "Tile"),
            Self::Error => write!(f, "Error"),
            Self::Extraction => write!(f, "Extraction"),
            Self::Image => write!(f, "Image"),
            Self::Q => write!(f, "Q"),
            Self::QByLane => write!(f, "QByLane"),
            Self::QCollapsed => write!(f, "QCollapsed"),
            Self::CorrectedIntensity => write!(f, "CorrectedIntensity"),
            Self::Index => write!(f, "Index"),
        }
    }
}

/// Third component of a composite key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAxis {
    /// Keyed on (lane, tile, cycle)
    Cycle,
    /// Keyed on (lane, tile, read)
    Read,
    /// Keyed on (lane, tile); the third component is always 0
    Tile,
}

/// Composite key addressing one record: `(lane, tile, cycle|read)`.
///
/// Keys order lexicographically by lane, then tile, then the third component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub lane: u16,
    pub tile: u32,
    /// Cycle or read number depending on the kind's [`KeyAxis`]; 0 for tile-level kinds
    pub id: u16,
}

impl MetricKey {
    #[must_use]
    pub fn new(lane: u16, tile: u32, id: u16) -> Self {
        Self { lane, tile, id }
    }
}

impl std::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lane {} tile {} id {}", self.lane, self.tile, self.id)
    }
}

/// How tile numbers encode their physical location on the flow cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileNaming {
    /// `SSTT`: surface, swath, tile (e.g. 1101)
    #[default]
    FourDigit,
    /// `SSCTT`: surface, swath, camera, tile (e.g. 11101)
    FiveDigit,
}

impl TileNaming {
    /// Surface a tile sits on; 0 for lane-level records that carry no tile
    #[must_use]
    pub fn surface(self, tile: u32) -> u16 {
        let surface = match self {
            Self::FourDigit => tile / 1000,
            Self::FiveDigit => tile / 10000,
        };
        u16::try_from(surface).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_from_tile() {
        assert_eq!(TileNaming::FourDigit.surface(1101), 1);
        assert_eq!(TileNaming::FourDigit.surface(2216), 2);
        assert_eq!(TileNaming::FiveDigit.surface(21101), 2);
        assert_eq!(TileNaming::FourDigit.surface(0), 0);
    }

    #[test]
    fn test_key_ordering() {
        let a = MetricKey::new(1, 1101, 5);
        let b = MetricKey::new(1, 1102, 1);
        let c = MetricKey::new(2, 1101, 1);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, MetricKey::new(1, 1101, 5));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(MetricKind::Q.file_name(), Some("QMetricsOut.bin"));
        assert_eq!(MetricKind::QByLane.file_name(), None);
        assert_eq!(MetricKind::Index.axis(), KeyAxis::Read);
        assert_eq!(MetricKind::Tile.axis(), KeyAxis::Tile);
        assert_eq!(MetricKind::Error.axis(), KeyAxis::Cycle);
    }
}
