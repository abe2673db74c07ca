use crate::core::error::MetricError;
use crate::core::q::BinTable;
use crate::core::types::{KeyAxis, MetricKey, MetricKind};
use crate::parsing::cursor::RecordCursor;

/// A record of one metric kind, addressable by its composite key
pub trait Metric: Sized {
    const KIND: MetricKind;

    fn lane(&self) -> u16;

    fn tile(&self) -> u32;

    fn cycle(&self) -> u16 {
        0
    }

    fn read(&self) -> u16 {
        0
    }

    /// Composite key built from the coordinate named by the kind's axis
    fn key(&self) -> MetricKey {
        let id = match Self::KIND.axis() {
            KeyAxis::Cycle => self.cycle(),
            KeyAxis::Read => self.read(),
            KeyAxis::Tile => 0,
        };
        MetricKey::new(self.lane(), self.tile(), id)
    }
}

/// Header fields shared by every record of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHeader {
    pub version: u8,
    /// Present only for the compressed Q layout
    pub bins: Option<BinTable>,
}

impl MetricHeader {
    #[must_use]
    pub fn new(version: u8) -> Self {
        Self {
            version,
            bins: None,
        }
    }

    #[must_use]
    pub fn with_bins(mut self, bins: BinTable) -> Self {
        self.bins = Some(bins);
        self
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.as_ref().map_or(0, BinTable::len)
    }
}

/// A metric that can be decoded from an InterOp file
pub trait DecodeMetric: Metric {
    /// True when each on-disk record is a fragment (one code, channel or index)
    /// that must be merged with the other fragments sharing its key.
    const FRAGMENTED: bool = false;

    /// Decode one record; `cursor` spans exactly the record's bytes
    ///
    /// # Errors
    ///
    /// Returns `MetricError::BadFormat` if the bytes disagree with the layout.
    fn decode(cursor: &mut RecordCursor<'_>, header: &MetricHeader) -> Result<Self, MetricError>;

    /// Fold another fragment with the same key into this record
    ///
    /// # Errors
    ///
    /// Returns `MetricError::DuplicateKey` if the fragment repeats data already present.
    fn merge(&mut self, fragment: Self) -> Result<(), MetricError> {
        Err(MetricError::DuplicateKey {
            kind: Self::KIND,
            key: fragment.key(),
        })
    }
}
