//! Static registry of InterOp record layouts.
//!
//! Every supported `(kind, version)` pair has exactly one entry in [`LAYOUTS`].
//! Decoders read fields in the order listed here, and the streaming reader
//! uses the same entry to size each record, so the table is the single place
//! where version support is declared.

use serde::Serialize;

use crate::core::error::MetricError;
use crate::core::types::MetricKind;

/// Primitive type of one on-disk field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    U16,
    U32,
    U64,
    F32,
    /// u16 byte length followed by that many UTF-8 bytes
    Str,
}

impl FieldType {
    /// Width in bytes; for [`FieldType::Str`] this is the width of the length prefix
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
            Self::U64 => 8,
            Self::Str => 2,
        }
    }
}

/// How many times a field repeats within one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    Times(u8),
    /// Once per bin of the file's bin table
    PerBin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub repeat: Repeat,
}

/// What follows the version byte at the start of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderShape {
    /// One byte declaring the record size
    RecordSize,
    /// A bin count byte followed by `{value, lower, upper}` u16 triples
    BinTable,
    /// Nothing; records are self-delimiting
    VersionOnly,
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub kind: MetricKind,
    pub version: u8,
    pub header: HeaderShape,
    pub fields: &'static [Field],
}

impl Layout {
    /// Record width given the number of bins in the file's bin table.
    ///
    /// Returns `None` when the record contains length-prefixed strings.
    #[must_use]
    pub fn record_width(&self, bin_count: usize) -> Option<usize> {
        let mut width = 0;
        for field in self.fields {
            if field.ty == FieldType::Str {
                return None;
            }
            width += field.ty.width() * repeat_count(field.repeat, bin_count);
        }
        Some(width)
    }

    /// True when records of this layout do not all share one width
    #[must_use]
    pub fn is_variable_width(&self) -> bool {
        self.header != HeaderShape::RecordSize
    }
}

/// Number of values a repeated field holds
#[must_use]
pub fn repeat_count(repeat: Repeat, bin_count: usize) -> usize {
    match repeat {
        Repeat::Times(n) => usize::from(n),
        Repeat::PerBin => bin_count,
    }
}

const fn one(name: &'static str, ty: FieldType) -> Field {
    Field {
        name,
        ty,
        repeat: Repeat::Times(1),
    }
}

const fn many(name: &'static str, ty: FieldType, n: u8) -> Field {
    Field {
        name,
        ty,
        repeat: Repeat::Times(n),
    }
}

const fn per_bin(name: &'static str, ty: FieldType) -> Field {
    Field {
        name,
        ty,
        repeat: Repeat::PerBin,
    }
}

use FieldType::{Str, F32, U16, U32, U64};

/// Number of raw quality bins in an uncompressed Q histogram
pub const MAX_Q_BINS: u8 = 50;

/// All supported layouts
pub static LAYOUTS: &[Layout] = &[
    Layout {
        kind: MetricKind::Tile,
        version: 2,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("code", U16),
            one("value", F32),
        ],
    },
    Layout {
        kind: MetricKind::Error,
        version: 3,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            one("error_rate", F32),
            many("errors", U32, 5),
        ],
    },
    Layout {
        kind: MetricKind::Extraction,
        version: 2,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            many("focus", F32, 4),
            many("max_intensity", U16, 4),
            one("date_time", U64),
        ],
    },
    Layout {
        kind: MetricKind::Image,
        version: 1,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            one("channel", U16),
            one("min_contrast", U16),
            one("max_contrast", U16),
        ],
    },
    Layout {
        kind: MetricKind::Q,
        version: 4,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            many("qscore_hist", U32, MAX_Q_BINS),
        ],
    },
    Layout {
        kind: MetricKind::Q,
        version: 6,
        header: HeaderShape::BinTable,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            per_bin("qscore_hist", U32),
        ],
    },
    Layout {
        kind: MetricKind::QCollapsed,
        version: 2,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            one("q20", U32),
            one("q30", U32),
            one("total", U32),
            one("median_qscore", U32),
        ],
    },
    Layout {
        kind: MetricKind::CorrectedIntensity,
        version: 2,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            one("average_intensity", U16),
            many("corrected_intensity_all", U16, 4),
            many("corrected_intensity_called", U16, 4),
            many("called_counts", U32, 5),
            one("signal_to_noise", F32),
        ],
    },
    Layout {
        kind: MetricKind::CorrectedIntensity,
        version: 3,
        header: HeaderShape::RecordSize,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("cycle", U16),
            many("corrected_intensity_called", U16, 4),
            many("called_counts", U32, 5),
        ],
    },
    Layout {
        kind: MetricKind::Index,
        version: 1,
        header: HeaderShape::VersionOnly,
        fields: &[
            one("lane", U16),
            one("tile", U16),
            one("read", U16),
            one("index_seq", Str),
            one("cluster_count", U32),
            one("sample_id", Str),
            one("project", Str),
        ],
    },
];

/// Look up the layout for a kind and format version
///
/// # Errors
///
/// Returns `MetricError::UnsupportedVersion` if no layout is registered for the pair.
pub fn lookup(kind: MetricKind, version: u8) -> Result<&'static Layout, MetricError> {
    LAYOUTS
        .iter()
        .find(|layout| layout.kind == kind && layout.version == version)
        .ok_or(MetricError::UnsupportedVersion { kind, version })
}

/// Versions registered for a kind, in table order
pub fn versions(kind: MetricKind) -> impl Iterator<Item = u8> {
    LAYOUTS
        .iter()
        .filter(move |layout| layout.kind == kind)
        .map(|layout| layout.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_record_sizes() {
        let expected = [
            (MetricKind::Tile, 2, 10),
            (MetricKind::Error, 3, 30),
            (MetricKind::Extraction, 2, 38),
            (MetricKind::Image, 1, 12),
            (MetricKind::Q, 4, 206),
            (MetricKind::QCollapsed, 2, 22),
            (MetricKind::CorrectedIntensity, 2, 48),
            (MetricKind::CorrectedIntensity, 3, 34),
        ];
        for (kind, version, size) in expected {
            let layout = lookup(kind, version).unwrap();
            assert_eq!(layout.header, HeaderShape::RecordSize, "{kind} v{version}");
            assert_eq!(layout.record_width(0), Some(size), "{kind} v{version}");
        }
    }

    #[test]
    fn test_binned_record_width() {
        let layout = lookup(MetricKind::Q, 6).unwrap();
        assert!(layout.is_variable_width());
        assert_eq!(layout.record_width(0), Some(6));
        assert_eq!(layout.record_width(7), Some(6 + 28));
    }

    #[test]
    fn test_string_layout_has_no_width() {
        let layout = lookup(MetricKind::Index, 1).unwrap();
        assert_eq!(layout.header, HeaderShape::VersionOnly);
        assert_eq!(layout.record_width(0), None);
    }

    #[test]
    fn test_unknown_version_is_unsupported() {
        let err = lookup(MetricKind::Error, 9).unwrap_err();
        assert!(matches!(
            err,
            MetricError::UnsupportedVersion {
                kind: MetricKind::Error,
                version: 9
            }
        ));
        assert!(lookup(MetricKind::QByLane, 1).is_err());
    }

    #[test]
    fn test_no_duplicate_entries() {
        for (i, a) in LAYOUTS.iter().enumerate() {
            for b in &LAYOUTS[i + 1..] {
                assert!(
                    !(a.kind == b.kind && a.version == b.version),
                    "duplicate layout for {} v{}",
                    a.kind,
                    a.version
                );
            }
        }
    }

    #[test]
    fn test_versions() {
        let q: Vec<u8> = versions(MetricKind::Q).collect();
        assert_eq!(q, vec![4, 6]);
        assert_eq!(versions(MetricKind::QByLane).count(), 0);
    }
}
