//! Streaming decoder for InterOp metric files.
//!
//! A file is a header followed by records until end of input:
//!
//! ```text
//! [version: u8]
//! [record_size: u8]                                  -- RecordSize layouts
//! [bin_count: u8][bin_count x {value, lower, upper}] -- BinTable layouts (u16 each)
//! record*
//! ```
//!
//! Records are decoded one at a time, so memory use while reading is bounded
//! by a single record. End of input exactly on a record boundary ends the
//! stream; end of input inside a record is `Truncated` and the partial record
//! is dropped. A source with no bytes at all is an empty, valid file.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::MetricError;
use crate::core::metric::{DecodeMetric, MetricHeader};
use crate::core::metric_set::MetricSet;
use crate::core::q::{BinTable, QBin};
use crate::parsing::cursor::RecordCursor;
use crate::parsing::layout::{self, repeat_count, FieldType, HeaderShape, Layout};

/// Width of one `{value, lower, upper}` bin table entry
const BIN_ENTRY_WIDTH: usize = 6;

/// Read until `buf` is full or the source is exhausted; returns bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Lazy, single-pass sequence of records of one metric kind
pub struct MetricReader<R, M> {
    reader: R,
    /// `None` when the source was empty
    header: Option<MetricHeader>,
    layout: Option<&'static Layout>,
    /// Bytes consumed so far
    offset: u64,
    /// Offset of the first byte of the record being read
    record_start: u64,
    buffer: Vec<u8>,
    finished: bool,
    _metric: PhantomData<fn() -> M>,
}

impl<R: Read, M: DecodeMetric> MetricReader<R, M> {
    /// Read and validate the file header
    ///
    /// # Errors
    ///
    /// Returns `MetricError::UnsupportedVersion` for an unknown version,
    /// `MetricError::BadFormat` if the declared record size or bin table
    /// disagrees with the layout registry, `MetricError::Truncated` if the
    /// header itself is cut short, or `MetricError::Io` on read failure.
    pub fn new(reader: R) -> Result<Self, MetricError> {
        let mut this = Self {
            reader,
            header: None,
            layout: None,
            offset: 0,
            record_start: 0,
            buffer: Vec::new(),
            finished: false,
            _metric: PhantomData,
        };

        if !this.fill(1, true)? {
            this.finished = true;
            return Ok(this);
        }
        let version = this.buffer[0];
        let layout = layout::lookup(M::KIND, version)?;

        let header = match layout.header {
            HeaderShape::RecordSize => {
                this.fill(1, false)?;
                let declared = usize::from(this.buffer[1]);
                let expected = layout.record_width(0);
                if expected != Some(declared) {
                    return Err(MetricError::BadFormat {
                        kind: M::KIND,
                        version,
                        offset: 1,
                        reason: format!(
                            "declared record size {declared} does not match expected {}",
                            expected.unwrap_or(0)
                        ),
                    });
                }
                MetricHeader::new(version)
            }
            HeaderShape::BinTable => {
                this.fill(1, false)?;
                let bin_count = usize::from(this.buffer[1]);
                this.fill(bin_count * BIN_ENTRY_WIDTH, false)?;
                let bins = parse_bin_table(&this.buffer[2..]);
                if let Err(reason) = bins.validate() {
                    return Err(MetricError::BadFormat {
                        kind: M::KIND,
                        version,
                        offset: 2,
                        reason: format!("invalid bin table: {reason}"),
                    });
                }
                MetricHeader::new(version).with_bins(bins)
            }
            HeaderShape::VersionOnly => MetricHeader::new(version),
        };

        this.header = Some(header);
        this.layout = Some(layout);
        Ok(this)
    }

    /// The file header, `None` if the source was empty
    #[must_use]
    pub fn header(&self) -> Option<&MetricHeader> {
        self.header.as_ref()
    }

    /// Number of bytes consumed so far
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Append `n` bytes to the record buffer.
    ///
    /// Returns `false` only when no bytes at all were available and the
    /// buffer is empty (a clean end of input at a record boundary).
    fn fill(&mut self, n: usize, at_boundary: bool) -> Result<bool, MetricError> {
        let start = self.buffer.len();
        self.buffer.resize(start + n, 0);
        let got = read_up_to(&mut self.reader, &mut self.buffer[start..])?;
        self.offset += got as u64;
        if got == n {
            return Ok(true);
        }
        self.buffer.truncate(start + got);
        if got == 0 && start == 0 && at_boundary {
            return Ok(false);
        }
        Err(MetricError::Truncated {
            kind: M::KIND,
            offset: self.record_start,
            expected: start + n,
            found: start + got,
        })
    }

    /// Buffer the bytes of the next record; `false` at end of input
    fn fill_record(&mut self, layout: &Layout, bin_count: usize) -> Result<bool, MetricError> {
        self.buffer.clear();
        self.record_start = self.offset;

        if let Some(width) = layout.record_width(bin_count) {
            return self.fill(width, true);
        }

        // Self-delimiting record: walk the fields, reading each string's
        // length prefix before its body.
        let mut pending = 0;
        for field in layout.fields {
            if field.ty == FieldType::Str {
                let at_boundary = self.buffer.is_empty();
                if !self.fill(pending + FieldType::Str.width(), at_boundary)? {
                    return Ok(false);
                }
                pending = 0;
                let prefix = &self.buffer[self.buffer.len() - FieldType::Str.width()..];
                let len = usize::from(LittleEndian::read_u16(prefix));
                self.fill(len, false)?;
            } else {
                pending += field.ty.width() * repeat_count(field.repeat, bin_count);
            }
        }
        if pending > 0 {
            let at_boundary = self.buffer.is_empty();
            return self.fill(pending, at_boundary);
        }
        Ok(true)
    }

    fn next_record(&mut self) -> Result<Option<M>, MetricError> {
        let (Some(layout), Some(header)) = (self.layout, self.header.as_ref()) else {
            return Ok(None);
        };
        let bin_count = header.bin_count();
        if !self.fill_record(layout, bin_count)? {
            return Ok(None);
        }

        let Some(header) = self.header.as_ref() else {
            return Ok(None);
        };
        let mut cursor = RecordCursor::new(&self.buffer, M::KIND, header.version, self.record_start);
        let metric = M::decode(&mut cursor, header)?;
        cursor.finish()?;
        Ok(Some(metric))
    }
}

impl<R: Read, M: DecodeMetric> Iterator for MetricReader<R, M> {
    type Item = Result<M, MetricError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_record() {
            Ok(Some(metric)) => Some(Ok(metric)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

fn parse_bin_table(bytes: &[u8]) -> BinTable {
    BinTable::new(
        bytes
            .chunks_exact(BIN_ENTRY_WIDTH)
            .map(|entry| {
                QBin::new(
                    LittleEndian::read_u16(&entry[0..2]),
                    LittleEndian::read_u16(&entry[2..4]),
                    LittleEndian::read_u16(&entry[4..6]),
                )
            })
            .collect(),
    )
}

/// Decode a whole source, keeping the records read before any failure.
///
/// Returns the collection built so far together with the outcome of the read;
/// callers that can use a partially written file inspect the collection even
/// when the outcome is `Truncated`.
pub fn read_metrics_partial<M: DecodeMetric, R: Read>(
    reader: R,
) -> (MetricSet<M>, Result<(), MetricError>) {
    let records = match MetricReader::<R, M>::new(reader) {
        Ok(records) => records,
        Err(e) => return (MetricSet::default(), Err(e)),
    };
    let mut set = MetricSet::new(records.header().cloned().unwrap_or_default());
    for metric in records {
        let inserted = metric.and_then(|metric| {
            if M::FRAGMENTED {
                set.insert_fragment(metric)
            } else {
                set.insert(metric)
            }
        });
        if let Err(e) = inserted {
            return (set, Err(e));
        }
    }
    (set, Ok(()))
}

/// Decode every record of one metric kind from a byte source
///
/// # Errors
///
/// Returns the first decoding or insertion failure; see [`MetricReader::new`]
/// and [`MetricSet::insert`].
pub fn read_metrics<M: DecodeMetric, R: Read>(reader: R) -> Result<MetricSet<M>, MetricError> {
    let (set, outcome) = read_metrics_partial(reader);
    outcome.map(|()| set)
}

/// Decode an InterOp file from disk
///
/// # Errors
///
/// Returns `MetricError::Io` if the file cannot be opened, or any decoding failure.
pub fn read_metric_file<M: DecodeMetric>(path: &Path) -> Result<MetricSet<M>, MetricError> {
    let reader = File::open(path).map(BufReader::new)?;
    read_metrics(reader)
}
