use byteorder::{ByteOrder, LittleEndian};

use crate::core::error::MetricError;
use crate::core::types::MetricKind;

/// Little-endian field reader over the bytes of a single record.
///
/// The streaming reader sizes each record from the layout registry before
/// decoding, so running off the end (or leaving bytes unread) means the
/// decoder and registry disagree and is reported as `BadFormat`.
pub struct RecordCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    kind: MetricKind,
    version: u8,
    /// File offset of the first byte of `bytes`
    offset: u64,
}

impl<'a> RecordCursor<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8], kind: MetricKind, version: u8, offset: u64) -> Self {
        Self {
            bytes,
            pos: 0,
            kind,
            version,
            offset,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// File offset of the next unread byte
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset + self.pos as u64
    }

    /// Build a `BadFormat` error pointing at the current position
    #[must_use]
    pub fn bad_format(&self, reason: impl Into<String>) -> MetricError {
        MetricError::BadFormat {
            kind: self.kind,
            version: self.version,
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MetricError> {
        if self.remaining() < n {
            return Err(self.bad_format(format!(
                "record ended with {} bytes left, {n} needed",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u16(&mut self) -> Result<u16, MetricError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, MetricError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, MetricError> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, MetricError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    pub fn read_u16_array<const N: usize>(&mut self) -> Result<[u16; N], MetricError> {
        let mut values = [0u16; N];
        LittleEndian::read_u16_into(self.take(2 * N)?, &mut values);
        Ok(values)
    }

    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N], MetricError> {
        let mut values = [0u32; N];
        LittleEndian::read_u32_into(self.take(4 * N)?, &mut values);
        Ok(values)
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N], MetricError> {
        let mut values = [0f32; N];
        LittleEndian::read_f32_into(self.take(4 * N)?, &mut values);
        Ok(values)
    }

    pub fn read_u32_vec(&mut self, n: usize) -> Result<Vec<u32>, MetricError> {
        let mut values = vec![0u32; n];
        LittleEndian::read_u32_into(self.take(4 * n)?, &mut values);
        Ok(values)
    }

    /// Read a u16-length-prefixed string, replacing invalid UTF-8
    pub fn read_str(&mut self) -> Result<String, MetricError> {
        let len = usize::from(self.read_u16()?);
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }

    /// Fail unless every byte of the record was consumed
    pub fn finish(&self) -> Result<(), MetricError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(self.bad_format(format!("{} unread bytes in record", self.remaining())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x00, 0x00, 0x80, 0x3f];
        let mut cursor = RecordCursor::new(&bytes, MetricKind::Tile, 2, 2);
        assert_eq!(cursor.read_u16().unwrap(), 0x0201);
        assert_eq!(cursor.read_u32().unwrap(), 0x0605_0403);
        assert!((cursor.read_f32().unwrap() - 1.0).abs() < f32::EPSILON);
        assert!(cursor.finish().is_ok());
    }

    #[test]
    fn test_overrun_is_bad_format_with_offset() {
        let bytes = [0x01, 0x02, 0x03];
        let mut cursor = RecordCursor::new(&bytes, MetricKind::Error, 3, 100);
        cursor.read_u16().unwrap();
        let err = cursor.read_u16().unwrap_err();
        match err {
            MetricError::BadFormat {
                kind,
                version,
                offset,
                ..
            } => {
                assert_eq!(kind, MetricKind::Error);
                assert_eq!(version, 3);
                assert_eq!(offset, 102);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unread_bytes_fail_finish() {
        let bytes = [0u8; 4];
        let mut cursor = RecordCursor::new(&bytes, MetricKind::Q, 4, 0);
        cursor.read_u16().unwrap();
        assert!(cursor.finish().is_err());
    }

    #[test]
    fn test_read_str_and_arrays() {
        let mut bytes = vec![3, 0];
        bytes.extend_from_slice(b"ACG");
        bytes.extend_from_slice(&[1, 0, 2, 0]);
        let mut cursor = RecordCursor::new(&bytes, MetricKind::Index, 1, 0);
        assert_eq!(cursor.read_str().unwrap(), "ACG");
        assert_eq!(cursor.read_u16_array::<2>().unwrap(), [1, 2]);
        assert_eq!(cursor.remaining(), 0);
    }
}
