//! Bounded cursor over a single record body.
//!
//! Decoders never touch the surrounding byte stream: the parser hands each
//! of them a cursor limited to `size - 8` body bytes, and variable-length
//! payloads are located by seeking to record-relative offsets the way the
//! record header fields describe them.

use crate::error::{Error, Result};
use zerocopy::FromBytes;

/// Size of the `(type, size)` prefix every record carries.
pub const RECORD_HEADER_SIZE: usize = 8;

/// Cursor over one record body (the bytes after the 8-byte record header).
pub struct RecordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { data: body, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read a fixed-layout value and advance past it.
    pub fn read<T: FromBytes>(&mut self) -> Result<T> {
        let (value, _) = T::read_from_prefix(&self.data[self.pos..])
            .map_err(|_| Error::Malformed("truncated record".into()))?;
        self.pos += std::mem::size_of::<T>();
        Ok(value)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read::<u16>()
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read::<u32>()
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read::<i32>()
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read::<f32>()
    }

    /// Read `count` values of a fixed-layout type.
    pub fn read_array<T: FromBytes>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.read::<T>()?);
        }
        Ok(values)
    }

    /// Borrow `len` raw bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::Malformed("truncated record".into()));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read `count` UTF-16 code units, trim trailing NULs, decode lossily.
    pub fn read_utf16(&mut self, count: usize) -> Result<String> {
        let bytes = self.read_bytes(count * 2)?;
        let mut units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        while units.last() == Some(&0) {
            units.pop();
        }
        Ok(String::from_utf16_lossy(&units))
    }

    /// Seek forward to a record-relative byte offset (one that counts the
    /// 8-byte record header, as all offset fields in EMF records do).
    /// Seeking backwards means the offset field is inconsistent with the
    /// fields already consumed.
    pub fn seek_to_record_offset(&mut self, offset: u32) -> Result<()> {
        let body_offset = (offset as usize)
            .checked_sub(RECORD_HEADER_SIZE)
            .ok_or_else(|| Error::Malformed("offset precedes current position".into()))?;
        if body_offset < self.pos {
            return Err(Error::Malformed("offset precedes current position".into()));
        }
        if body_offset > self.data.len() {
            return Err(Error::Malformed("truncated record".into()));
        }
        self.pos = body_offset;
        Ok(())
    }
}
