//! Cursor-based little-endian reader over an in-memory buffer.
//!
//! Files are read whole before parsing, so the reader works on a borrowed
//! slice and hands out sub-readers bounded to a chunk's payload. Skipping an
//! unknown chunk is just dropping its sub-reader.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Four-character chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    /// Tag as it appears on disk.
    pub const fn new(tag: &[u8; 4]) -> Self {
        Self(*tag)
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag({self})")
    }
}

/// A fixed-size value that can be decoded from exactly `SIZE` bytes.
pub trait Readable: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from a slice of exactly `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self;
}

impl Readable for u8 {
    const SIZE: usize = 1;
    fn decode(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Readable for u16 {
    const SIZE: usize = 2;
    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_u16(bytes)
    }
}

impl Readable for u32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_u32(bytes)
    }
}

impl Readable for i32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_i32(bytes)
    }
}

impl Readable for f32 {
    const SIZE: usize = 4;
    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_f32(bytes)
    }
}

impl<const N: usize> Readable for [u8; N] {
    const SIZE: usize = N;
    fn decode(bytes: &[u8]) -> Self {
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes[..N]);
        out
    }
}

impl<const N: usize> Readable for [f32; N] {
    const SIZE: usize = 4 * N;
    fn decode(bytes: &[u8]) -> Self {
        let mut out = [0f32; N];
        LittleEndian::read_f32_into(&bytes[..4 * N], &mut out);
        out
    }
}

/// A tagged, length-prefixed chunk. `reader` is bounded to the payload.
pub struct Chunk<'a> {
    pub tag: ChunkTag,
    /// Absolute offset of the chunk header.
    pub offset: usize,
    pub reader: BinaryReader<'a>,
}

/// Forward-only reader over a byte slice.
#[derive(Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> BinaryReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Position relative to the start of this reader's slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Position relative to the start of the original buffer.
    pub fn absolute_position(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Take the next `len` bytes, failing without moving if they are not there.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::TruncatedData {
                offset: self.absolute_position(),
                needed: len,
                available: self.remaining(),
            });
        }
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read one fixed-size value.
    pub fn read_struct<T: Readable>(&mut self) -> Result<T> {
        let bytes = self.read_bytes(T::SIZE)?;
        Ok(T::decode(bytes))
    }

    /// Read `count` contiguous values. The whole byte range is checked before
    /// anything is allocated.
    pub fn read_array<T: Readable>(&mut self, count: usize) -> Result<Vec<T>> {
        let total = count.checked_mul(T::SIZE).ok_or(Error::TruncatedData {
            offset: self.absolute_position(),
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        let bytes = self.read_bytes(total)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::decode).collect())
    }

    /// Read a `u32` count followed by that many values.
    pub fn read_counted<T: Readable>(&mut self) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        self.read_array(count)
    }

    /// Read a fixed-width, NUL-padded string field of `max_len` bytes.
    pub fn read_cstring(&mut self, max_len: usize) -> Result<String> {
        let bytes = self.read_bytes(max_len)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_struct()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_struct()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_struct()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_struct()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_struct()
    }

    /// Read a chunk header and split off its payload.
    ///
    /// The parent reader advances past the whole chunk, so a caller that does
    /// not understand the tag skips exactly the declared length.
    pub fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let offset = self.absolute_position();
        let tag = ChunkTag(self.read_struct::<[u8; 4]>()?);
        let length = self.read_u32()? as usize;
        let payload = self.read_bytes(length)?;
        Ok(Chunk {
            tag,
            offset,
            reader: BinaryReader::with_base(payload, offset + 8),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3F];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0x0403_0201);
        assert!((reader.read_f32().unwrap() - 1.0).abs() < f32::EPSILON);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let data = [0u8; 6];
        let mut reader = BinaryReader::new(&data);
        reader.read_u32().unwrap();
        match reader.read_u32() {
            Err(Error::TruncatedData { offset, needed, available }) => {
                assert_eq!(offset, 4);
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
        // A failed read does not consume anything
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_read_array_checks_length_first() {
        let data = [1u8, 0, 2, 0];
        let mut reader = BinaryReader::new(&data);
        assert!(reader.read_array::<u16>(3).is_err());
        assert_eq!(reader.read_array::<u16>(2).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_read_cstring_stops_at_nul() {
        let mut data = [0u8; 8];
        data[..3].copy_from_slice(b"abc");
        data[4] = b'x';
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_cstring(8).unwrap(), "abc");
        assert!(reader.is_empty());
    }

    #[test]
    fn test_chunk_is_bounded_and_skipped() {
        let mut data = Vec::new();
        data.extend_from_slice(b"ZZZZ");
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&[9, 9, 9]);
        data.extend_from_slice(&7u16.to_le_bytes());

        let mut reader = BinaryReader::new(&data);
        let mut chunk = reader.read_chunk().unwrap();
        assert_eq!(chunk.tag, ChunkTag::new(b"ZZZZ"));
        assert_eq!(chunk.offset, 0);
        assert_eq!(chunk.reader.remaining(), 3);
        assert!(chunk.reader.read_u32().is_err());
        assert_eq!(reader.read_u16().unwrap(), 7);
    }

    #[test]
    fn test_chunk_length_past_end_is_truncation() {
        let mut data = Vec::new();
        data.extend_from_slice(b"ABCD");
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[0; 10]);
        let mut reader = BinaryReader::new(&data);
        assert!(matches!(reader.read_chunk(), Err(Error::TruncatedData { .. })));
    }
}
