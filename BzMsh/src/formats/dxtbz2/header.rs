//! DXTBZ2 container header.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::formats::binary::Readable;

/// Fixed 24-byte header at the start of a `.dxtbz2` file.
///
/// Every mip payload that follows is preceded by a `u32` byte count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dxtbz2Header {
    pub signature: i32,
    pub dxt_level: i32,
    /// 1x1 fallback color for the smallest mip (RGBA).
    pub fallback_color: [u8; 4],
    pub mip_count: i32,
    pub base_height: i32,
    pub base_width: i32,
}

impl Readable for Dxtbz2Header {
    const SIZE: usize = 24;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            signature: LittleEndian::read_i32(&bytes[0..4]),
            dxt_level: LittleEndian::read_i32(&bytes[4..8]),
            fallback_color: [bytes[8], bytes[9], bytes[10], bytes[11]],
            mip_count: LittleEndian::read_i32(&bytes[12..16]),
            base_height: LittleEndian::read_i32(&bytes[16..20]),
            base_width: LittleEndian::read_i32(&bytes[20..24]),
        }
    }
}

impl Dxtbz2Header {
    /// Encode in on-disk layout.
    pub fn to_bytes(&self) -> [u8; 24] {
        let mut out = [0u8; 24];
        LittleEndian::write_i32(&mut out[0..4], self.signature);
        LittleEndian::write_i32(&mut out[4..8], self.dxt_level);
        out[8..12].copy_from_slice(&self.fallback_color);
        LittleEndian::write_i32(&mut out[12..16], self.mip_count);
        LittleEndian::write_i32(&mut out[16..20], self.base_height);
        LittleEndian::write_i32(&mut out[20..24], self.base_width);
        out
    }

    /// Guess whether the texture carries alpha from the first mip's size.
    ///
    /// The header has no pixel format field. A first mip whose byte count
    /// divided by the base height equals the base height is taken as the
    /// 16-bytes-per-block layout (BC3), anything else as BC1. Returns `None`
    /// when the base height gives no signal at all.
    pub fn guess_alpha(&self, first_mip_size: u32) -> Option<bool> {
        let height = u32::try_from(self.base_height).ok().filter(|&h| h > 0)?;
        Some(first_mip_size / height == height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::binary::BinaryReader;

    fn header(height: i32) -> Dxtbz2Header {
        Dxtbz2Header {
            signature: 0x3254_5844,
            dxt_level: 5,
            fallback_color: [1, 2, 3, 4],
            mip_count: 3,
            base_height: height,
            base_width: 4,
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = header(4).to_bytes();
        assert_eq!(&bytes[8..12], &[1, 2, 3, 4]);
        assert_eq!(&bytes[12..16], &3i32.to_le_bytes());

        let mut reader = BinaryReader::new(&bytes);
        let decoded: Dxtbz2Header = reader.read_struct().unwrap();
        assert_eq!(decoded, header(4));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_alpha_guess() {
        assert_eq!(header(4).guess_alpha(16), Some(true));
        assert_eq!(header(4).guess_alpha(10), Some(false));
        assert_eq!(header(4).guess_alpha(8), Some(false));
        assert_eq!(header(0).guess_alpha(16), None);
        assert_eq!(header(-4).guess_alpha(16), None);
    }
}
