//! DX10-extended DDS header writing.

/// DXGI format written for textures guessed to carry alpha.
pub const DXGI_FORMAT_BC3_UNORM: u32 = 77;
/// DXGI format written for opaque textures.
pub const DXGI_FORMAT_BC1_UNORM: u32 = 71;

/// Header fields that vary between outputs.
#[derive(Debug, Clone, Copy)]
pub struct DdsLayout {
    pub width: u32,
    pub height: u32,
    pub mip_count: u32,
    pub has_alpha: bool,
}

impl DdsLayout {
    pub fn dxgi_format(&self) -> u32 {
        if self.has_alpha {
            DXGI_FORMAT_BC3_UNORM
        } else {
            DXGI_FORMAT_BC1_UNORM
        }
    }
}

/// DDS header writer for block-compressed textures behind a `DX10` header
pub struct DdsWriter;

impl DdsWriter {
    const DDS_MAGIC: u32 = 0x2053_4444; // 'DDS '
    const DDS_HEADER_SIZE: u32 = 124;
    const DDS_PIXELFORMAT_SIZE: u32 = 32;
    const DDSD_CAPS: u32 = 0x1;
    const DDSD_HEIGHT: u32 = 0x2;
    const DDSD_WIDTH: u32 = 0x4;
    const DDSD_PIXELFORMAT: u32 = 0x1000;
    const DDSD_MIPMAPCOUNT: u32 = 0x2_0000;
    const DDPF_ALPHAPIXELS: u32 = 0x1;
    const DDPF_FOURCC: u32 = 0x4;
    const DDSCAPS_COMPLEX: u32 = 0x8;
    const DDSCAPS_TEXTURE: u32 = 0x1000;
    const DDSCAPS_MIPMAP: u32 = 0x40_0000;
    const FOURCC_DX10: u32 = 0x3031_5844; // 'DX10'
    const D3D10_RESOURCE_DIMENSION_TEXTURE2D: u32 = 3;

    /// Size of magic, header and DX10 header together.
    pub const PREAMBLE_SIZE: usize = 4 + 124 + 20;

    /// Append magic, header and DX10 header.
    pub fn write_header(out: &mut Vec<u8>, layout: &DdsLayout) {
        let mut put = |v: u32| out.extend_from_slice(&v.to_le_bytes());

        put(Self::DDS_MAGIC);
        put(Self::DDS_HEADER_SIZE);

        let mut flags = Self::DDSD_CAPS | Self::DDSD_HEIGHT | Self::DDSD_WIDTH | Self::DDSD_PIXELFORMAT;
        let mut caps = Self::DDSCAPS_TEXTURE;
        if layout.mip_count > 1 {
            flags |= Self::DDSD_MIPMAPCOUNT;
            caps |= Self::DDSCAPS_COMPLEX | Self::DDSCAPS_MIPMAP;
        }
        put(flags);
        put(layout.height);
        put(layout.width);
        // Pitch / linear size
        put(0);
        // Depth
        put(0);
        put(layout.mip_count);
        // Reserved (11 dwords)
        for _ in 0..11 {
            put(0);
        }

        // Pixel format
        put(Self::DDS_PIXELFORMAT_SIZE);
        let mut pf_flags = Self::DDPF_FOURCC;
        if layout.has_alpha {
            pf_flags |= Self::DDPF_ALPHAPIXELS;
        }
        put(pf_flags);
        put(Self::FOURCC_DX10);
        // RGB bit count and R/G/B/A masks
        for _ in 0..5 {
            put(0);
        }

        put(caps);
        // Caps2, Caps3, Caps4, Reserved2
        for _ in 0..4 {
            put(0);
        }

        // DX10 header
        put(layout.dxgi_format());
        put(Self::D3D10_RESOURCE_DIMENSION_TEXTURE2D);
        // Misc flag
        put(0);
        // Array size
        put(1);
        // Misc flags 2
        put(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_size_and_fields() {
        let mut out = Vec::new();
        DdsWriter::write_header(
            &mut out,
            &DdsLayout { width: 8, height: 4, mip_count: 1, has_alpha: false },
        );
        assert_eq!(out.len(), DdsWriter::PREAMBLE_SIZE);
        assert_eq!(&out[0..4], b"DDS ");
        assert_eq!(u32_at(&out, 4), 124);
        assert_eq!(u32_at(&out, 8), 0x1007);
        assert_eq!(u32_at(&out, 12), 4);
        assert_eq!(u32_at(&out, 16), 8);
        assert_eq!(u32_at(&out, 28), 1);
        assert_eq!(u32_at(&out, 76), 32);
        assert_eq!(u32_at(&out, 80), 0x4);
        assert_eq!(&out[84..88], b"DX10");
        assert_eq!(u32_at(&out, 108), 0x1000);
        assert_eq!(u32_at(&out, 128), 71);
        assert_eq!(u32_at(&out, 132), 3);
        assert_eq!(u32_at(&out, 140), 1);
    }

    #[test]
    fn test_mip_flags_only_with_several_mips() {
        let mut out = Vec::new();
        DdsWriter::write_header(
            &mut out,
            &DdsLayout { width: 4, height: 4, mip_count: 3, has_alpha: true },
        );
        assert_eq!(u32_at(&out, 8) & 0x2_0000, 0x2_0000);
        assert_eq!(u32_at(&out, 108), 0x1000 | 0x8 | 0x40_0000);
        assert_eq!(u32_at(&out, 80), 0x5);
        assert_eq!(u32_at(&out, 128), 77);
    }
}
