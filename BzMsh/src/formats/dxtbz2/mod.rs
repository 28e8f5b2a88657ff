//! DXTBZ2 compressed texture container
//!
//! A 24-byte header followed by size-prefixed, block-compressed mip levels.
//! Converted to DDS by repackaging the mips behind a DX10 header.

mod dds;
mod header;
mod transcode;

pub use dds::{DXGI_FORMAT_BC1_UNORM, DXGI_FORMAT_BC3_UNORM, DdsLayout, DdsWriter};
pub use header::Dxtbz2Header;
pub use transcode::{
    ConversionOutcome, TranscodeOptions, TranscodeOutput, convert_dxtbz2_to_dds,
    convert_dxtbz2_to_dds_with_cancel, dds_path_for, transcode_dxtbz2,
};
