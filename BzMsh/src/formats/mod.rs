//! File format handlers for the MSH model format and its texture sidecar

pub mod binary;
pub mod dxtbz2;
pub mod msh;

// Re-export main types
pub use binary::{BinaryReader, ChunkTag, Readable};
pub use dxtbz2::{TranscodeOptions, convert_dxtbz2_to_dds, transcode_dxtbz2};
pub use msh::{MshFile, inspect_msh, parse_msh_bytes, read_msh, serialize_msh, write_msh};
