//! DXTBZ2 to DDS transcoding
//!
//! Mip payloads are copied verbatim; only the container changes. The pixel
//! format is guessed from the size of the first mip, see
//! [`Dxtbz2Header::guess_alpha`].

#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::dds::{DdsLayout, DdsWriter};
use super::header::Dxtbz2Header;
use crate::error::{Error, Result, Warning};
use crate::formats::binary::BinaryReader;

/// Options for DXTBZ2 conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeOptions {
    /// Only write the largest mip level
    pub single_mip: bool,
    /// Replace an existing `.dds` next to the input instead of keeping it
    pub overwrite_existing: bool,
}

/// A transcoded texture.
#[derive(Debug, Clone)]
pub struct TranscodeOutput {
    /// Complete DDS file contents.
    pub dds: Vec<u8>,
    pub header: Dxtbz2Header,
    pub has_alpha: bool,
    pub dxgi_format: u32,
    /// Mip levels actually written; equals the DDS mip count.
    pub mips_written: u32,
    /// Mip levels that were requested (the header count, or 1 in single-mip mode).
    pub mips_requested: u32,
    pub warnings: Vec<Warning>,
}

/// Transcode DXTBZ2 bytes to a DX10-extended DDS.
///
/// A texture that ends before all requested mips is still converted: only
/// complete mips are written, the DDS mip count matches them, and a
/// [`Warning::PartialConversion`] is returned.
///
/// # Errors
/// Returns [`Error::TruncatedData`] if the header is short, [`Error::InvalidDxtbz2`]
/// if the header is unusable or the first mip is incomplete, and
/// [`Error::Cancelled`] if `cancel` is set between mips.
pub fn transcode_dxtbz2(
    data: &[u8],
    options: &TranscodeOptions,
    cancel: Option<&AtomicBool>,
) -> Result<TranscodeOutput> {
    let mut reader = BinaryReader::new(data);
    let header: Dxtbz2Header = reader.read_struct()?;
    tracing::debug!(
        "DXTBZ2 header: {}x{}, {} mips, dxt level {}",
        header.base_width,
        header.base_height,
        header.mip_count,
        header.dxt_level
    );

    if header.mip_count < 1 {
        return Err(Error::InvalidDxtbz2 {
            message: format!("mip count {}", header.mip_count),
        });
    }
    if header.base_width < 0 || header.base_height < 0 {
        return Err(Error::InvalidDxtbz2 {
            message: format!("dimensions {}x{}", header.base_width, header.base_height),
        });
    }

    let first_size = reader.read_u32().map_err(|_| Error::InvalidDxtbz2 {
        message: "missing first mip size".to_string(),
    })?;

    let mut warnings = Vec::new();
    let has_alpha = if let Some(alpha) = header.guess_alpha(first_size) {
        alpha
    } else {
        tracing::warn!(
            "Base height {} gives no pixel format signal; treating texture as opaque",
            header.base_height
        );
        warnings.push(Warning::AmbiguousPixelFormat {
            base_height: header.base_height,
        });
        false
    };

    let requested = if options.single_mip { 1 } else { header.mip_count as u32 };
    // The header count is untrusted; mips are collected as they are found
    let mut mips: Vec<&[u8]> = Vec::new();
    let mut next_size = Some(first_size);

    while (mips.len() as u32) < requested {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(Error::Cancelled);
        }
        let Some(size) = next_size else { break };
        let Ok(payload) = reader.read_bytes(size as usize) else {
            break;
        };
        mips.push(payload);
        if (mips.len() as u32) < requested {
            next_size = reader.read_u32().ok();
        }
    }

    if mips.is_empty() {
        return Err(Error::InvalidDxtbz2 {
            message: format!(
                "first mip declares {first_size} bytes, {} available",
                reader.remaining()
            ),
        });
    }

    let mips_written = mips.len() as u32;
    if mips_written < requested {
        tracing::warn!("DXTBZ2 ended after {} of {} mip levels", mips_written, requested);
        warnings.push(Warning::PartialConversion {
            declared: requested,
            written: mips_written,
        });
    }

    let layout = DdsLayout {
        width: header.base_width as u32,
        height: header.base_height as u32,
        mip_count: mips_written,
        has_alpha,
    };
    let payload_size: usize = mips.iter().map(|m| m.len()).sum();
    let mut dds = Vec::with_capacity(DdsWriter::PREAMBLE_SIZE + payload_size);
    DdsWriter::write_header(&mut dds, &layout);
    for mip in &mips {
        dds.extend_from_slice(mip);
    }

    Ok(TranscodeOutput {
        dds,
        header,
        has_alpha,
        dxgi_format: layout.dxgi_format(),
        mips_written,
        mips_requested: requested,
        warnings,
    })
}

/// Result of converting one file.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// A DDS file was written.
    Converted {
        path: PathBuf,
        has_alpha: bool,
        mips_written: u32,
        warnings: Vec<Warning>,
    },
    /// A DDS file already existed and `overwrite_existing` was off.
    SkippedExisting { path: PathBuf },
}

impl ConversionOutcome {
    /// Path of the DDS file, written or existing.
    pub fn path(&self) -> &Path {
        match self {
            Self::Converted { path, .. } | Self::SkippedExisting { path } => path,
        }
    }
}

/// DDS path used for a DXTBZ2 file when no output is given: same stem, `.dds` extension.
pub fn dds_path_for<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension("dds")
}

/// Convert a `.dxtbz2` file to `.dds`.
///
/// # Errors
/// Returns an error if the input cannot be read, the texture is invalid,
/// or the output cannot be written.
pub fn convert_dxtbz2_to_dds<P: AsRef<Path>>(
    input: P,
    output: Option<&Path>,
    options: &TranscodeOptions,
) -> Result<ConversionOutcome> {
    convert_dxtbz2_to_dds_with_cancel(input, output, options, None)
}

/// Convert a `.dxtbz2` file to `.dds`, checking `cancel` between mips.
///
/// # Errors
/// Returns an error if the input cannot be read, the texture is invalid,
/// the output cannot be written, or the conversion is cancelled.
pub fn convert_dxtbz2_to_dds_with_cancel<P: AsRef<Path>>(
    input: P,
    output: Option<&Path>,
    options: &TranscodeOptions,
    cancel: Option<&AtomicBool>,
) -> Result<ConversionOutcome> {
    let input = input.as_ref();
    let path = output.map_or_else(|| dds_path_for(input), Path::to_path_buf);

    if path.exists() && !options.overwrite_existing {
        tracing::debug!("Keeping existing {}", path.display());
        return Ok(ConversionOutcome::SkippedExisting { path });
    }

    let data = std::fs::read(input)?;
    let converted = transcode_dxtbz2(&data, options, cancel)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &converted.dds)?;

    tracing::info!(
        "Converted {} -> {} ({} mips, {})",
        input.display(),
        path.display(),
        converted.mips_written,
        if converted.has_alpha { "BC3" } else { "BC1" }
    );

    Ok(ConversionOutcome::Converted {
        path,
        has_alpha: converted.has_alpha,
        mips_written: converted.mips_written,
        warnings: converted.warnings,
    })
}
