//! Batch texture conversion and model loading
//!
//! Files are processed in parallel. Each file gets its own reader and
//! builder session; a failing file is reported and the rest continue.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::formats::dxtbz2::{ConversionOutcome, TranscodeOptions, convert_dxtbz2_to_dds_with_cancel};
use crate::scene::{ImportOptions, load_scene};

/// Result of batch texture conversion
#[derive(Debug, Clone, Default)]
pub struct BatchConvertResult {
    /// Number of files converted
    pub success_count: usize,
    /// Number of files left alone because a `.dds` already existed
    pub skipped_count: usize,
    /// Number of failed conversions
    pub error_count: usize,
    /// Number of warnings across converted files
    pub warning_count: usize,
    /// Messages for each file processed
    pub results: Vec<String>,
    /// Failed input files with their error
    pub failures: Vec<(PathBuf, String)>,
}

/// Result of batch model loading
#[derive(Debug, Clone, Default)]
pub struct BatchLoadResult {
    /// Number of files that loaded (possibly with failed blocks)
    pub success_count: usize,
    /// Number of files that could not be read at all
    pub error_count: usize,
    /// Number of failed blocks across loaded files
    pub failed_block_count: usize,
    /// Messages for each file processed
    pub results: Vec<String>,
    /// Failed input files with their error
    pub failures: Vec<(PathBuf, String)>,
}

/// Find files with the given extension (case-insensitive) under `dir`.
///
/// # Errors
/// Returns an error if `dir` is not a directory or cannot be walked.
pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::InvalidPath(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let matches = entry
            .path()
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if entry.file_type().is_file() && matches {
            files.push(entry.into_path());
        }
    }
    tracing::debug!("Found {} .{} files under {}", files.len(), extension, dir.display());
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "unknown".to_string(), |n| n.to_string_lossy().to_string())
}

/// Convert many `.dxtbz2` files in parallel
///
/// # Arguments
/// * `files` - Input `.dxtbz2` files
/// * `output_dir` - Directory for the `.dds` files. If None, each is written next to its input
/// * `options` - Conversion options shared by every file
/// * `cancel` - Checked between mips of every file
/// * `progress` - Callback for progress updates (current, total, description)
pub fn convert_textures_batch<F>(
    files: &[PathBuf],
    output_dir: Option<&Path>,
    options: &TranscodeOptions,
    cancel: Option<&AtomicBool>,
    progress: F,
) -> BatchConvertResult
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    let total = files.len();
    let success_counter = AtomicUsize::new(0);
    let skipped_counter = AtomicUsize::new(0);
    let error_counter = AtomicUsize::new(0);
    let warning_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);

    let outcomes: Vec<(String, Option<(PathBuf, String)>)> = files
        .par_iter()
        .map(|input| {
            let name = display_name(input);
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, &name);

            let output = output_dir.map(|dir| {
                let stem = input
                    .file_stem()
                    .map_or_else(|| "texture".to_string(), |s| s.to_string_lossy().to_string());
                dir.join(format!("{stem}.dds"))
            });

            match convert_dxtbz2_to_dds_with_cancel(input, output.as_deref(), options, cancel) {
                Ok(ConversionOutcome::Converted { path, mips_written, warnings, .. }) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    warning_counter.fetch_add(warnings.len(), Ordering::SeqCst);
                    let mut message =
                        format!("Converted {name} -> {} ({mips_written} mips)", display_name(&path));
                    for warning in &warnings {
                        message.push_str(&format!("; {warning}"));
                    }
                    (message, None)
                }
                Ok(ConversionOutcome::SkippedExisting { path }) => {
                    skipped_counter.fetch_add(1, Ordering::SeqCst);
                    (format!("Skipped {name}: {} exists", display_name(&path)), None)
                }
                Err(e) => {
                    error_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!("Failed to convert {}: {}", input.display(), e);
                    (format!("Failed {name}: {e}"), Some((input.clone(), e.to_string())))
                }
            }
        })
        .collect();

    let (results, failures): (Vec<_>, Vec<_>) = outcomes.into_iter().unzip();
    BatchConvertResult {
        success_count: success_counter.load(Ordering::SeqCst),
        skipped_count: skipped_counter.load(Ordering::SeqCst),
        error_count: error_counter.load(Ordering::SeqCst),
        warning_count: warning_counter.load(Ordering::SeqCst),
        results,
        failures: failures.into_iter().flatten().collect(),
    }
}

/// Parse and build many `.msh` files in parallel, each with its own material session
///
/// # Arguments
/// * `files` - Input `.msh` files
/// * `options` - Import options shared by every file
/// * `progress` - Callback for progress updates (current, total, description)
pub fn load_models_batch<F>(files: &[PathBuf], options: &ImportOptions, progress: F) -> BatchLoadResult
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    let total = files.len();
    let success_counter = AtomicUsize::new(0);
    let error_counter = AtomicUsize::new(0);
    let block_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);

    let outcomes: Vec<(Vec<String>, Option<(PathBuf, String)>)> = files
        .par_iter()
        .map(|input| {
            let name = display_name(input);
            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, &name);

            match load_scene(input, options) {
                Ok(scene) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    block_counter.fetch_add(scene.failed_blocks.len(), Ordering::SeqCst);
                    let mut messages = vec![format!(
                        "Loaded {name}: {} nodes, {} materials, {} animations",
                        scene.nodes.len(),
                        scene.materials.len(),
                        scene.animations.len()
                    )];
                    messages.extend(scene.failed_blocks.iter().map(|e| format!("{name}: {e}")));
                    messages.extend(scene.warnings.iter().map(|w| format!("{name}: {w}")));
                    (messages, None)
                }
                Err(e) => {
                    error_counter.fetch_add(1, Ordering::SeqCst);
                    tracing::warn!("Failed to load {}: {}", input.display(), e);
                    (vec![format!("Failed {name}: {e}")], Some((input.clone(), e.to_string())))
                }
            }
        })
        .collect();

    let mut result = BatchLoadResult {
        success_count: success_counter.load(Ordering::SeqCst),
        error_count: error_counter.load(Ordering::SeqCst),
        failed_block_count: block_counter.load(Ordering::SeqCst),
        ..BatchLoadResult::default()
    };
    for (messages, failure) in outcomes {
        result.results.extend(messages);
        result.failures.extend(failure);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::dxtbz2::Dxtbz2Header;

    fn write_texture(path: &Path, sizes: &[u32]) {
        let header = Dxtbz2Header {
            signature: 0,
            dxt_level: 5,
            fallback_color: [0; 4],
            mip_count: 2,
            base_height: 4,
            base_width: 4,
        };
        let mut data = header.to_bytes().to_vec();
        for &size in sizes {
            data.extend_from_slice(&size.to_le_bytes());
            data.extend(std::iter::repeat_n(0u8, size as usize));
        }
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_texture(&dir.path().join("a.dxtbz2"), &[16, 16]);
        write_texture(&dir.path().join("b.dxtbz2"), &[16]);
        std::fs::write(dir.path().join("c.dxtbz2"), [0u8; 7]).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"not a texture").unwrap();

        let files = find_files(dir.path(), "dxtbz2").unwrap();
        assert_eq!(files.len(), 3);

        let out = dir.path().join("out");
        let result =
            convert_textures_batch(&files, Some(&out), &TranscodeOptions::default(), None, |_, _, _| {});
        assert_eq!(result.success_count, 2);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
        assert_eq!(result.failures[0].0, dir.path().join("c.dxtbz2"));
        assert!(out.join("a.dds").exists());
        assert!(out.join("b.dds").exists());
        assert_eq!(result.results.len(), 3);
    }

    #[test]
    fn test_find_files_rejects_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_files(dir.path().join("missing"), "msh"),
            Err(Error::InvalidPath(_))
        ));
    }
}
