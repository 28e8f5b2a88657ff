//! CLI commands for texture operations

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;

use crate::batch::{convert_textures_batch, find_files};
use crate::cli::progress::{GEAR, LOOKING_GLASS, PICTURE, print_done, print_step, simple_bar};
use crate::formats::binary::BinaryReader;
use crate::formats::dxtbz2::{Dxtbz2Header, TranscodeOptions};

/// Convert DXTBZ2 files (or every DXTBZ2 under the given directories) to DDS
pub fn convert(
    sources: &[PathBuf],
    output: Option<&Path>,
    single_mip: bool,
    overwrite: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, "Collecting textures...");
    let mut files = Vec::new();
    for source in sources {
        if source.is_dir() {
            files.extend(find_files(source, "dxtbz2")?);
        } else {
            files.push(source.clone());
        }
    }
    if files.is_empty() {
        println!("No DXTBZ2 files found");
        return Ok(());
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let options = TranscodeOptions {
        single_mip,
        overwrite_existing: overwrite,
    };

    print_step(2, 2, GEAR, &format!("Converting {} textures...", files.len()));
    let pb = simple_bar(files.len() as u64, quiet);
    let result = convert_textures_batch(&files, output, &options, None, |current, _, name| {
        pb.set_position(current as u64);
        pb.set_message(name.to_string());
    });
    pb.finish_and_clear();

    println!();
    println!("{PICTURE}Conversion complete:");
    println!("  Converted: {}", result.success_count);
    println!("  Skipped:   {}", result.skipped_count);
    println!("  Failed:    {}", result.error_count);
    println!("  Warnings:  {}", result.warning_count);

    if result.error_count > 0 {
        println!();
        println!("Errors:");
        for msg in result.results.iter().filter(|m| m.starts_with("Failed")) {
            println!("  {msg}");
        }
    }

    print_done(started.elapsed());
    Ok(())
}

/// Show the header of a DXTBZ2 file and the pixel format it would convert to
pub fn header(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut reader = BinaryReader::new(&data);
    let header: Dxtbz2Header = reader.read_struct()?;

    println!("DXTBZ2 Header: {}", path.display());
    println!();
    println!("Dimensions: {}x{}", header.base_width, header.base_height);
    println!("Mip levels: {}", header.mip_count);
    println!("DXT level:  {}", header.dxt_level);
    println!("Fallback:   {:?}", header.fallback_color);

    match reader.read_u32() {
        Ok(first) => {
            let format = match header.guess_alpha(first) {
                Some(true) => "BC3 (alpha)",
                Some(false) => "BC1 (opaque)",
                None => "ambiguous, BC1",
            };
            println!("First mip:  {first} bytes");
            println!("Format:     {format}");
        }
        Err(_) => println!("First mip:  missing"),
    }

    Ok(())
}

/// Show info about a DDS texture file
pub fn info(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::open(path)?;
    let dds = ddsfile::Dds::read(file).map_err(|e| anyhow::anyhow!("Failed to read DDS: {e}"))?;

    println!("DDS Information: {}", path.display());
    println!();
    println!("Dimensions: {}x{}", dds.get_width(), dds.get_height());
    println!("Mip levels: {}", dds.get_num_mipmap_levels());
    println!("Array layers: {}", dds.get_num_array_layers());

    if let Some(dxgi) = dds.get_dxgi_format() {
        println!("Format: {dxgi:?} (DXGI)");
    } else if let Some(d3d) = dds.get_d3d_format() {
        println!("Format: {d3d:?} (D3D)");
    } else {
        println!("Format: Unknown");
    }

    if let Ok(data) = dds.get_data(0) {
        println!("Data size: {} bytes", data.len());
    }

    Ok(())
}
