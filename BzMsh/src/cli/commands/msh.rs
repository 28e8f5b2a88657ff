//! MSH CLI commands
//!
//! Commands for inspecting MSH files and dumping their scene graphs.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::batch::{find_files, load_models_batch};
use crate::cli::progress::{CUBE, LOOKING_GLASS, print_done, print_step, simple_bar};
use crate::formats::msh::inspect_msh;
use crate::scene::{AnimationMode, ImportMode, ImportOptions, load_scene};

fn import_options(global: bool) -> ImportOptions {
    ImportOptions {
        mode: if global { ImportMode::Global } else { ImportMode::Local },
        ..ImportOptions::default()
    }
}

/// Inspect an MSH file and display its structure.
pub fn inspect(path: &Path, json: bool) -> anyhow::Result<()> {
    let info = inspect_msh(path)
        .with_context(|| format!("Failed to read MSH file: {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("MSH File Information: {}", path.display());
    println!("====================");
    println!("Version:     {}", info.version);
    println!("File size:   {} bytes", info.file_size);
    println!("Blocks:      {}", info.blocks.len());

    for block in &info.blocks {
        println!();
        println!(
            "Block '{}' (scale {}{}{})",
            block.name,
            block.scale,
            if block.skinned { ", skinned" } else { "" },
            if block.move_anim { ", move anim" } else { "" }
        );
        if block.has_global_geometry {
            println!("  Flat geometry with {} bucky descriptors", block.bucky_count);
        }
        for mesh in &block.meshes {
            let state = mesh
                .state_index
                .map_or_else(String::new, |s| format!(" [state {s}]"));
            println!(
                "  {:indent$}- {} ({} vertices, {} triangles, {} groups){}",
                "",
                mesh.name,
                mesh.vertices,
                mesh.triangles,
                mesh.vertex_groups,
                state,
                indent = mesh.depth * 2
            );
        }
        for list in &block.animation_lists {
            println!(
                "  Animation '{}': {} tracks, {} keyframes",
                list.name, list.tracks, list.keyframes
            );
        }
        if block.skin_states > 0 {
            println!(
                "  Skin: {} states, {} weights",
                block.skin_states, block.skin_weights
            );
        }
    }

    if !info.failed_blocks.is_empty() {
        println!();
        println!("Failed blocks:");
        for failure in &info.failed_blocks {
            println!("  {failure}");
        }
    }

    Ok(())
}

/// Build the scene graph and write it as JSON.
pub fn scene(
    path: &Path,
    output: Option<&Path>,
    global: bool,
    animation_mode: AnimationMode,
    no_flip_uv: bool,
    no_animations: bool,
) -> anyhow::Result<()> {
    let options = ImportOptions {
        animation_mode,
        flip_uv_v: !no_flip_uv,
        import_animations: !no_animations,
        ..import_options(global)
    };

    let scene = load_scene(path, &options)
        .with_context(|| format!("Failed to load MSH file: {}", path.display()))?;

    for failure in &scene.failed_blocks {
        tracing::warn!("{failure}");
    }
    for warning in &scene.warnings {
        tracing::warn!("{warning}");
    }

    let json = serde_json::to_string_pretty(&scene)?;
    if let Some(output) = output {
        std::fs::write(output, json)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!(
            "Written {} nodes, {} materials, {} animations to {}",
            scene.nodes.len(),
            scene.materials.len(),
            scene.animations.len(),
            output.display()
        );
    } else {
        println!("{json}");
    }

    Ok(())
}

/// Load every MSH file under a directory in parallel.
pub fn batch(dir: &Path, global: bool, quiet: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    print_step(1, 2, LOOKING_GLASS, "Finding MSH files...");
    let files = find_files(dir, "msh")?;
    if files.is_empty() {
        println!("No MSH files found in {}", dir.display());
        return Ok(());
    }

    print_step(2, 2, CUBE, &format!("Loading {} models...", files.len()));
    let pb = simple_bar(files.len() as u64, quiet);
    let result = load_models_batch(&files, &import_options(global), |current, _, name| {
        pb.set_position(current as u64);
        pb.set_message(name.to_string());
    });
    pb.finish_and_clear();

    println!();
    println!("Batch load complete:");
    println!("  Loaded: {}", result.success_count);
    println!("  Failed: {}", result.error_count);
    println!("  Failed blocks: {}", result.failed_block_count);

    if result.error_count > 0 || result.failed_block_count > 0 {
        println!();
        println!("Issues:");
        for msg in result.results.iter().filter(|m| !m.starts_with("Loaded")) {
            println!("  {msg}");
        }
    }

    print_done(started.elapsed());
    Ok(())
}
