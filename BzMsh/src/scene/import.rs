//! Driving a [`SceneSink`] from a built scene.
//!
//! Order: materials, objects (parent before child), material assignments,
//! armatures, keyframes.

use std::path::{Path, PathBuf};

use super::options::ImportOptions;
use super::sink::{KeyframeTarget, SceneSink, TextureLocator};
use super::types::{AnimationTarget, Scene};
use crate::error::{Result, Warning};
use crate::formats::dxtbz2::{ConversionOutcome, TranscodeOptions, convert_dxtbz2_to_dds};

/// Summary of one import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub objects: usize,
    pub materials: usize,
    pub armatures: usize,
    pub keyframes: usize,
    /// `.dds` files written from `.dxtbz2` textures.
    pub converted_textures: Vec<PathBuf>,
    /// The scene's own warnings followed by those raised during import.
    pub warnings: Vec<Warning>,
}

/// Hand a scene to `sink`.
///
/// Missing textures and failed texture conversions are warnings; the
/// material is created without a texture.
///
/// # Errors
/// Returns the first error raised by the sink.
pub fn import_scene<S, L>(
    scene: &Scene,
    sink: &mut S,
    locator: &L,
    options: &ImportOptions,
) -> Result<ImportReport>
where
    S: SceneSink,
    L: TextureLocator + ?Sized,
{
    let mut report = ImportReport {
        warnings: scene.warnings.clone(),
        ..ImportReport::default()
    };

    let mut materials = Vec::with_capacity(scene.materials.len());
    for material in &scene.materials {
        let texture = material
            .texture
            .as_deref()
            .and_then(|name| find_texture(name, locator, options, &mut report));
        materials.push(sink.create_material(material, texture.as_deref())?);
        report.materials += 1;
    }

    // Nodes are stored parent first, so every parent handle exists when its child is placed
    let mut objects: Vec<S::Handle> = Vec::with_capacity(scene.nodes.len());
    for node in &scene.nodes {
        let handle = sink.create_mesh_object(&node.name, node.geometry.as_ref())?;
        let parent = node.parent.and_then(|p| objects.get(p));
        sink.set_parent_transform(&handle, parent, &node.transform)?;

        if let Some(geometry) = &node.geometry {
            for range in &geometry.face_ranges {
                if let Some(material) = range.material.and_then(|m| materials.get(m)) {
                    sink.assign_material(&handle, material, range.start, range.count)?;
                }
            }
        }
        objects.push(handle);
        report.objects += 1;
    }

    let mut armatures = Vec::with_capacity(scene.armatures.len());
    for armature in &scene.armatures {
        let mesh = armature.node.and_then(|n| objects.get(n));
        armatures.push(sink.create_armature(armature, mesh)?);
        report.armatures += 1;
    }

    for animation in &scene.animations {
        for track in &animation.tracks {
            let target = match track.target {
                AnimationTarget::Node(id) => objects.get(id).map(KeyframeTarget::Object),
                AnimationTarget::Bone { armature, bone } => {
                    armatures.get(armature).and_then(|handle| {
                        scene.armatures[armature]
                            .bones
                            .get(bone)
                            .map(|b| KeyframeTarget::Bone {
                                armature: handle,
                                bone: b.name.as_str(),
                            })
                    })
                }
            };
            let Some(target) = target else { continue };
            for key in &track.keyframes {
                sink.create_keyframe(target, &track.action, key)?;
                report.keyframes += 1;
            }
        }
    }

    tracing::info!(
        "Imported {} objects, {} materials, {} keyframes ({} warnings)",
        report.objects,
        report.materials,
        report.keyframes,
        report.warnings.len()
    );
    Ok(report)
}

/// Locate a texture by the stem of its stored name, converting `.dxtbz2` if enabled.
fn find_texture<L: TextureLocator + ?Sized>(
    name: &str,
    locator: &L,
    options: &ImportOptions,
    report: &mut ImportReport,
) -> Option<PathBuf> {
    let base = Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_string(), |s| s.to_string_lossy().into_owned());

    let path = match locator.locate(&base, &options.texture_extensions) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!("Texture '{}' not found: {}", name, e);
            report.warnings.push(Warning::ResourceNotFound {
                name: name.to_string(),
            });
            return None;
        }
    };

    let is_dxtbz2 = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("dxtbz2"));
    if !is_dxtbz2 || !options.auto_convert_dxtbz2 {
        return Some(path);
    }

    match convert_dxtbz2_to_dds(&path, None, &TranscodeOptions::default()) {
        Ok(outcome) => {
            if let ConversionOutcome::Converted { warnings, .. } = &outcome {
                report.converted_textures.push(outcome.path().to_path_buf());
                report.warnings.extend(warnings.iter().cloned());
            }
            Some(outcome.path().to_path_buf())
        }
        Err(e) => {
            tracing::warn!("Failed to convert {}: {}", path.display(), e);
            report.warnings.push(Warning::ResourceNotFound {
                name: path.display().to_string(),
            });
            None
        }
    }
}
