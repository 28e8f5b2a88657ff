//! Scene graph building and import
//!
//! Turns parsed MSH records into a [`Scene`] and hands it to a host
//! application through the [`SceneSink`] and [`TextureLocator`] traits.

mod animation;
mod builder;
mod import;
mod material;
mod options;
mod sink;
mod types;

use std::path::Path;

use crate::error::Result;
use crate::formats::msh::read_msh;

pub use animation::AnimationResolver;
pub use builder::{SceneBuilder, matrix_from_disk, resolve_corners};
pub use import::{ImportReport, import_scene};
pub use material::MaterialRegistry;
pub use options::{AnimationMode, ImportMode, ImportOptions};
pub use sink::{DirectoryLocator, KeyframeTarget, SceneSink, TextureLocator};
pub use types::{
    AnimationTarget, Armature, Bone, FaceRange, MaterialDef, MaterialId, MeshGeometry, NodeId,
    ResolvedAnimation, ResolvedKeyframe, ResolvedTrack, Scene, SceneNode,
};

/// Read an MSH file and build its scene with a fresh material session.
///
/// # Errors
/// Returns an error if the file cannot be read or its container header is invalid.
/// Failed Blocks are reported in [`Scene::failed_blocks`].
pub fn load_scene<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Scene> {
    let msh = read_msh(path)?;
    SceneBuilder::new(options).build_file(msh)
}
