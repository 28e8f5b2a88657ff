//! MSH file inspection utilities
//!
//! Summarizes an MSH file without building a scene.

#![allow(clippy::cast_possible_truncation)]

use std::path::Path;

use serde::Serialize;

use super::parser::parse_msh_bytes;
use super::types::{Block, Mesh};
use crate::error::Result;

/// Information about an MSH file.
#[derive(Debug, Clone, Serialize)]
pub struct MshInfo {
    pub version: u32,
    pub file_size: u64,
    pub blocks: Vec<BlockInfo>,
    /// Display text of each block failure.
    pub failed_blocks: Vec<String>,
}

/// Information about one Block.
#[derive(Debug, Clone, Serialize)]
pub struct BlockInfo {
    pub name: String,
    pub scale: f32,
    pub skinned: bool,
    pub move_anim: bool,
    pub has_global_geometry: bool,
    pub bucky_count: usize,
    pub meshes: Vec<MeshInfo>,
    pub animation_lists: Vec<AnimationListInfo>,
    pub skin_states: usize,
    pub skin_weights: usize,
}

/// Information about one Mesh, listed in pre-order.
#[derive(Debug, Clone, Serialize)]
pub struct MeshInfo {
    pub name: String,
    pub depth: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub vertex_groups: usize,
    pub materials: Vec<String>,
    pub textures: Vec<String>,
    pub state_index: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnimationListInfo {
    pub name: String,
    pub tracks: usize,
    pub keyframes: usize,
}

/// Get information about an MSH file.
///
/// # Errors
/// Returns an error if the file cannot be read or the container header is invalid.
pub fn inspect_msh<P: AsRef<Path>>(source: P) -> Result<MshInfo> {
    let data = std::fs::read(source.as_ref())?;
    let file_size = data.len() as u64;
    let msh = parse_msh_bytes(&data)?;

    Ok(MshInfo {
        version: msh.version,
        file_size,
        blocks: msh.blocks.iter().map(block_info).collect(),
        failed_blocks: msh.failed_blocks.iter().map(ToString::to_string).collect(),
    })
}

fn block_info(block: &Block) -> BlockInfo {
    let mut meshes = Vec::new();
    if let Some(root) = &block.root {
        collect_meshes(root, 0, &mut meshes);
    }

    BlockInfo {
        name: block.name.clone(),
        scale: block.header.scale,
        skinned: block.header.skinned,
        move_anim: block.header.move_anim,
        has_global_geometry: block.global.is_some(),
        bucky_count: block.bucky.len(),
        meshes,
        animation_lists: block
            .animations
            .iter()
            .map(|list| AnimationListInfo {
                name: list.name.clone(),
                tracks: list.animations.len(),
                keyframes: list.animations.iter().map(|a| a.states.len()).sum(),
            })
            .collect(),
        skin_states: block.skin.as_ref().map_or(0, |s| s.states.len()),
        skin_weights: block.skin.as_ref().map_or(0, |s| s.weights.len()),
    }
}

fn collect_meshes(mesh: &Mesh, depth: usize, out: &mut Vec<MeshInfo>) {
    out.push(MeshInfo {
        name: mesh.name.clone(),
        depth,
        vertices: mesh.vertices.len(),
        triangles: mesh.indices.len() / 3,
        vertex_groups: mesh.vert_groups.len(),
        materials: mesh.materials.iter().map(|m| m.name.clone()).collect(),
        textures: mesh.textures.clone(),
        state_index: mesh.state_index,
    });
    for child in &mesh.children {
        collect_meshes(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::msh::fixtures;
    use crate::formats::msh::write_msh;

    #[test]
    fn test_inspect_lists_meshes_in_preorder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tank.msh");
        write_msh(&[fixtures::hierarchy_block("tank")], &path).unwrap();

        let info = inspect_msh(&path).unwrap();
        assert_eq!(info.blocks.len(), 1);
        let names: Vec<_> = info.blocks[0].meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["hull", "turret", "barrel", "tracks"]);
        assert_eq!(info.blocks[0].meshes[2].depth, 2);
        assert!(info.failed_blocks.is_empty());
    }
}
