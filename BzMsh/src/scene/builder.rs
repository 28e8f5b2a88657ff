//! Scene graph construction from parsed MSH records
//!
//! Local mode walks each Block's mesh hierarchy depth-first and emits one
//! node per Mesh. Global mode emits one node per Block from its flat
//! geometry. Both resolve group-local indices to buffer indices and expand
//! per-vertex attributes to per-corner sequences in triangle order.

use glam::{Mat4, Vec2, Vec3};

use super::animation::AnimationResolver;
use super::material::MaterialRegistry;
use super::options::{ImportMode, ImportOptions};
use super::types::{Armature, Bone, FaceRange, MeshGeometry, NodeId, Scene, SceneNode};
use crate::error::{Error, Result};
use crate::formats::msh::{
    Block, GlobalGeometry, Material, Mesh, MshFile, SkinData, VertexGroup, validate_groups,
};

/// Convert an on-disk row-major matrix to glam's column-major `Mat4`.
pub fn matrix_from_disk(m: &[f32; 16]) -> Mat4 {
    // Rows on disk are glam columns: the translation row becomes the last column
    Mat4::from_cols_array(m)
}

/// Builds [`Scene`]s. Materials are deduplicated across every Block the
/// builder sees until [`reset`](Self::reset) is called.
pub struct SceneBuilder {
    options: ImportOptions,
    materials: MaterialRegistry,
}

impl SceneBuilder {
    pub fn new(options: &ImportOptions) -> Self {
        Self {
            options: options.clone(),
            materials: MaterialRegistry::new(),
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Start a new material session.
    pub fn reset(&mut self) {
        self.materials.clear();
    }

    /// Build a scene from a parsed file, taking over its parse failures.
    pub fn build_file(&mut self, mut msh: MshFile) -> Result<Scene> {
        let parse_failures = std::mem::take(&mut msh.failed_blocks);
        let mut scene = self.build(&msh)?;
        scene.failed_blocks.splice(0..0, parse_failures);
        Ok(scene)
    }

    /// Build a scene. A Block that fails is recorded in
    /// [`Scene::failed_blocks`] and leaves no nodes or materials behind.
    pub fn build(&mut self, msh: &MshFile) -> Result<Scene> {
        let mut scene = Scene::default();
        let mut built = Vec::with_capacity(msh.blocks.len());

        for (index, block) in msh.blocks.iter().enumerate() {
            let checkpoint = self.materials.checkpoint();
            let base = scene.nodes.len();

            let nodes = match self.build_block(block, index, base) {
                Ok(nodes) => nodes,
                Err(e) => {
                    self.materials.rollback(checkpoint);
                    tracing::warn!("Failed to build block {} '{}': {}", index, block.name, e);
                    scene.failed_blocks.push(e.in_block(index, block.name.clone()));
                    continue;
                }
            };

            tracing::debug!("Block {} '{}': {} nodes", index, block.name, nodes.len());
            let root = (!nodes.is_empty()).then_some(base);
            if let Some(root) = root {
                scene.roots.push(root);
            }
            scene.nodes.extend(nodes);

            if self.options.mode == ImportMode::Global && block.header.skinned {
                if let Some(skin) = &block.skin {
                    scene.armatures.push(build_armature(block, index, skin, root));
                }
            }
            built.push(index);
        }

        scene.materials = self.materials.to_vec();

        if self.options.import_animations {
            let resolver = AnimationResolver::new(
                &scene.nodes,
                &scene.armatures,
                self.options.animation_mode,
                &msh.blocks,
            );
            let mut warnings = Vec::new();
            let mut animations = Vec::new();
            for &index in &built {
                animations.extend(resolver.resolve_block(index, &msh.blocks[index], &mut warnings));
            }
            scene.animations = animations;
            scene.warnings.extend(warnings);
        }

        tracing::info!(
            "Built scene: {} nodes, {} materials, {} animations, {} failed blocks",
            scene.nodes.len(),
            scene.materials.len(),
            scene.animations.len(),
            scene.failed_blocks.len()
        );
        Ok(scene)
    }

    fn build_block(&mut self, block: &Block, index: usize, base: NodeId) -> Result<Vec<SceneNode>> {
        if self.options.mode == ImportMode::Global {
            if let Some(global) = &block.global {
                let geometry = self.global_geometry(block, global)?;
                return Ok(vec![SceneNode {
                    name: block.name.clone(),
                    block: index,
                    parent: None,
                    children: Vec::new(),
                    transform: Mat4::IDENTITY,
                    state_index: None,
                    render_flags: 0,
                    geometry: Some(geometry),
                }]);
            }
            tracing::debug!("Block '{}' has no flat geometry; walking its hierarchy", block.name);
        }

        let mut nodes = Vec::new();
        if let Some(root) = &block.root {
            self.walk(root, None, index, base, &mut nodes)?;
        }
        Ok(nodes)
    }

    fn walk(
        &mut self,
        mesh: &Mesh,
        parent: Option<NodeId>,
        block: usize,
        base: NodeId,
        nodes: &mut Vec<SceneNode>,
    ) -> Result<NodeId> {
        let id = base + nodes.len();
        let geometry = self.local_geometry(mesh)?;
        nodes.push(SceneNode {
            name: mesh.name.clone(),
            block,
            parent,
            children: Vec::new(),
            transform: matrix_from_disk(&mesh.matrix),
            state_index: mesh.state_index,
            render_flags: mesh.render_flags,
            geometry,
        });

        for child in &mesh.children {
            let child_id = self.walk(child, Some(id), block, base, nodes)?;
            nodes[id - base].children.push(child_id);
        }
        Ok(id)
    }

    fn local_geometry(&mut self, mesh: &Mesh) -> Result<Option<MeshGeometry>> {
        if mesh.vertices.is_empty() && mesh.vert_groups.is_empty() {
            return Ok(None);
        }
        let vertex_count = mesh.vertices.len();
        let corners = resolve_corners(&mesh.name, &mesh.vert_groups, &mesh.indices, vertex_count)?;

        let uvs = if self.options.import_uvs {
            corners
                .iter()
                .map(|&c| self.uv(mesh.vertices[c as usize].uv))
                .collect()
        } else {
            Vec::new()
        };
        let normals = if self.options.import_normals {
            corners
                .iter()
                .map(|&c| Vec3::from_array(mesh.vertices[c as usize].norm))
                .collect()
        } else {
            Vec::new()
        };
        let colors = if self.options.import_colors {
            per_corner("color", &mesh.colors, &corners, vertex_count)?
        } else {
            Vec::new()
        };

        let mut face_ranges = Vec::with_capacity(mesh.vert_groups.len());
        let mut start = 0;
        for group in &mesh.vert_groups {
            let count = (group.index_count / 3) as usize;
            let material = self.options.import_materials.then(|| {
                self.materials
                    .resolve(mesh.group_material(group), mesh.group_texture(group))
            });
            face_ranges.push(FaceRange { start, count, material });
            start += count;
        }

        Ok(Some(MeshGeometry {
            positions: mesh.vertices.iter().map(|v| Vec3::from_array(v.pos)).collect(),
            triangles: triangles(&corners),
            uvs,
            normals,
            colors,
            face_ranges,
        }))
    }

    fn global_geometry(&mut self, block: &Block, global: &GlobalGeometry) -> Result<MeshGeometry> {
        let vertex_count = global.positions.len();
        let corners = resolve_corners(&block.name, &global.vert_groups, &global.indices, vertex_count)?;

        let uvs = if self.options.import_uvs {
            per_corner("uv", &global.uvs, &corners, vertex_count)?
                .into_iter()
                .map(|uv| self.uv(uv))
                .collect()
        } else {
            Vec::new()
        };
        let normals = if self.options.import_normals {
            per_corner("normal", &global.normals, &corners, vertex_count)?
                .into_iter()
                .map(Vec3::from_array)
                .collect()
        } else {
            Vec::new()
        };
        let colors = if self.options.import_colors {
            per_corner("color", &global.colors, &corners, vertex_count)?
        } else {
            Vec::new()
        };

        let mut face_ranges = Vec::with_capacity(global.vert_groups.len());
        let mut start = 0;
        for group in &global.vert_groups {
            let count = (group.index_count / 3) as usize;
            let material = if self.options.import_materials {
                let (material, texture) = bucky_material(block, group)?;
                Some(self.materials.resolve(material, texture))
            } else {
                None
            };
            face_ranges.push(FaceRange { start, count, material });
            start += count;
        }

        Ok(MeshGeometry {
            positions: global.positions.iter().copied().map(Vec3::from_array).collect(),
            triangles: triangles(&corners),
            uvs,
            normals,
            colors,
            face_ranges,
        })
    }

    fn uv(&self, uv: [f32; 2]) -> Vec2 {
        if self.options.flip_uv_v {
            Vec2::new(uv[0], 1.0 - uv[1])
        } else {
            Vec2::from_array(uv)
        }
    }
}

/// Material and texture of a global-mode group, looked up through its bucky index.
fn bucky_material<'a>(
    block: &'a Block,
    group: &VertexGroup,
) -> Result<(Option<&'a Material>, Option<&'a str>)> {
    if block.bucky.is_empty() {
        return Ok((None, None));
    }
    let desc = block
        .bucky
        .get(group.flags as usize)
        .ok_or(Error::InvalidReference {
            what: "bucky descriptor",
            index: i64::from(group.flags),
            available: block.bucky.len(),
        })?;
    Ok((Some(&desc.material), Some(desc.texture.as_str())))
}

/// Resolve group-local indices to vertex buffer indices.
///
/// Each group's indices are offset by the vertex counts of the groups before
/// it. Every resolved index must address an existing vertex.
pub fn resolve_corners(
    name: &str,
    groups: &[VertexGroup],
    indices: &[u16],
    vertex_count: usize,
) -> Result<Vec<u32>> {
    if groups.is_empty() && indices.is_empty() {
        return Ok(Vec::new());
    }
    validate_groups(groups, vertex_count, indices.len())?;

    let mut corners = Vec::with_capacity(indices.len());
    let mut vert_start = 0u32;
    let mut index_start = 0usize;
    for group in groups {
        let index_end = index_start + group.index_count as usize;
        for &local in &indices[index_start..index_end] {
            let index = vert_start + u32::from(local);
            if index as usize >= vertex_count {
                return Err(Error::IndexOutOfRange {
                    mesh: name.to_string(),
                    index,
                    vertex_count,
                });
            }
            corners.push(index);
        }
        vert_start += group.vert_count;
        index_start = index_end;
    }
    Ok(corners)
}

fn triangles(corners: &[u32]) -> Vec<[u32; 3]> {
    corners.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect()
}

/// Per-vertex values expanded to triangle corners. An empty array stays empty.
fn per_corner<T: Copy>(
    what: &'static str,
    values: &[T],
    corners: &[u32],
    vertex_count: usize,
) -> Result<Vec<T>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    if values.len() != vertex_count {
        return Err(Error::AttributeCountMismatch {
            what,
            expected: vertex_count,
            actual: values.len(),
        });
    }
    Ok(corners.iter().map(|&c| values[c as usize]).collect())
}

fn build_armature(block: &Block, index: usize, skin: &SkinData, node: Option<NodeId>) -> Armature {
    Armature {
        name: format!("{}_armature", block.name),
        block: index,
        node,
        bones: skin
            .states
            .iter()
            .enumerate()
            .map(|(i, state)| Bone {
                name: format!("state_{i}"),
                parent: state.parent.map(|p| p as usize),
                matrix: matrix_from_disk(&state.matrix),
            })
            .collect(),
        weights: skin.weights.clone(),
    }
}
