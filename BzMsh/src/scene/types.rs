//! Scene graph types produced by [`SceneBuilder`](super::SceneBuilder).

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::Serialize;

use crate::error::{Error, Warning};
use crate::formats::msh::BoneWeight;

/// Index into [`Scene::nodes`].
pub type NodeId = usize;
/// Index into [`Scene::materials`].
pub type MaterialId = usize;

/// A built scene: node arena, deduplicated materials, armatures and
/// resolved animation tracks.
#[derive(Debug, Default, Serialize)]
pub struct Scene {
    /// Nodes in pre-order, Block by Block.
    pub nodes: Vec<SceneNode>,
    pub roots: Vec<NodeId>,
    pub materials: Vec<MaterialDef>,
    pub armatures: Vec<Armature>,
    pub animations: Vec<ResolvedAnimation>,
    pub warnings: Vec<Warning>,
    /// Blocks that failed to parse or build.
    #[serde(skip)]
    pub failed_blocks: Vec<Error>,
}

impl Scene {
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Nodes built from one Block.
    pub fn block_nodes(&self, block: usize) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(_, n)| n.block == block)
    }
}

/// One output object.
#[derive(Debug, Clone, Serialize)]
pub struct SceneNode {
    pub name: String,
    /// Position of the source Block in the file.
    pub block: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Local transform relative to the parent.
    pub transform: Mat4,
    pub state_index: Option<u32>,
    pub render_flags: u32,
    pub geometry: Option<MeshGeometry>,
}

/// Triangle geometry with per-corner attributes.
///
/// `uvs`, `normals` and `colors` are either empty or hold one entry per
/// triangle corner, in triangle order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<[u8; 4]>,
    pub face_ranges: Vec<FaceRange>,
}

impl MeshGeometry {
    /// Resolved indices as a flat triangle list.
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Contiguous run of triangles sharing one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaceRange {
    pub start: usize,
    pub count: usize,
    /// `None` when material import is disabled.
    pub material: Option<MaterialId>,
}

/// A deduplicated material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialDef {
    pub name: String,
    pub diffuse: [u8; 4],
    pub emissive: [u8; 4],
    pub texture: Option<String>,
}

impl MaterialDef {
    pub const DEFAULT_NAME: &'static str = "Default";

    /// Stand-in for groups without a material.
    pub fn fallback() -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            diffuse: [255, 255, 255, 255],
            emissive: [0, 0, 0, 255],
            texture: None,
        }
    }
}

/// Bones built from a skinned Block's state matrices.
#[derive(Debug, Clone, Serialize)]
pub struct Armature {
    pub name: String,
    pub block: usize,
    /// Mesh node the armature deforms, if the Block produced one.
    pub node: Option<NodeId>,
    pub bones: Vec<Bone>,
    pub weights: Vec<BoneWeight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    /// Bind transform relative to the parent bone.
    pub matrix: Mat4,
}

/// Resolved tracks of one animation list.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAnimation {
    pub name: String,
    pub block: usize,
    pub tracks: Vec<ResolvedTrack>,
}

/// A track bound to its target.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedTrack {
    /// `<target name>_<list name>`.
    pub action: String,
    pub target: AnimationTarget,
    /// File order, not sorted by frame.
    pub keyframes: Vec<ResolvedKeyframe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnimationTarget {
    Node(NodeId),
    Bone { armature: usize, bone: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedKeyframe {
    pub frame: u32,
    pub translation: Vec3,
    pub rotation: Quat,
}
