//! MSH record types.
//!
//! These mirror the on-disk records one to one. Anything derived from them
//! (offset indices, flattened attributes, deduplicated materials) lives in
//! the scene builder.

use serde::Serialize;

use crate::formats::binary::Readable;
use byteorder::{ByteOrder, LittleEndian};

/// Width of every fixed name field.
pub const NAME_LEN: usize = 32;

/// Block header flag bits.
pub mod block_flags {
    pub const INDEXED: u32 = 0x01;
    pub const MOVE_ANIM: u32 = 0x02;
    pub const OLD_PIPELINE: u32 = 0x04;
    pub const SINGLE_GEOMETRY: u32 = 0x08;
    pub const SKINNED: u32 = 0x10;
}

/// Decoded Block header flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BlockHeader {
    pub scale: f32,
    pub indexed: bool,
    pub move_anim: bool,
    pub old_pipeline: bool,
    pub single_geometry: bool,
    pub skinned: bool,
}

impl BlockHeader {
    pub fn from_raw(scale: f32, flags: u32) -> Self {
        Self {
            scale,
            indexed: flags & block_flags::INDEXED != 0,
            move_anim: flags & block_flags::MOVE_ANIM != 0,
            old_pipeline: flags & block_flags::OLD_PIPELINE != 0,
            single_geometry: flags & block_flags::SINGLE_GEOMETRY != 0,
            skinned: flags & block_flags::SKINNED != 0,
        }
    }

    pub fn to_raw(&self) -> u32 {
        let mut flags = 0;
        if self.indexed {
            flags |= block_flags::INDEXED;
        }
        if self.move_anim {
            flags |= block_flags::MOVE_ANIM;
        }
        if self.old_pipeline {
            flags |= block_flags::OLD_PIPELINE;
        }
        if self.single_geometry {
            flags |= block_flags::SINGLE_GEOMETRY;
        }
        if self.skinned {
            flags |= block_flags::SKINNED;
        }
        flags
    }

    /// Meshes of this block carry a usable state index.
    pub fn has_states(&self) -> bool {
        self.skinned || self.move_anim
    }
}

/// A parsed MSH file.
#[derive(Debug, Default, Serialize)]
pub struct MshFile {
    pub version: u32,
    pub blocks: Vec<Block>,
    /// Blocks that failed to parse, each an `Error::Block`.
    #[serde(skip)]
    pub failed_blocks: Vec<crate::error::Error>,
}

/// Top-level named unit of an MSH file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Block {
    pub name: String,
    pub header: BlockHeader,
    pub root: Option<Mesh>,
    pub global: Option<GlobalGeometry>,
    pub bucky: Vec<BuckyDesc>,
    pub animations: Vec<AnimationList>,
    pub skin: Option<SkinData>,
}

impl Block {
    /// Pre-order walk over the block's meshes.
    pub fn meshes(&self) -> Vec<&Mesh> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect_preorder(&mut out);
        }
        out
    }
}

/// Flat geometry used by global import mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GlobalGeometry {
    pub positions: Vec<[f32; 3]>,
    pub vert_groups: Vec<VertexGroup>,
    pub indices: Vec<u16>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub colors: Vec<[u8; 4]>,
}

/// One node of a Block's hierarchy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Mesh {
    pub name: String,
    /// Local transform as stored on disk (row-major).
    pub matrix: [f32; 16],
    pub render_flags: u32,
    pub state_index: Option<u32>,
    pub vertices: Vec<Vertex>,
    pub vert_groups: Vec<VertexGroup>,
    pub indices: Vec<u16>,
    pub colors: Vec<[u8; 4]>,
    pub materials: Vec<Material>,
    pub textures: Vec<String>,
    pub children: Vec<Mesh>,
}

impl Mesh {
    fn collect_preorder<'a>(&'a self, out: &mut Vec<&'a Mesh>) {
        out.push(self);
        for child in &self.children {
            child.collect_preorder(out);
        }
    }

    /// Material referenced by a vertex group, if any.
    pub fn group_material(&self, group: &VertexGroup) -> Option<&Material> {
        group.material.and_then(|i| self.materials.get(i as usize))
    }

    /// Texture referenced by a vertex group, if any.
    pub fn group_texture(&self, group: &VertexGroup) -> Option<&str> {
        group
            .texture
            .and_then(|i| self.textures.get(i as usize))
            .map(String::as_str)
    }
}

/// Position, normal and UV of one vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub norm: [f32; 3],
    pub uv: [f32; 2],
}

impl Readable for Vertex {
    const SIZE: usize = 32;

    fn decode(bytes: &[u8]) -> Self {
        let mut f = [0f32; 8];
        LittleEndian::read_f32_into(&bytes[..32], &mut f);
        Self {
            pos: [f[0], f[1], f[2]],
            norm: [f[3], f[4], f[5]],
            uv: [f[6], f[7]],
        }
    }
}

/// Contiguous range of a mesh sharing one material assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VertexGroup {
    pub vert_count: u32,
    pub index_count: u32,
    /// Bucky descriptor index in global geometry.
    pub flags: u32,
    pub material: Option<u32>,
    pub texture: Option<u32>,
}

/// Local-mode vertex group record: counts, flags and two references.
pub(crate) struct LocalGroupRecord(pub VertexGroup);

impl Readable for LocalGroupRecord {
    const SIZE: usize = 20;

    fn decode(bytes: &[u8]) -> Self {
        let reference = |v: i32| u32::try_from(v).ok();
        Self(VertexGroup {
            vert_count: LittleEndian::read_u32(&bytes[0..4]),
            index_count: LittleEndian::read_u32(&bytes[4..8]),
            flags: LittleEndian::read_u32(&bytes[8..12]),
            material: reference(LittleEndian::read_i32(&bytes[12..16])),
            texture: reference(LittleEndian::read_i32(&bytes[16..20])),
        })
    }
}

/// Global-mode vertex group record: counts and the bucky index.
pub(crate) struct GlobalGroupRecord(pub VertexGroup);

impl Readable for GlobalGroupRecord {
    const SIZE: usize = 12;

    fn decode(bytes: &[u8]) -> Self {
        Self(VertexGroup {
            vert_count: LittleEndian::read_u32(&bytes[0..4]),
            index_count: LittleEndian::read_u32(&bytes[4..8]),
            flags: LittleEndian::read_u32(&bytes[8..12]),
            material: None,
            texture: None,
        })
    }
}

/// Material definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Material {
    pub name: String,
    pub diffuse: [u8; 4],
    pub emissive: [u8; 4],
}

/// Material plus texture pair addressed by index in global mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuckyDesc {
    pub material: Material,
    pub texture: String,
}

/// Named collection of animation tracks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnimationList {
    pub name: String,
    pub animations: Vec<Anim>,
}

/// One animation track.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Anim {
    pub index: u32,
    /// Keys in file order; frames may be non-monotonic.
    pub states: Vec<Keyframe>,
}

/// Frame, translation and rotation quaternion `(s, x, y, z)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Keyframe {
    pub frame: u32,
    pub vect: [f32; 3],
    pub quat: [f32; 4],
}

impl Readable for Keyframe {
    const SIZE: usize = 32;

    fn decode(bytes: &[u8]) -> Self {
        let mut f = [0f32; 7];
        LittleEndian::read_f32_into(&bytes[4..32], &mut f);
        Self {
            frame: LittleEndian::read_u32(&bytes[0..4]),
            vect: [f[0], f[1], f[2]],
            quat: [f[3], f[4], f[5], f[6]],
        }
    }
}

/// Skin state matrices and per-vertex weights.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkinData {
    pub states: Vec<SkinState>,
    pub weights: Vec<BoneWeight>,
}

/// Pose state of one skin bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinState {
    pub parent: Option<u32>,
    /// Row-major, as stored on disk.
    pub matrix: [f32; 16],
}

impl Readable for SkinState {
    const SIZE: usize = 68;

    fn decode(bytes: &[u8]) -> Self {
        let mut matrix = [0f32; 16];
        LittleEndian::read_f32_into(&bytes[4..68], &mut matrix);
        Self {
            parent: u32::try_from(LittleEndian::read_i32(&bytes[0..4])).ok(),
            matrix,
        }
    }
}

/// Influence of one skin state on one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoneWeight {
    pub vertex: u32,
    pub state: u32,
    pub weight: f32,
}

impl Readable for BoneWeight {
    const SIZE: usize = 12;

    fn decode(bytes: &[u8]) -> Self {
        Self {
            vertex: LittleEndian::read_u32(&bytes[0..4]),
            state: LittleEndian::read_u32(&bytes[4..8]),
            weight: LittleEndian::read_f32(&bytes[8..12]),
        }
    }
}

/// Identity matrix in on-disk layout.
pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];
