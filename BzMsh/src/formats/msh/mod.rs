//! MSH hierarchical mesh/animation format module
//!
//! A chunk-tagged little-endian container. Each top-level `BLCK` chunk holds
//! one Block: a header, an optional flat geometry set, a mesh hierarchy,
//! animation lists and skin data.

mod chunk;
mod inspect;
mod parser;
mod types;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

// Public API
pub use chunk::{MSH_MAGIC, MSH_VERSION, tags};
pub use inspect::{AnimationListInfo, BlockInfo, MeshInfo, MshInfo, inspect_msh};
pub use parser::{parse_msh_bytes, read_msh};
pub use types::{
    Anim, AnimationList, Block, BlockHeader, BoneWeight, BuckyDesc, GlobalGeometry, IDENTITY,
    Keyframe, Material, Mesh, MshFile, NAME_LEN, SkinData, SkinState, Vertex, VertexGroup,
    block_flags,
};
pub use writer::{serialize_msh, write_chunk, write_msh};

// Internal API (used by the scene builder)
pub(crate) use parser::validate_groups;
