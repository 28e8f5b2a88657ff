//! MSH container parsing.
//!
//! The file is a flat list of top-level chunks. Each `BLCK` chunk is parsed
//! on its own sub-reader, so a malformed block is recorded and skipped while
//! the blocks around it are kept.

use std::path::Path;

use super::chunk::{
    ANIMATION_LAYOUT, BLOCK_LAYOUT, ChunkOrder, MESH_LAYOUT, MSH_MAGIC, MSH_VERSION, tags,
};
use super::types::{
    Anim, AnimationList, Block, BlockHeader, BuckyDesc, GlobalGeometry, GlobalGroupRecord,
    Keyframe, LocalGroupRecord, Material, Mesh, NAME_LEN, SkinData, SkinState, BoneWeight,
    Vertex, VertexGroup,
};
use super::MshFile;
use crate::error::{Error, Result};
use crate::formats::binary::BinaryReader;

/// On-disk size of a material record.
const MATERIAL_RECORD_SIZE: usize = NAME_LEN + 8;

/// Read and parse an MSH file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or the container header is invalid.
/// Individual malformed blocks are reported in [`MshFile::failed_blocks`].
pub fn read_msh<P: AsRef<Path>>(path: P) -> Result<MshFile> {
    let data = std::fs::read(path.as_ref())?;
    tracing::debug!("Read {} bytes from {}", data.len(), path.as_ref().display());
    parse_msh_bytes(&data)
}

/// Parse MSH data from bytes.
///
/// # Errors
/// Returns an error if the magic or version is invalid.
pub fn parse_msh_bytes(data: &[u8]) -> Result<MshFile> {
    let mut reader = BinaryReader::new(data);

    let magic: [u8; 4] = reader.read_struct()?;
    if magic != MSH_MAGIC {
        return Err(Error::InvalidMshMagic(magic));
    }
    let version = reader.read_u32()?;
    if version != MSH_VERSION {
        return Err(Error::UnsupportedMshVersion { version });
    }

    let mut file = MshFile {
        version,
        ..MshFile::default()
    };
    let mut block_index = 0usize;

    while !reader.is_empty() {
        let chunk = match reader.read_chunk() {
            Ok(chunk) => chunk,
            Err(e) => {
                // The framing itself is broken; nothing after this point can be located
                tracing::warn!("Truncated top-level chunk after block {}: {}", block_index, e);
                file.failed_blocks.push(e.in_block(block_index, "<truncated>"));
                break;
            }
        };

        if chunk.tag != tags::BLCK {
            tracing::debug!(
                "Skipping top-level chunk {} at 0x{:x} ({} bytes)",
                chunk.tag,
                chunk.offset,
                chunk.reader.remaining()
            );
            continue;
        }

        let mut name = String::new();
        let mut block_reader = chunk.reader;
        match parse_block(&mut block_reader, &mut name) {
            Ok(block) => {
                tracing::debug!(
                    "Parsed block {} '{}' ({} meshes, {} animation lists)",
                    block_index,
                    block.name,
                    block.meshes().len(),
                    block.animations.len()
                );
                file.blocks.push(block);
            }
            Err(e) => {
                let name = if name.is_empty() { "<unnamed>".to_string() } else { name };
                tracing::warn!("Failed to parse block {} '{}': {}", block_index, name, e);
                file.failed_blocks.push(e.in_block(block_index, name));
            }
        }
        block_index += 1;
    }

    tracing::info!(
        "Parsed MSH v{}: {} blocks, {} failed",
        file.version,
        file.blocks.len(),
        file.failed_blocks.len()
    );
    Ok(file)
}

/// Parse one `BLCK` payload. `name` is filled in as soon as the header is read
/// so the caller can name the block in error reports.
fn parse_block(reader: &mut BinaryReader<'_>, name: &mut String) -> Result<Block> {
    let mut order = ChunkOrder::new(tags::BLCK, BLOCK_LAYOUT);
    let mut block = Block::default();

    while !reader.is_empty() {
        let mut chunk = reader.read_chunk()?;
        if !order.admit(chunk.tag)? {
            tracing::debug!("Skipping unknown block chunk {} at 0x{:x}", chunk.tag, chunk.offset);
            continue;
        }
        if chunk.tag != tags::BHDR && !order.has_seen(tags::BHDR) {
            return Err(order.missing(tags::BHDR));
        }

        let r = &mut chunk.reader;
        match chunk.tag {
            tags::BHDR => {
                block.name = r.read_cstring(NAME_LEN)?;
                let scale = r.read_f32()?;
                let flags = r.read_u32()?;
                block.header = BlockHeader::from_raw(scale, flags);
                name.clone_from(&block.name);
            }
            tags::GVTX => global(&mut block).positions = r.read_counted()?,
            tags::GVGP => {
                global(&mut block).vert_groups = r
                    .read_counted::<GlobalGroupRecord>()?
                    .into_iter()
                    .map(|g| g.0)
                    .collect();
            }
            tags::GIDX => global(&mut block).indices = r.read_counted()?,
            tags::GUVS => global(&mut block).uvs = r.read_counted()?,
            tags::GNRM => global(&mut block).normals = r.read_counted()?,
            tags::GCLR => global(&mut block).colors = r.read_counted()?,
            tags::BUCK => {
                block.bucky = read_records(r, MATERIAL_RECORD_SIZE + NAME_LEN, |r| {
                    Ok(BuckyDesc {
                        material: read_material(r)?,
                        texture: r.read_cstring(NAME_LEN)?,
                    })
                })?;
            }
            tags::MESH => block.root = Some(parse_mesh(r, block.header.has_states())?),
            tags::ANML => block.animations.push(parse_animation_list(r)?),
            tags::SKIN => block.skin = Some(parse_skin(r)?),
            _ => {}
        }
    }

    if !order.has_seen(tags::BHDR) {
        return Err(order.missing(tags::BHDR));
    }
    if block.header.skinned && block.skin.is_none() {
        return Err(order.missing(tags::SKIN));
    }
    if !block.header.skinned && block.root.is_none() {
        return Err(order.missing(tags::MESH));
    }
    if let Some(global) = &block.global {
        validate_global(global, block.bucky.len())?;
    }

    Ok(block)
}

fn global(block: &mut Block) -> &mut GlobalGeometry {
    block.global.get_or_insert_with(GlobalGeometry::default)
}

fn parse_mesh(reader: &mut BinaryReader<'_>, has_states: bool) -> Result<Mesh> {
    let mut order = ChunkOrder::new(tags::MESH, MESH_LAYOUT);
    let mut mesh = Mesh::default();

    while !reader.is_empty() {
        let mut chunk = reader.read_chunk()?;
        if !order.admit(chunk.tag)? {
            tracing::debug!("Skipping unknown mesh chunk {} at 0x{:x}", chunk.tag, chunk.offset);
            continue;
        }
        if chunk.tag != tags::MHDR && !order.has_seen(tags::MHDR) {
            return Err(order.missing(tags::MHDR));
        }

        let r = &mut chunk.reader;
        match chunk.tag {
            tags::MHDR => {
                mesh.name = r.read_cstring(NAME_LEN)?;
                mesh.matrix = r.read_struct()?;
                mesh.render_flags = r.read_u32()?;
                let state_index = r.read_i32()?;
                // Only skinned or move-animated blocks give the index a meaning
                mesh.state_index = if has_states {
                    u32::try_from(state_index).ok()
                } else {
                    None
                };
            }
            tags::VERT => mesh.vertices = r.read_counted::<Vertex>()?,
            tags::VGRP => {
                mesh.vert_groups = r
                    .read_counted::<LocalGroupRecord>()?
                    .into_iter()
                    .map(|g| g.0)
                    .collect();
            }
            tags::INDX => mesh.indices = r.read_counted()?,
            tags::COLR => mesh.colors = r.read_counted()?,
            tags::MATL => mesh.materials = read_records(r, MATERIAL_RECORD_SIZE, read_material)?,
            tags::TEXT => mesh.textures = read_records(r, NAME_LEN, |r| r.read_cstring(NAME_LEN))?,
            tags::MESH => mesh.children.push(parse_mesh(r, has_states)?),
            _ => {}
        }
    }

    if !order.has_seen(tags::MHDR) {
        return Err(order.missing(tags::MHDR));
    }
    validate_mesh(&mesh)?;
    Ok(mesh)
}

fn parse_animation_list(reader: &mut BinaryReader<'_>) -> Result<AnimationList> {
    let mut list = AnimationList {
        name: reader.read_cstring(NAME_LEN)?,
        animations: Vec::new(),
    };
    let mut order = ChunkOrder::new(tags::ANML, ANIMATION_LAYOUT);

    while !reader.is_empty() {
        let mut chunk = reader.read_chunk()?;
        if !order.admit(chunk.tag)? {
            tracing::debug!("Skipping unknown animation chunk {} at 0x{:x}", chunk.tag, chunk.offset);
            continue;
        }
        let index = chunk.reader.read_u32()?;
        let states = chunk.reader.read_counted::<Keyframe>()?;
        list.animations.push(Anim { index, states });
    }

    Ok(list)
}

fn parse_skin(reader: &mut BinaryReader<'_>) -> Result<SkinData> {
    let states = reader.read_counted::<SkinState>()?;
    let weights = reader.read_counted::<BoneWeight>()?;

    for state in &states {
        if let Some(parent) = state.parent {
            check_reference("skin parent", parent, states.len())?;
        }
    }
    for weight in &weights {
        check_reference("skin state", weight.state, states.len())?;
    }

    Ok(SkinData { states, weights })
}

fn read_material(reader: &mut BinaryReader<'_>) -> Result<Material> {
    Ok(Material {
        name: reader.read_cstring(NAME_LEN)?,
        diffuse: reader.read_struct()?,
        emissive: reader.read_struct()?,
    })
}

/// Read a `u32` count followed by variable records. The count is checked
/// against the bytes left before anything is read.
fn read_records<'a, T>(
    reader: &mut BinaryReader<'a>,
    record_size: usize,
    mut read: impl FnMut(&mut BinaryReader<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = reader.read_u32()? as usize;
    let needed = count.saturating_mul(record_size);
    if needed > reader.remaining() {
        return Err(Error::TruncatedData {
            offset: reader.absolute_position(),
            needed,
            available: reader.remaining(),
        });
    }
    (0..count).map(|_| read(reader)).collect()
}

/// Check that vertex groups tile the vertex and index buffers exactly.
pub(crate) fn validate_groups(
    groups: &[VertexGroup],
    vertex_count: usize,
    index_count: usize,
) -> Result<()> {
    for (i, group) in groups.iter().enumerate() {
        if group.index_count % 3 != 0 {
            return Err(Error::IndexCountNotTriangles {
                group: i,
                count: group.index_count,
            });
        }
    }

    let group_vertices: usize = groups.iter().map(|g| g.vert_count as usize).sum();
    if group_vertices != vertex_count {
        return Err(Error::GroupCountMismatch {
            what: "vertices",
            expected: group_vertices,
            actual: vertex_count,
        });
    }
    let group_indices: usize = groups.iter().map(|g| g.index_count as usize).sum();
    if group_indices != index_count {
        return Err(Error::GroupCountMismatch {
            what: "indices",
            expected: group_indices,
            actual: index_count,
        });
    }
    Ok(())
}

fn validate_mesh(mesh: &Mesh) -> Result<()> {
    if !mesh.vert_groups.is_empty() || !mesh.indices.is_empty() {
        validate_groups(&mesh.vert_groups, mesh.vertices.len(), mesh.indices.len())?;
    }
    check_attribute("color", mesh.colors.len(), mesh.vertices.len())?;

    for group in &mesh.vert_groups {
        if let Some(material) = group.material {
            check_reference("material", material, mesh.materials.len())?;
        }
        if let Some(texture) = group.texture {
            check_reference("texture", texture, mesh.textures.len())?;
        }
    }
    Ok(())
}

fn validate_global(global: &GlobalGeometry, bucky_count: usize) -> Result<()> {
    if !global.vert_groups.is_empty() || !global.indices.is_empty() {
        validate_groups(&global.vert_groups, global.positions.len(), global.indices.len())?;
    }
    check_attribute("uv", global.uvs.len(), global.positions.len())?;
    check_attribute("normal", global.normals.len(), global.positions.len())?;
    check_attribute("color", global.colors.len(), global.positions.len())?;

    if bucky_count > 0 {
        for group in &global.vert_groups {
            check_reference("bucky descriptor", group.flags, bucky_count)?;
        }
    }
    Ok(())
}

/// Optional per-vertex arrays are either absent or one entry per vertex.
fn check_attribute(what: &'static str, count: usize, vertex_count: usize) -> Result<()> {
    if count != 0 && count != vertex_count {
        return Err(Error::AttributeCountMismatch {
            what,
            expected: vertex_count,
            actual: count,
        });
    }
    Ok(())
}

fn check_reference(what: &'static str, index: u32, available: usize) -> Result<()> {
    if index as usize >= available {
        return Err(Error::InvalidReference {
            what,
            index: i64::from(index),
            available,
        });
    }
    Ok(())
}
