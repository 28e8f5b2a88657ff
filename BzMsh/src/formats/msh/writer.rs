//! MSH container writing.
//!
//! Emits every known chunk in its canonical order, so anything written here
//! parses back into the same records.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use super::chunk::{MSH_MAGIC, MSH_VERSION, tags};
use super::types::{AnimationList, Block, GlobalGeometry, Material, Mesh, NAME_LEN, SkinData};
use crate::error::Result;
use crate::formats::binary::ChunkTag;

/// Write blocks to an MSH file on disk.
pub fn write_msh<P: AsRef<Path>>(blocks: &[Block], path: P) -> Result<()> {
    let bytes = serialize_msh(blocks)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize blocks to MSH bytes.
pub fn serialize_msh(blocks: &[Block]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    output.extend_from_slice(&MSH_MAGIC);
    output.write_u32::<LittleEndian>(MSH_VERSION)?;

    for block in blocks {
        nested(&mut output, tags::BLCK, |out| write_block(out, block))?;
    }
    Ok(output)
}

/// Append a chunk with an already-encoded payload.
pub fn write_chunk(out: &mut Vec<u8>, tag: ChunkTag, payload: &[u8]) -> Result<()> {
    out.extend_from_slice(&tag.0);
    out.write_u32::<LittleEndian>(payload.len() as u32)?;
    out.extend_from_slice(payload);
    Ok(())
}

/// Append a chunk whose payload is produced by `body`; the length is patched afterwards.
fn nested(
    out: &mut Vec<u8>,
    tag: ChunkTag,
    body: impl FnOnce(&mut Vec<u8>) -> Result<()>,
) -> Result<()> {
    out.extend_from_slice(&tag.0);
    let length_at = out.len();
    out.write_u32::<LittleEndian>(0)?;
    body(out)?;
    let length = (out.len() - length_at - 4) as u32;
    LittleEndian::write_u32(&mut out[length_at..length_at + 4], length);
    Ok(())
}

fn write_block(out: &mut Vec<u8>, block: &Block) -> Result<()> {
    nested(out, tags::BHDR, |out| {
        write_name(out, &block.name);
        out.write_f32::<LittleEndian>(block.header.scale)?;
        out.write_u32::<LittleEndian>(block.header.to_raw())?;
        Ok(())
    })?;

    if let Some(global) = &block.global {
        write_global(out, global)?;
    }
    if !block.bucky.is_empty() {
        nested(out, tags::BUCK, |out| {
            out.write_u32::<LittleEndian>(block.bucky.len() as u32)?;
            for desc in &block.bucky {
                write_material(out, &desc.material);
                write_name(out, &desc.texture);
            }
            Ok(())
        })?;
    }
    if let Some(root) = &block.root {
        nested(out, tags::MESH, |out| write_mesh(out, root))?;
    }
    for list in &block.animations {
        nested(out, tags::ANML, |out| write_animation_list(out, list))?;
    }
    if let Some(skin) = &block.skin {
        nested(out, tags::SKIN, |out| write_skin(out, skin))?;
    }
    Ok(())
}

fn write_global(out: &mut Vec<u8>, global: &GlobalGeometry) -> Result<()> {
    nested(out, tags::GVTX, |out| {
        out.write_u32::<LittleEndian>(global.positions.len() as u32)?;
        for p in &global.positions {
            write_f32s(out, p)?;
        }
        Ok(())
    })?;
    nested(out, tags::GVGP, |out| {
        out.write_u32::<LittleEndian>(global.vert_groups.len() as u32)?;
        for group in &global.vert_groups {
            out.write_u32::<LittleEndian>(group.vert_count)?;
            out.write_u32::<LittleEndian>(group.index_count)?;
            out.write_u32::<LittleEndian>(group.flags)?;
        }
        Ok(())
    })?;
    nested(out, tags::GIDX, |out| write_indices(out, &global.indices))?;
    if !global.uvs.is_empty() {
        nested(out, tags::GUVS, |out| {
            out.write_u32::<LittleEndian>(global.uvs.len() as u32)?;
            for uv in &global.uvs {
                write_f32s(out, uv)?;
            }
            Ok(())
        })?;
    }
    if !global.normals.is_empty() {
        nested(out, tags::GNRM, |out| {
            out.write_u32::<LittleEndian>(global.normals.len() as u32)?;
            for n in &global.normals {
                write_f32s(out, n)?;
            }
            Ok(())
        })?;
    }
    if !global.colors.is_empty() {
        nested(out, tags::GCLR, |out| write_colors(out, &global.colors))?;
    }
    Ok(())
}

fn write_mesh(out: &mut Vec<u8>, mesh: &Mesh) -> Result<()> {
    nested(out, tags::MHDR, |out| {
        write_name(out, &mesh.name);
        write_f32s(out, &mesh.matrix)?;
        out.write_u32::<LittleEndian>(mesh.render_flags)?;
        out.write_i32::<LittleEndian>(mesh.state_index.map_or(-1, |i| i as i32))?;
        Ok(())
    })?;

    if !mesh.vertices.is_empty() {
        nested(out, tags::VERT, |out| {
            out.write_u32::<LittleEndian>(mesh.vertices.len() as u32)?;
            for v in &mesh.vertices {
                write_f32s(out, &v.pos)?;
                write_f32s(out, &v.norm)?;
                write_f32s(out, &v.uv)?;
            }
            Ok(())
        })?;
    }
    if !mesh.vert_groups.is_empty() {
        nested(out, tags::VGRP, |out| {
            out.write_u32::<LittleEndian>(mesh.vert_groups.len() as u32)?;
            for group in &mesh.vert_groups {
                out.write_u32::<LittleEndian>(group.vert_count)?;
                out.write_u32::<LittleEndian>(group.index_count)?;
                out.write_u32::<LittleEndian>(group.flags)?;
                out.write_i32::<LittleEndian>(group.material.map_or(-1, |i| i as i32))?;
                out.write_i32::<LittleEndian>(group.texture.map_or(-1, |i| i as i32))?;
            }
            Ok(())
        })?;
    }
    if !mesh.indices.is_empty() {
        nested(out, tags::INDX, |out| write_indices(out, &mesh.indices))?;
    }
    if !mesh.colors.is_empty() {
        nested(out, tags::COLR, |out| write_colors(out, &mesh.colors))?;
    }
    if !mesh.materials.is_empty() {
        nested(out, tags::MATL, |out| {
            out.write_u32::<LittleEndian>(mesh.materials.len() as u32)?;
            for material in &mesh.materials {
                write_material(out, material);
            }
            Ok(())
        })?;
    }
    if !mesh.textures.is_empty() {
        nested(out, tags::TEXT, |out| {
            out.write_u32::<LittleEndian>(mesh.textures.len() as u32)?;
            for texture in &mesh.textures {
                write_name(out, texture);
            }
            Ok(())
        })?;
    }
    for child in &mesh.children {
        nested(out, tags::MESH, |out| write_mesh(out, child))?;
    }
    Ok(())
}

fn write_animation_list(out: &mut Vec<u8>, list: &AnimationList) -> Result<()> {
    write_name(out, &list.name);
    for anim in &list.animations {
        nested(out, tags::ANIM, |out| {
            out.write_u32::<LittleEndian>(anim.index)?;
            out.write_u32::<LittleEndian>(anim.states.len() as u32)?;
            for key in &anim.states {
                out.write_u32::<LittleEndian>(key.frame)?;
                write_f32s(out, &key.vect)?;
                write_f32s(out, &key.quat)?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_skin(out: &mut Vec<u8>, skin: &SkinData) -> Result<()> {
    out.write_u32::<LittleEndian>(skin.states.len() as u32)?;
    for state in &skin.states {
        out.write_i32::<LittleEndian>(state.parent.map_or(-1, |p| p as i32))?;
        write_f32s(out, &state.matrix)?;
    }
    out.write_u32::<LittleEndian>(skin.weights.len() as u32)?;
    for w in &skin.weights {
        out.write_u32::<LittleEndian>(w.vertex)?;
        out.write_u32::<LittleEndian>(w.state)?;
        out.write_f32::<LittleEndian>(w.weight)?;
    }
    Ok(())
}

fn write_material(out: &mut Vec<u8>, material: &Material) {
    write_name(out, &material.name);
    out.extend_from_slice(&material.diffuse);
    out.extend_from_slice(&material.emissive);
}

fn write_indices(out: &mut Vec<u8>, indices: &[u16]) -> Result<()> {
    out.write_u32::<LittleEndian>(indices.len() as u32)?;
    for &i in indices {
        out.write_u16::<LittleEndian>(i)?;
    }
    Ok(())
}

fn write_colors(out: &mut Vec<u8>, colors: &[[u8; 4]]) -> Result<()> {
    out.write_u32::<LittleEndian>(colors.len() as u32)?;
    for c in colors {
        out.extend_from_slice(c);
    }
    Ok(())
}

fn write_f32s(out: &mut Vec<u8>, values: &[f32]) -> Result<()> {
    for &v in values {
        out.write_f32::<LittleEndian>(v)?;
    }
    Ok(())
}

/// Fixed-width name field; longer names are cut to fit on a character boundary.
fn write_name(out: &mut Vec<u8>, name: &str) {
    let mut field = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let mut len = bytes.len().min(NAME_LEN);
    while !name.is_char_boundary(len) {
        len -= 1;
    }
    field[..len].copy_from_slice(&bytes[..len]);
    out.extend_from_slice(&field);
}
