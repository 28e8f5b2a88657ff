//! Import configuration.

use serde::{Deserialize, Serialize};

/// How Blocks become output objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// One object per Mesh, keeping the hierarchy and local transforms.
    #[default]
    Local,
    /// One flat object per Block from its flat geometry and bucky descriptors.
    Global,
}

/// How animation track targets are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    /// Armature if any Block is skinned, otherwise object.
    #[default]
    Auto,
    /// Flat pre-order index over every built node of the file.
    Hierarchy,
    /// A node's state index within the owning Block.
    Object,
    /// A bone of the owning Block's armature (global mode only).
    Armature,
}

/// Options for building and importing a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub mode: ImportMode,
    pub animation_mode: AnimationMode,
    pub import_materials: bool,
    pub import_uvs: bool,
    pub import_normals: bool,
    pub import_colors: bool,
    pub import_animations: bool,
    /// Store UVs as `1 - v`.
    pub flip_uv_v: bool,
    /// Convert located `.dxtbz2` textures to a sibling `.dds` before use.
    pub auto_convert_dxtbz2: bool,
    /// Extensions tried, in order, when locating a texture.
    pub texture_extensions: Vec<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            mode: ImportMode::Local,
            animation_mode: AnimationMode::Auto,
            import_materials: true,
            import_uvs: true,
            import_normals: true,
            import_colors: true,
            import_animations: true,
            flip_uv_v: true,
            auto_convert_dxtbz2: true,
            texture_extensions: [".tga", ".pic", ".png", ".bmp", ".dds", ".dxtbz2"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: ImportOptions =
            serde_json::from_str(r#"{"mode": "global", "flip_uv_v": false}"#).unwrap();
        assert_eq!(options.mode, ImportMode::Global);
        assert!(!options.flip_uv_v);
        assert!(options.import_animations);
        assert_eq!(options.animation_mode, AnimationMode::Auto);
    }
}
