//! Collaborator traits for handing a built scene to a host application,
//! and a directory-based texture locator.

use std::path::{Path, PathBuf};

use glam::Mat4;
use walkdir::WalkDir;

use super::types::{Armature, MaterialDef, MeshGeometry, ResolvedKeyframe};
use crate::error::{Error, Result};

/// What a keyframe is applied to.
#[derive(Debug)]
pub enum KeyframeTarget<'a, H> {
    Object(&'a H),
    Bone { armature: &'a H, bone: &'a str },
}

// Only references inside, so copyable whatever the handle type is
impl<H> Clone for KeyframeTarget<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for KeyframeTarget<'_, H> {}

/// Receives scene objects from [`import_scene`](super::import_scene).
///
/// Handles are opaque to this crate; the sink decides what they are.
pub trait SceneSink {
    type Handle: Clone;

    /// Create an object. `geometry` is `None` for transform-only nodes.
    fn create_mesh_object(&mut self, name: &str, geometry: Option<&MeshGeometry>) -> Result<Self::Handle>;

    /// Create a material. `texture` is the located image file, if any.
    fn create_material(&mut self, material: &MaterialDef, texture: Option<&Path>) -> Result<Self::Handle>;

    fn assign_material(
        &mut self,
        mesh: &Self::Handle,
        material: &Self::Handle,
        face_start: usize,
        face_count: usize,
    ) -> Result<()>;

    /// Place `child` under `parent` (or at the root) with a local transform.
    fn set_parent_transform(
        &mut self,
        child: &Self::Handle,
        parent: Option<&Self::Handle>,
        local: &Mat4,
    ) -> Result<()>;

    fn create_armature(&mut self, armature: &Armature, mesh: Option<&Self::Handle>) -> Result<Self::Handle>;

    fn create_keyframe(
        &mut self,
        target: KeyframeTarget<'_, Self::Handle>,
        action: &str,
        key: &ResolvedKeyframe,
    ) -> Result<()>;
}

/// Finds texture files by base name.
pub trait TextureLocator {
    /// Path of the first file named `base_name` plus one of `extensions`
    /// (tried in order).
    ///
    /// # Errors
    /// Returns [`Error::ResourceNotFound`] if no candidate exists.
    fn locate(&self, base_name: &str, extensions: &[String]) -> Result<PathBuf>;
}

/// Searches a list of directories, optionally recursively.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLocator {
    pub roots: Vec<PathBuf>,
    pub recursive: bool,
}

impl DirectoryLocator {
    pub fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self { roots, recursive }
    }

    /// The MSH file's own directory, then its `bitmaps` subdirectory.
    pub fn for_model<P: AsRef<Path>>(model: P) -> Self {
        let dir = model
            .as_ref()
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            roots: vec![dir.clone(), dir.join("bitmaps")],
            recursive: false,
        }
    }
}

impl TextureLocator for DirectoryLocator {
    fn locate(&self, base_name: &str, extensions: &[String]) -> Result<PathBuf> {
        for ext in extensions {
            let file_name = format!("{base_name}{ext}");
            for root in &self.roots {
                let max_depth = if self.recursive { usize::MAX } else { 1 };
                let found = WalkDir::new(root)
                    .max_depth(max_depth)
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                    .find(|e| {
                        e.file_type().is_file()
                            && e.file_name().to_string_lossy().eq_ignore_ascii_case(&file_name)
                    });
                if let Some(entry) = found {
                    return Ok(entry.into_path());
                }
            }
        }
        Err(Error::ResourceNotFound {
            name: base_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_model_dir_searched_before_bitmaps() {
        let dir = tempfile::tempdir().unwrap();
        let bitmaps = dir.path().join("bitmaps");
        std::fs::create_dir(&bitmaps).unwrap();
        std::fs::write(dir.path().join("rock.tga"), b"x").unwrap();
        std::fs::write(bitmaps.join("rock.tga"), b"x").unwrap();

        let locator = DirectoryLocator::for_model(dir.path().join("rock.msh"));
        let found = locator.locate("rock", &exts(&[".tga"])).unwrap();
        assert_eq!(found, dir.path().join("rock.tga"));
    }

    #[test]
    fn test_extension_order_wins_over_root_order() {
        let dir = tempfile::tempdir().unwrap();
        let bitmaps = dir.path().join("bitmaps");
        std::fs::create_dir(&bitmaps).unwrap();
        std::fs::write(dir.path().join("rock.dds"), b"x").unwrap();
        std::fs::write(bitmaps.join("rock.tga"), b"x").unwrap();

        let locator = DirectoryLocator::for_model(dir.path().join("rock.msh"));
        let found = locator.locate("rock", &exts(&[".tga", ".dds"])).unwrap();
        assert_eq!(found, bitmaps.join("rock.tga"));
    }

    #[test]
    fn test_recursive_search() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("leaf.png"), b"x").unwrap();

        let flat = DirectoryLocator::new(vec![dir.path().to_path_buf()], false);
        assert!(matches!(
            flat.locate("leaf", &exts(&[".png"])),
            Err(Error::ResourceNotFound { .. })
        ));

        let deep = DirectoryLocator::new(vec![dir.path().to_path_buf()], true);
        assert_eq!(deep.locate("leaf", &exts(&[".png"])).unwrap(), nested.join("leaf.png"));
    }
}
