//! Per-session material deduplication.

use indexmap::IndexMap;
use indexmap::map::Entry;

use super::types::{MaterialDef, MaterialId};
use crate::formats::msh::Material;

/// Materials registered during one builder session, keyed by name.
///
/// The first definition of a name wins: later ones (including a different
/// texture) are aliased to it.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: IndexMap<String, MaterialDef>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for a material and texture pair, registering it on first use.
    /// `None` maps to the fallback material.
    pub fn resolve(&mut self, material: Option<&Material>, texture: Option<&str>) -> MaterialId {
        let def = match material {
            Some(m) => MaterialDef {
                name: m.name.clone(),
                diffuse: m.diffuse,
                emissive: m.emissive,
                texture: texture.filter(|t| !t.is_empty()).map(str::to_string),
            },
            None => MaterialDef {
                texture: texture.filter(|t| !t.is_empty()).map(str::to_string),
                ..MaterialDef::fallback()
            },
        };
        self.insert(def)
    }

    fn insert(&mut self, def: MaterialDef) -> MaterialId {
        match self.materials.entry(def.name.clone()) {
            Entry::Occupied(e) => {
                if e.get().texture != def.texture {
                    tracing::debug!(
                        "Material '{}' already defined; keeping texture {:?} over {:?}",
                        def.name,
                        e.get().texture,
                        def.texture
                    );
                }
                e.index()
            }
            Entry::Vacant(e) => {
                let id = e.index();
                e.insert(def);
                id
            }
        }
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.get_index(id).map(|(_, def)| def)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Registry size to return to with [`rollback`](Self::rollback).
    pub fn checkpoint(&self) -> usize {
        self.materials.len()
    }

    /// Forget materials registered after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        self.materials.truncate(checkpoint);
    }

    /// Materials in registration order; positions are their ids.
    pub fn to_vec(&self) -> Vec<MaterialDef> {
        self.materials.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.materials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::msh::fixtures::material;

    #[test]
    fn test_first_definition_wins() {
        let mut registry = MaterialRegistry::new();
        let a = registry.resolve(Some(&material("Steel")), Some("steel.tga"));
        let b = registry.resolve(Some(&material("Steel")), Some("rust.tga"));
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(a).unwrap().texture.as_deref(), Some("steel.tga"));
    }

    #[test]
    fn test_missing_material_is_default() {
        let mut registry = MaterialRegistry::new();
        let id = registry.resolve(None, None);
        let def = registry.get(id).unwrap();
        assert_eq!(def.name, "Default");
        assert_eq!(def.diffuse, [255, 255, 255, 255]);
        assert_eq!(registry.resolve(None, None), id);
    }

    #[test]
    fn test_rollback_drops_later_materials() {
        let mut registry = MaterialRegistry::new();
        registry.resolve(Some(&material("A")), None);
        let mark = registry.checkpoint();
        registry.resolve(Some(&material("B")), None);
        registry.rollback(mark);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve(Some(&material("C")), None), 1);
    }
}
