//! MSH chunk tags and the relative order they must appear in.

use crate::error::{Error, Result};
use crate::formats::binary::ChunkTag;

pub const MSH_MAGIC: [u8; 4] = *b"MSH ";
pub const MSH_VERSION: u32 = 1;

pub mod tags {
    use super::ChunkTag;

    pub const BLCK: ChunkTag = ChunkTag::new(b"BLCK");

    // Block level
    pub const BHDR: ChunkTag = ChunkTag::new(b"BHDR");
    pub const GVTX: ChunkTag = ChunkTag::new(b"GVTX");
    pub const GVGP: ChunkTag = ChunkTag::new(b"GVGP");
    pub const GIDX: ChunkTag = ChunkTag::new(b"GIDX");
    pub const GUVS: ChunkTag = ChunkTag::new(b"GUVS");
    pub const GNRM: ChunkTag = ChunkTag::new(b"GNRM");
    pub const GCLR: ChunkTag = ChunkTag::new(b"GCLR");
    pub const BUCK: ChunkTag = ChunkTag::new(b"BUCK");
    pub const MESH: ChunkTag = ChunkTag::new(b"MESH");
    pub const ANML: ChunkTag = ChunkTag::new(b"ANML");
    pub const SKIN: ChunkTag = ChunkTag::new(b"SKIN");

    // Mesh level
    pub const MHDR: ChunkTag = ChunkTag::new(b"MHDR");
    pub const VERT: ChunkTag = ChunkTag::new(b"VERT");
    pub const VGRP: ChunkTag = ChunkTag::new(b"VGRP");
    pub const INDX: ChunkTag = ChunkTag::new(b"INDX");
    pub const COLR: ChunkTag = ChunkTag::new(b"COLR");
    pub const MATL: ChunkTag = ChunkTag::new(b"MATL");
    pub const TEXT: ChunkTag = ChunkTag::new(b"TEXT");

    // Animation list level
    pub const ANIM: ChunkTag = ChunkTag::new(b"ANIM");
}

/// Known tags of a container, in the order they must appear.
/// The flag marks tags that may repeat.
pub type Layout = &'static [(ChunkTag, bool)];

pub const BLOCK_LAYOUT: Layout = &[
    (tags::BHDR, false),
    (tags::GVTX, false),
    (tags::GVGP, false),
    (tags::GIDX, false),
    (tags::GUVS, false),
    (tags::GNRM, false),
    (tags::GCLR, false),
    (tags::BUCK, false),
    (tags::MESH, false),
    (tags::ANML, true),
    (tags::SKIN, false),
];

pub const MESH_LAYOUT: Layout = &[
    (tags::MHDR, false),
    (tags::VERT, false),
    (tags::VGRP, false),
    (tags::INDX, false),
    (tags::COLR, false),
    (tags::MATL, false),
    (tags::TEXT, false),
    (tags::MESH, true),
];

pub const ANIMATION_LAYOUT: Layout = &[(tags::ANIM, true)];

/// Tracks the chunks seen inside one container and rejects
/// out-of-order or repeated ones. Unknown tags are not tracked.
pub struct ChunkOrder {
    container: ChunkTag,
    layout: Layout,
    last: Option<usize>,
    seen: Vec<bool>,
}

impl ChunkOrder {
    pub fn new(container: ChunkTag, layout: Layout) -> Self {
        Self {
            container,
            layout,
            last: None,
            seen: vec![false; layout.len()],
        }
    }

    /// `Ok(false)` for an unknown tag that should be skipped.
    pub fn admit(&mut self, tag: ChunkTag) -> Result<bool> {
        let Some(slot) = self.layout.iter().position(|(t, _)| *t == tag) else {
            return Ok(false);
        };
        if self.seen[slot] && !self.layout[slot].1 {
            return Err(Error::DuplicateChunk {
                container: self.container.to_string(),
                tag: tag.to_string(),
            });
        }
        if self.last.is_some_and(|last| slot < last) {
            return Err(Error::ChunkOutOfOrder {
                container: self.container.to_string(),
                tag: tag.to_string(),
            });
        }
        self.seen[slot] = true;
        self.last = Some(slot);
        Ok(true)
    }

    pub fn has_seen(&self, tag: ChunkTag) -> bool {
        self.layout
            .iter()
            .position(|(t, _)| *t == tag)
            .is_some_and(|slot| self.seen[slot])
    }

    /// Error for a required tag that never appeared.
    pub fn missing(&self, tag: ChunkTag) -> Error {
        Error::MissingChunk {
            container: self.container.to_string(),
            tag: tag.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_accepts_layout_order() {
        let mut order = ChunkOrder::new(tags::MESH, MESH_LAYOUT);
        assert!(order.admit(tags::MHDR).unwrap());
        assert!(order.admit(tags::VERT).unwrap());
        assert!(order.admit(tags::MESH).unwrap());
        assert!(order.admit(tags::MESH).unwrap());
    }

    #[test]
    fn test_order_rejects_backwards_and_duplicates() {
        let mut order = ChunkOrder::new(tags::MESH, MESH_LAYOUT);
        order.admit(tags::MHDR).unwrap();
        order.admit(tags::INDX).unwrap();
        assert!(matches!(order.admit(tags::VERT), Err(Error::ChunkOutOfOrder { .. })));
        assert!(matches!(order.admit(tags::INDX), Err(Error::DuplicateChunk { .. })));
    }

    #[test]
    fn test_unknown_tag_is_not_admitted() {
        let mut order = ChunkOrder::new(tags::BLCK, BLOCK_LAYOUT);
        assert!(!order.admit(ChunkTag::new(b"XTRA")).unwrap());
        assert!(!order.has_seen(ChunkTag::new(b"XTRA")));
    }
}
