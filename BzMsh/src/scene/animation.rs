//! Animation track resolution.
//!
//! Track targets are plain indices whose meaning depends on the animation
//! mode. Tracks whose target matches nothing are skipped with a warning.

use glam::{Quat, Vec3};

use super::options::AnimationMode;
use super::types::{
    AnimationTarget, Armature, ResolvedAnimation, ResolvedKeyframe, ResolvedTrack, SceneNode,
};
use crate::error::Warning;
use crate::formats::msh::{Block, Keyframe};

/// The concrete lookup used for track targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Hierarchy,
    Object,
    Armature,
}

/// Binds animation tracks to built nodes or armature bones.
pub struct AnimationResolver<'a> {
    nodes: &'a [SceneNode],
    armatures: &'a [Armature],
    strategy: Strategy,
}

impl<'a> AnimationResolver<'a> {
    /// `blocks` is only consulted to settle [`AnimationMode::Auto`].
    pub fn new(
        nodes: &'a [SceneNode],
        armatures: &'a [Armature],
        mode: AnimationMode,
        blocks: &[Block],
    ) -> Self {
        let strategy = match mode {
            AnimationMode::Hierarchy => Strategy::Hierarchy,
            AnimationMode::Object => Strategy::Object,
            AnimationMode::Armature => Strategy::Armature,
            AnimationMode::Auto if blocks.iter().any(|b| b.header.skinned) => Strategy::Armature,
            AnimationMode::Auto => Strategy::Object,
        };
        tracing::debug!("Resolving animation targets with {:?} strategy", strategy);
        Self {
            nodes,
            armatures,
            strategy,
        }
    }

    /// Resolve every animation list of one Block.
    pub fn resolve_block(
        &self,
        block_index: usize,
        block: &Block,
        warnings: &mut Vec<Warning>,
    ) -> Vec<ResolvedAnimation> {
        block
            .animations
            .iter()
            .map(|list| {
                let mut tracks = Vec::with_capacity(list.animations.len());
                for (track, anim) in list.animations.iter().enumerate() {
                    let Some((target, target_name)) = self.target(block_index, anim.index) else {
                        tracing::warn!(
                            "Animation '{}' track {}: no target for index {}",
                            list.name,
                            track,
                            anim.index
                        );
                        warnings.push(Warning::UnresolvedReference {
                            list: list.name.clone(),
                            track,
                            target: anim.index,
                        });
                        continue;
                    };
                    tracks.push(ResolvedTrack {
                        action: format!("{target_name}_{}", list.name),
                        target,
                        keyframes: anim.states.iter().map(keyframe).collect(),
                    });
                }
                ResolvedAnimation {
                    name: list.name.clone(),
                    block: block_index,
                    tracks,
                }
            })
            .collect()
    }

    fn target(&self, block: usize, index: u32) -> Option<(AnimationTarget, &'a str)> {
        match self.strategy {
            Strategy::Hierarchy => {
                let id = index as usize;
                let node = self.nodes.get(id)?;
                Some((AnimationTarget::Node(id), node.name.as_str()))
            }
            Strategy::Object => self
                .nodes
                .iter()
                .enumerate()
                .find(|(_, n)| n.block == block && n.state_index == Some(index))
                .map(|(id, n)| (AnimationTarget::Node(id), n.name.as_str())),
            Strategy::Armature => {
                // Armatures only exist for skinned Blocks built in global mode
                let (armature, owner) = self
                    .armatures
                    .iter()
                    .enumerate()
                    .find(|(_, a)| a.block == block)?;
                let bone = owner.bones.get(index as usize)?;
                Some((
                    AnimationTarget::Bone {
                        armature,
                        bone: index as usize,
                    },
                    bone.name.as_str(),
                ))
            }
        }
    }
}

/// Keys keep their stored frame numbers; the quaternion is stored scalar first.
fn keyframe(key: &Keyframe) -> ResolvedKeyframe {
    let [s, x, y, z] = key.quat;
    ResolvedKeyframe {
        frame: key.frame,
        translation: Vec3::from_array(key.vect),
        rotation: Quat::from_xyzw(x, y, z, s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::msh::{MshFile, fixtures};
    use crate::scene::{ImportMode, ImportOptions, SceneBuilder, Scene};
    use pretty_assertions::assert_eq;

    fn build(blocks: Vec<Block>, options: &ImportOptions) -> Scene {
        let msh = MshFile {
            version: 1,
            blocks,
            failed_blocks: Vec::new(),
        };
        SceneBuilder::new(options).build(&msh).unwrap()
    }

    fn with_mode(animation_mode: AnimationMode) -> ImportOptions {
        ImportOptions {
            animation_mode,
            ..ImportOptions::default()
        }
    }

    #[test]
    fn test_object_mode_skips_unmatched_track_only() {
        let scene = build(vec![fixtures::hierarchy_block("tank")], &with_mode(AnimationMode::Object));

        let fire = &scene.animations[0];
        let targets: Vec<_> = fire.tracks.iter().map(|t| t.target).collect();
        assert_eq!(targets, vec![AnimationTarget::Node(2), AnimationTarget::Node(1)]);
        assert_eq!(fire.tracks[0].action, "barrel_fire");
        assert_eq!(
            scene.warnings,
            vec![Warning::UnresolvedReference {
                list: "fire".to_string(),
                track: 1,
                target: 99,
            }]
        );
    }

    #[test]
    fn test_keyframes_keep_file_order() {
        let scene = build(vec![fixtures::hierarchy_block("tank")], &with_mode(AnimationMode::Object));
        let frames: Vec<u32> = scene.animations[0].tracks[0].keyframes.iter().map(|k| k.frame).collect();
        assert_eq!(frames, vec![10, 5, 20]);

        let key = scene.animations[0].tracks[0].keyframes[1];
        assert_eq!(key.translation, Vec3::new(-0.5, 0.0, 0.0));
        assert_eq!(key.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_object_mode_stays_inside_block() {
        // Both blocks use state indices 0..4; the second block's tracks bind to its own nodes
        let scene = build(
            vec![fixtures::hierarchy_block("a"), fixtures::hierarchy_block("b")],
            &with_mode(AnimationMode::Object),
        );
        let second = &scene.animations[1];
        assert_eq!(second.block, 1);
        assert_eq!(second.tracks[0].target, AnimationTarget::Node(6));
    }

    #[test]
    fn test_hierarchy_mode_uses_preorder_across_blocks() {
        let mut first = fixtures::hierarchy_block("a");
        first.animations.clear();
        let mut second = fixtures::hierarchy_block("b");
        second.animations[0].animations[1].index = 7;

        let scene = build(vec![first, second], &with_mode(AnimationMode::Hierarchy));
        let targets: Vec<_> = scene.animations[0].tracks.iter().map(|t| t.target).collect();
        // 2 is the first block's barrel, 7 the second block's tracks
        assert_eq!(
            targets,
            vec![AnimationTarget::Node(2), AnimationTarget::Node(7), AnimationTarget::Node(1)]
        );
        assert_eq!(scene.animations[0].tracks[1].action, "tracks_fire");
        assert!(scene.warnings.is_empty());
    }

    #[test]
    fn test_auto_without_skin_is_object_mode() {
        let scene = build(vec![fixtures::hierarchy_block("tank")], &ImportOptions::default());
        assert_eq!(scene.animations[0].tracks.len(), 2);
    }

    #[test]
    fn test_armature_mode_needs_global_import() {
        let local = build(vec![fixtures::skinned_block("rig")], &with_mode(AnimationMode::Armature));
        assert!(local.armatures.is_empty());
        assert!(local.animations[0].tracks.is_empty());
        assert_eq!(local.warnings.len(), 2);

        let global = build(
            vec![fixtures::skinned_block("rig")],
            &ImportOptions {
                mode: ImportMode::Global,
                animation_mode: AnimationMode::Armature,
                ..ImportOptions::default()
            },
        );
        assert_eq!(global.animations[0].tracks.len(), 1);
    }
}
