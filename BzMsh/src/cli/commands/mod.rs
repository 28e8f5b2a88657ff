use clap::Subcommand;
use std::str::FromStr;

use crate::scene::AnimationMode;

pub mod definitions;
pub mod execute;
pub mod msh;
pub mod texture;

pub use definitions::{MshCommands, TextureCommands};

/// Animation target mode accepted on the command line
#[derive(Debug, Clone, Copy)]
pub struct AnimationModeArg(pub AnimationMode);

impl FromStr for AnimationModeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(AnimationModeArg(AnimationMode::Auto)),
            "hierarchy" | "tree" => Ok(AnimationModeArg(AnimationMode::Hierarchy)),
            "object" | "state" => Ok(AnimationModeArg(AnimationMode::Object)),
            "armature" | "bone" => Ok(AnimationModeArg(AnimationMode::Armature)),
            _ => Err(format!(
                "Invalid animation mode '{s}'. Valid values: auto, hierarchy, object, armature"
            )),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// MSH model operations
    Msh {
        #[command(subcommand)]
        command: MshCommands,
    },

    /// Texture operations (DXTBZ2 to DDS conversion)
    Texture {
        #[command(subcommand)]
        command: TextureCommands,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_mode_arg() {
        assert_eq!("Hierarchy".parse::<AnimationModeArg>().unwrap().0, AnimationMode::Hierarchy);
        assert_eq!("bone".parse::<AnimationModeArg>().unwrap().0, AnimationMode::Armature);
        assert!("skeleton".parse::<AnimationModeArg>().is_err());
    }
}
