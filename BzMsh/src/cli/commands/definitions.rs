//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

use super::AnimationModeArg;

/// MSH model commands
#[derive(Subcommand)]
pub enum MshCommands {
    /// Show the Block and mesh structure of an MSH file
    Inspect {
        /// MSH file
        path: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build the scene graph of an MSH file and write it as JSON
    Scene {
        /// MSH file
        path: PathBuf,

        /// Output JSON file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the Block-wide flat geometry instead of per-mesh geometry
        #[arg(long)]
        global: bool,

        /// How animation track targets are matched (auto, hierarchy, object, armature)
        #[arg(short, long, default_value = "auto")]
        animation_mode: AnimationModeArg,

        /// Keep texture V coordinates as stored
        #[arg(long)]
        no_flip_uv: bool,

        /// Skip animation lists
        #[arg(long)]
        no_animations: bool,
    },

    /// Load every MSH file under a directory and report failures
    Batch {
        /// Directory to search (recursively)
        dir: PathBuf,

        /// Use the Block-wide flat geometry instead of per-mesh geometry
        #[arg(long)]
        global: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Texture commands
#[derive(Subcommand)]
pub enum TextureCommands {
    /// Convert DXTBZ2 file(s) to DDS
    Convert {
        /// DXTBZ2 file(s) or directories to search recursively
        #[arg(required = true)]
        source: Vec<PathBuf>,

        /// Output directory (defaults to next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only write the largest mip level
        #[arg(long)]
        single_mip: bool,

        /// Replace existing DDS files
        #[arg(long)]
        overwrite: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the header of a DXTBZ2 file
    Header {
        /// DXTBZ2 file
        path: PathBuf,
    },

    /// Show info about a DDS file
    Info {
        /// DDS file
        path: PathBuf,
    },
}
