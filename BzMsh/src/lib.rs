//! # BzMsh
//!
//! A pure-Rust library for reading MSH hierarchical mesh/animation files and
//! converting their DXTBZ2 textures to DDS.
//!
//! ## Supported Formats
//!
//! - **MSH** - Block-structured meshes with vertex groups, materials,
//!   keyframe animation lists and skin weights
//! - **DXTBZ2** - Block-compressed textures, repackaged as DX10 DDS files
//!
//! ## Quick Start
//!
//! ### Loading a Model
//!
//! ```no_run
//! use bzmsh::scene::{ImportOptions, load_scene};
//!
//! let scene = load_scene("tank.msh", &ImportOptions::default())?;
//! println!("{} nodes, {} materials", scene.nodes.len(), scene.materials.len());
//! for failure in &scene.failed_blocks {
//!     eprintln!("{failure}");
//! }
//! # Ok::<(), bzmsh::Error>(())
//! ```
//!
//! ### Converting a Texture
//!
//! ```no_run
//! use bzmsh::formats::dxtbz2::{TranscodeOptions, convert_dxtbz2_to_dds};
//!
//! let outcome = convert_dxtbz2_to_dds("tank.dxtbz2", None, &TranscodeOptions::default())?;
//! println!("DDS at {}", outcome.path().display());
//! # Ok::<(), bzmsh::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use bzmsh::prelude::*;
//!
//! let options = ImportOptions {
//!     mode: ImportMode::Global,
//!     ..ImportOptions::default()
//! };
//! assert!(options.import_materials);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `bzmsh` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod scene;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use error::{Error, Result, Warning};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result, Warning};
    pub use crate::formats::binary::{BinaryReader, ChunkTag, Readable};
    pub use crate::formats::msh::{Block, MshFile, inspect_msh, read_msh, write_msh};
    pub use crate::formats::dxtbz2::{
        ConversionOutcome, Dxtbz2Header, TranscodeOptions, convert_dxtbz2_to_dds,
        transcode_dxtbz2,
    };

    // Scene building and import
    pub use crate::scene::{
        AnimationMode, DirectoryLocator, ImportMode, ImportOptions, ImportReport, Scene,
        SceneBuilder, SceneSink, TextureLocator, import_scene, load_scene,
    };

    // Batch operations
    pub use crate::batch::{
        BatchConvertResult, BatchLoadResult, convert_textures_batch, find_files,
        load_models_batch,
    };
}

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
