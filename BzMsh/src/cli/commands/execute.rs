//! Command execution implementations

use super::Commands;
use super::definitions::{MshCommands, TextureCommands};
use super::{msh, texture};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Msh { command } => command.execute(),
            Commands::Texture { command } => command.execute(),
        }
    }
}

impl MshCommands {
    /// Execute the selected MSH command.
    ///
    /// # Errors
    /// Returns an error if the model cannot be read or the output cannot be written.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            MshCommands::Inspect { path, json } => msh::inspect(path, *json),
            MshCommands::Scene {
                path,
                output,
                global,
                animation_mode,
                no_flip_uv,
                no_animations,
            } => msh::scene(
                path,
                output.as_deref(),
                *global,
                animation_mode.0,
                *no_flip_uv,
                *no_animations,
            ),
            MshCommands::Batch { dir, global, quiet } => msh::batch(dir, *global, *quiet),
        }
    }
}

impl TextureCommands {
    /// Execute the selected texture command.
    ///
    /// # Errors
    /// Returns an error if the texture operation fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            TextureCommands::Convert {
                source,
                output,
                single_mip,
                overwrite,
                quiet,
            } => texture::convert(source, output.as_deref(), *single_mip, *overwrite, *quiet),
            TextureCommands::Header { path } => texture::header(path),
            TextureCommands::Info { path } => texture::info(path),
        }
    }
}
