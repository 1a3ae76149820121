//! Command execution implementations

use super::Commands;
use super::{inspect, model, texture};
use crate::formats::LoadOptions;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self, options: &LoadOptions) -> anyhow::Result<()> {
        match self {
            Commands::Mesh { path, json } => inspect::meshes(path, options, *json),
            Commands::Material { path, json } => inspect::materials(path, *json),
            Commands::Pixelmap { path, json } => inspect::pixelmaps(path, options, *json),
            Commands::Actor { path, json } => inspect::actors(path, *json),
            Commands::Png {
                path,
                palette,
                output,
            } => texture::to_png(path, palette, output.as_deref(), options),
            Commands::Model {
                actor,
                meshes,
                materials,
                pixelmaps,
                json,
            } => model::load(
                &model::ModelFiles {
                    actor,
                    meshes,
                    materials,
                    pixelmaps,
                },
                options,
                *json,
            ),
        }
    }
}
