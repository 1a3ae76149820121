pub mod execute;
pub mod inspect;
pub mod model;
pub mod texture;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the meshes in a mesh (.DAT) file
    Mesh {
        /// Mesh file
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the materials in a material (.MAT) file
    Material {
        /// Material file
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the pixelmaps in a pixelmap (.PIX) file
    Pixelmap {
        /// Pixelmap file
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the actor hierarchy in an actor (.ACT) file
    Actor {
        /// Actor file
        path: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Convert pixelmaps to PNG through a palette
    Png {
        /// Pixelmap file
        path: PathBuf,

        /// Palette pixelmap file (e.g. DRRENDER.PAL)
        #[arg(short, long)]
        palette: PathBuf,

        /// Output directory (defaults to the pixelmap's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a full model and report references that do not resolve
    Model {
        /// Actor file
        #[arg(long)]
        actor: PathBuf,

        /// Mesh files
        #[arg(long, num_args = 1..)]
        meshes: Vec<PathBuf>,

        /// Material files
        #[arg(long, num_args = 1..)]
        materials: Vec<PathBuf>,

        /// Pixelmap files
        #[arg(long, num_args = 1..)]
        pixelmaps: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
