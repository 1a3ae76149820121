//! # Roadkill
//!
//! A pure-Rust decoder for the BRender-era resource files used by
//! Carmageddon: meshes, materials, pixelmaps and actor hierarchies.
//!
//! ## Supported Formats
//!
//! - **Meshes** (`.DAT`) - vertices, UVs, faces and per-face materials
//! - **Materials** (`.MAT`) - parameter block plus pixelmap and shade table names
//! - **Pixelmaps** (`.PIX`, `.PAL`) - indexed-color images and palettes
//! - **Actors** (`.ACT`) - scene graph with transforms and mesh references
//!
//! Every file starts with a 16-byte envelope followed by big-endian chunk
//! records. Two on-disk revisions exist; pick one with
//! [`LoadOptions`](formats::LoadOptions).
//!
//! ## Quick Start
//!
//! ### Reading a mesh file
//!
//! ```no_run
//! use roadkill::prelude::*;
//!
//! let meshes = read_mesh_file("EAGLE.DAT", &LoadOptions::default())?;
//! for mesh in &meshes {
//!     println!("{}: {} faces", mesh.name, mesh.faces.len());
//! }
//! # Ok::<(), roadkill::Error>(())
//! ```
//!
//! ### Building a model
//!
//! ```no_run
//! use roadkill::prelude::*;
//!
//! let mut model = Model::new(LoadOptions::default());
//! model.load_actor_file("EAGLE.ACT")?;
//! model.load_mesh_file("EAGLE.DAT")?;
//! model.load_material_file("EAGLE.MAT")?;
//! for missing in model.unresolved_references() {
//!     println!("missing {} {}", missing.kind, missing.name);
//! }
//! # Ok::<(), roadkill::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `roadkill` command-line binary

#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod error;
pub mod formats;
pub mod model;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, ResourceKind, Result, Stage};
    pub use crate::formats::common::{BinaryReader, FormatRevision, LoadOptions, open_resource};
    pub use crate::formats::resource::{FileHeader, FileKind, file_type, read_file_header};

    pub use crate::formats::actor::{Actor, ActorGraph, ActorReader, read_actor, read_actor_file};
    pub use crate::formats::material::{Material, MaterialReader, read_material, read_material_file};
    pub use crate::formats::mesh::{Face, Mesh, MeshReader, read_mesh, read_mesh_file};
    pub use crate::formats::pixelmap::{
        Pixelmap, PixelmapReader, read_pixelmap, read_pixelmap_file,
    };
    pub use crate::formats::writer::ResourceWriter;

    pub use crate::model::{Model, ModelStats, UnresolvedReference};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
