//! Resource file formats
//!
//! All formats share a 16-byte envelope ([`resource`]) followed by records
//! built from big-endian chunks ([`chunk`]).

pub mod actor;
pub mod chunk;
pub mod common;
pub mod material;
pub mod mesh;
pub mod pixelmap;
pub mod resource;
pub mod writer;

pub use common::{BinaryReader, FormatRevision, LoadOptions, open_resource};
pub use resource::{FileHeader, FileKind, file_type, read_file_header};

pub use actor::{Actor, ActorGraph, read_actor_file};
pub use material::{Material, read_material_file};
pub use mesh::{Face, Mesh, read_mesh_file};
pub use pixelmap::{Pixelmap, read_pixelmap_file};
pub use writer::ResourceWriter;
