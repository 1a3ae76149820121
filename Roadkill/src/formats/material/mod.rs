//! Material (`.MAT`) records
//!
//! A material binds an opaque block of twelve parameters to the pixelmap
//! and shade table it draws with.

mod reader;

pub use reader::{MaterialReader, read_material, read_material_file};

use serde::Serialize;

/// Number of float parameters in a material description.
pub const MATERIAL_PARAM_COUNT: usize = 12;

/// A decoded material.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Material {
    pub name: String,
    /// Parameter block, not yet reverse-engineered.
    pub params: [f32; MATERIAL_PARAM_COUNT],
    /// Name of the referenced pixelmap, may be empty.
    pub pixelmap_name: String,
    /// Name of the referenced render (shade) table, may be empty.
    pub render_table_name: String,
}

impl Material {
    pub fn has_pixelmap(&self) -> bool {
        !self.pixelmap_name.is_empty()
    }
}
