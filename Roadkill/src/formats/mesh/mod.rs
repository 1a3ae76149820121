//! Mesh (`.DAT`) records
//!
//! A mesh file holds one or more concatenated mesh records, each a fixed
//! sequence of chunks: file name, vertices, UVs, faces, material names and
//! the face-to-material index list.

mod normals;
mod reader;

pub use reader::{MeshReader, read_mesh, read_mesh_file};

use glam::{Vec2, Vec3};
use serde::Serialize;

/// Size of an on-disk vertex record.
pub const VERTEX_SIZE: u64 = 12;
/// Size of an on-disk UV record.
pub const UV_SIZE: u64 = 8;
/// Size of an on-disk face record.
pub const FACE_SIZE: u64 = 9;

/// A triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Face {
    /// Vertex indices in winding order.
    pub v1: u16,
    pub v2: u16,
    pub v3: u16,
    /// Usually a single bit set. Meaning unknown.
    pub flags: u16,
    pub unknown: u8,
    /// 1-based index into the mesh's material names, 0 for none.
    pub material_id: u16,
}

impl Face {
    pub fn indices(&self) -> [u16; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// A decoded mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    /// Filled by [`Mesh::calc_normals`]; empty straight out of the decoder.
    pub normals: Vec<Vec3>,
    /// Parallel to `vertices`.
    pub uvs: Vec<Vec2>,
    pub faces: Vec<Face>,
    pub material_names: Vec<String>,
}

impl Mesh {
    /// Material name used by a face, `None` for material id 0.
    pub fn material_name(&self, face: &Face) -> Option<&str> {
        let index = usize::from(face.material_id).checked_sub(1)?;
        self.material_names.get(index).map(String::as_str)
    }

    /// UVs with V flipped for a bottom-left texture origin.
    pub fn uv_for_gl(&self) -> Vec<Vec2> {
        self.uvs.iter().map(|uv| Vec2::new(uv.x, 1.0 - uv.y)).collect()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.vertices.len()
    }

    /// Summary for display.
    pub fn info(&self) -> MeshInfo {
        let (min, max) = self.bounds();
        MeshInfo {
            name: self.name.clone(),
            vertex_count: self.vertices.len(),
            uv_count: self.uvs.len(),
            face_count: self.faces.len(),
            materials: self.material_names.clone(),
            bounds_min: min.to_array(),
            bounds_max: max.to_array(),
        }
    }

    /// Axis-aligned bounds of the vertices, zero for an empty mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.vertices.is_empty() {
            return (Vec3::ZERO, Vec3::ZERO);
        }
        self.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), v| (lo.min(*v), hi.max(*v)),
        )
    }
}

/// Mesh summary.
#[derive(Debug, Clone, Serialize)]
pub struct MeshInfo {
    pub name: String,
    pub vertex_count: usize,
    pub uv_count: usize,
    pub face_count: usize,
    pub materials: Vec<String>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Mesh {
        Mesh {
            name: "BOX".to_string(),
            vertices: vec![Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, -4.0, 0.5)],
            uvs: vec![Vec2::new(0.25, 0.0), Vec2::new(1.0, 0.75)],
            material_names: vec!["RED.MAT".to_string(), "BLUE.MAT".to_string()],
            ..Mesh::default()
        }
    }

    #[test]
    fn test_material_lookup_is_one_based() {
        let mesh = mesh();
        let mut face = Face::default();
        assert_eq!(mesh.material_name(&face), None);
        face.material_id = 1;
        assert_eq!(mesh.material_name(&face), Some("RED.MAT"));
        face.material_id = 2;
        assert_eq!(mesh.material_name(&face), Some("BLUE.MAT"));
        face.material_id = 3;
        assert_eq!(mesh.material_name(&face), None);
    }

    #[test]
    fn test_uv_for_gl_flips_v() {
        let uvs = mesh().uv_for_gl();
        assert_eq!(uvs, vec![Vec2::new(0.25, 1.0), Vec2::new(1.0, 0.25)]);
    }

    #[test]
    fn test_info_bounds() {
        let info = mesh().info();
        assert_eq!(info.vertex_count, 2);
        assert_eq!(info.bounds_min, [-1.0, -4.0, 0.5]);
        assert_eq!(info.bounds_max, [3.0, 0.0, 2.0]);
    }
}
