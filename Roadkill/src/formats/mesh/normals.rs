//! Per-vertex normals from face winding

use super::Mesh;
use glam::Vec3;

impl Mesh {
    /// Compute flat normals.
    ///
    /// Each face's normal is `(v1 - v2) x (v2 - v3)`, normalized, and is
    /// written to all three of its vertices. A vertex shared by several faces
    /// keeps the normal of the last face that touches it; there is no
    /// averaging. Degenerate faces write a zero normal. Faces whose indices
    /// fall outside the vertex list are skipped.
    pub fn calc_normals(&mut self) {
        self.normals = vec![Vec3::ZERO; self.vertices.len()];
        for face in &self.faces {
            let [i1, i2, i3] = face.indices().map(usize::from);
            let (Some(&a), Some(&b), Some(&c)) =
                (self.vertices.get(i1), self.vertices.get(i2), self.vertices.get(i3))
            else {
                continue;
            };
            let normal = (a - b).cross(b - c).normalize_or_zero();
            self.normals[i1] = normal;
            self.normals[i2] = normal;
            self.normals[i3] = normal;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Face;
    use super::*;

    fn face(v1: u16, v2: u16, v3: u16) -> Face {
        Face {
            v1,
            v2,
            v3,
            ..Face::default()
        }
    }

    #[test]
    fn test_single_triangle_faces_up() {
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: vec![face(0, 1, 2)],
            ..Mesh::default()
        };
        mesh.calc_normals();
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
        assert!(mesh.has_normals());
    }

    #[test]
    fn test_last_face_wins_on_shared_vertex() {
        // Two triangles sharing vertices 1 and 2, second one wound the other way.
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)],
            faces: vec![face(0, 1, 2), face(1, 2, 3)],
            ..Mesh::default()
        };
        mesh.calc_normals();
        assert_eq!(mesh.normals[0], Vec3::Z);
        assert_eq!(mesh.normals[1], Vec3::NEG_Z);
        assert_eq!(mesh.normals[2], Vec3::NEG_Z);
        assert_eq!(mesh.normals[3], Vec3::NEG_Z);
    }

    #[test]
    fn test_degenerate_face_gives_zero() {
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0],
            faces: vec![face(0, 1, 2)],
            ..Mesh::default()
        };
        mesh.calc_normals();
        assert_eq!(mesh.normals, vec![Vec3::ZERO; 3]);
    }

    #[test]
    fn test_untouched_vertex_keeps_zero() {
        let mut mesh = Mesh {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE],
            faces: vec![face(0, 1, 2)],
            ..Mesh::default()
        };
        mesh.calc_normals();
        assert_eq!(mesh.normals.len(), 4);
        assert_eq!(mesh.normals[3], Vec3::ZERO);
    }
}
