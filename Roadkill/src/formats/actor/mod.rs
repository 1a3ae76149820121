//! Actor (`.ACT`) records
//!
//! An actor file describes a scene graph. Each actor names the mesh and
//! material it draws with and carries a transform relative to its parent.
//!
//! Actor records are a stack program: chunks push actors, transforms and
//! bounds, and attach chunks pop them into the actor below.

mod reader;

pub use reader::{ActorReader, read_actor, read_actor_file};

use glam::{Mat4, Vec3, Vec4};
use indexmap::IndexMap;
use serde::Serialize;

/// A scene graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub visible: bool,
    /// Second header byte. Meaning unknown.
    pub flags: u8,
    /// Rotation and scale part of the local transform.
    pub transform: Mat4,
    pub translation: Vec3,
    pub mesh_name: Option<String>,
    pub material_name: Option<String>,
    /// Local bounding box as `(min, max)`.
    pub bounds: Option<(Vec3, Vec3)>,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            flags: 0,
            transform: Mat4::IDENTITY,
            translation: Vec3::ZERO,
            mesh_name: None,
            material_name: None,
            bounds: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

impl Actor {
    /// Set the transform from a 3x4 matrix: three basis vectors then a translation.
    pub fn set_matrix34(&mut self, m: &[f32; 12]) {
        self.transform = Mat4::from_cols(
            Vec4::new(m[0], m[1], m[2], 0.0),
            Vec4::new(m[3], m[4], m[5], 0.0),
            Vec4::new(m[6], m[7], m[8], 0.0),
            Vec4::W,
        );
        self.translation = Vec3::new(m[9], m[10], m[11]);
    }

    /// Inverse of [`Actor::set_matrix34`].
    pub fn matrix34(&self) -> [f32; 12] {
        let [x, y, z, _] = self.transform.to_cols_array_2d();
        [
            x[0],
            x[1],
            x[2],
            y[0],
            y[1],
            y[2],
            z[0],
            z[1],
            z[2],
            self.translation.x,
            self.translation.y,
            self.translation.z,
        ]
    }

    /// Full local matrix including translation.
    pub fn local_matrix(&self) -> Mat4 {
        let mut m = self.transform;
        m.w_axis = self.translation.extend(1.0);
        m
    }

    pub fn info(&self) -> ActorInfo {
        ActorInfo {
            name: self.name.clone(),
            visible: self.visible,
            mesh: self.mesh_name.clone(),
            material: self.material_name.clone(),
            translation: self.translation.to_array(),
            parent: self.parent.clone(),
            children: self.children.clone(),
        }
    }
}

/// Decoded actor hierarchy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorGraph {
    /// Names of actors without a parent, in file order.
    pub roots: Vec<String>,
    /// Every actor by name, in file order.
    pub actors: IndexMap<String, Actor>,
}

impl ActorGraph {
    pub fn get(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// World matrix of an actor, composed through its parents.
    pub fn world_matrix(&self, name: &str) -> Option<Mat4> {
        let mut actor = self.actors.get(name)?;
        let mut matrix = actor.local_matrix();
        // Bounded walk; merged graphs can alias names into a cycle.
        for _ in 0..self.actors.len() {
            let Some(parent) = actor.parent.as_deref().and_then(|p| self.actors.get(p)) else {
                break;
            };
            matrix = parent.local_matrix() * matrix;
            actor = parent;
        }
        Some(matrix)
    }

    /// Append another graph. Names already present keep their first actor.
    pub fn merge(&mut self, other: ActorGraph) {
        for (_, actor) in other.actors {
            self.insert_first(actor);
        }
        self.relink();
    }

    /// Add an actor unless the name is taken; links are left for [`ActorGraph::relink`].
    pub(crate) fn insert_first(&mut self, actor: Actor) -> bool {
        if self.actors.contains_key(&actor.name) {
            tracing::warn!("Duplicate actor {}, keeping first", actor.name);
            return false;
        }
        self.actors.insert(actor.name.clone(), actor);
        true
    }

    /// Rebuild `roots` and every `children` list from the parent links.
    ///
    /// A dropped duplicate leaves no trace: only actors present in the map are
    /// listed, each exactly once, under the actor its parent name resolves to.
    pub(crate) fn relink(&mut self) {
        let mut children: IndexMap<String, Vec<String>> = IndexMap::new();
        self.roots.clear();
        for actor in self.actors.values() {
            match actor.parent.as_deref().filter(|p| self.actors.contains_key(*p)) {
                Some(parent) => children
                    .entry(parent.to_string())
                    .or_default()
                    .push(actor.name.clone()),
                None => self.roots.push(actor.name.clone()),
            }
        }
        for actor in self.actors.values_mut() {
            actor.children = children.swap_remove(&actor.name).unwrap_or_default();
        }
    }
}

/// Actor summary.
#[derive(Debug, Clone, Serialize)]
pub struct ActorInfo {
    pub name: String,
    pub visible: bool,
    pub mesh: Option<String>,
    pub material: Option<String>,
    pub translation: [f32; 3],
    pub parent: Option<String>,
    pub children: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix34_layout() {
        let m = [2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0, 1.0, -2.0, 5.0];
        let mut actor = Actor::default();
        actor.set_matrix34(&m);
        assert_eq!(actor.translation, Vec3::new(1.0, -2.0, 5.0));
        assert_eq!(actor.transform.transform_vector3(Vec3::ONE), Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(actor.matrix34(), m);
        assert_eq!(
            actor.local_matrix().transform_point3(Vec3::ZERO),
            Vec3::new(1.0, -2.0, 5.0)
        );
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = ActorGraph::default();
        let mut root = Actor {
            name: "CAR".to_string(),
            children: vec!["WHEEL".to_string()],
            ..Actor::default()
        };
        root.translation = Vec3::new(10.0, 0.0, 0.0);
        let mut wheel = Actor {
            name: "WHEEL".to_string(),
            parent: Some("CAR".to_string()),
            ..Actor::default()
        };
        wheel.translation = Vec3::new(0.0, 1.0, 0.0);
        graph.roots.push("CAR".to_string());
        graph.actors.insert("CAR".to_string(), root);
        graph.actors.insert("WHEEL".to_string(), wheel);

        let world = graph.world_matrix("WHEEL").unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(10.0, 1.0, 0.0));
        assert!(graph.world_matrix("TRAILER").is_none());
    }

    fn named(name: &str, parent: Option<&str>) -> Actor {
        Actor {
            name: name.to_string(),
            parent: parent.map(ToString::to_string),
            ..Actor::default()
        }
    }

    #[test]
    fn test_merge_drops_duplicate_links() {
        let mut first = ActorGraph::default();
        first.insert_first(named("CAR", None));
        first.insert_first(named("WHEEL", Some("CAR")));
        first.relink();

        // A second CAR root, plus a WHEEL listed again under it.
        let mut second = ActorGraph::default();
        second.insert_first(named("CAR", None));
        second.insert_first(named("WHEEL", Some("CAR")));
        second.insert_first(named("TRAILER", None));
        second.relink();

        first.merge(second);
        assert_eq!(first.roots, vec!["CAR", "TRAILER"]);
        assert_eq!(first.get("CAR").unwrap().children, vec!["WHEEL"]);
        assert_eq!(first.len(), 3);
    }
}
