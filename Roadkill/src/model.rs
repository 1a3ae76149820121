//! In-memory scene model
//!
//! A [`Model`] gathers actors, meshes, materials and pixelmaps loaded from
//! separate files. References between them are plain names and are only
//! resolved on lookup, since files usually load in an order that leaves
//! references dangling for a while.

use crate::error::{Error, ResourceKind, Result};
use crate::formats::actor::{Actor, ActorGraph, read_actor_file};
use crate::formats::common::LoadOptions;
use crate::formats::material::{Material, read_material_file};
use crate::formats::mesh::{Face, Mesh, read_mesh_file};
use crate::formats::pixelmap::{Pixelmap, read_pixelmap_file};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// A name that does not resolve within the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Kind of the resource holding the reference.
    pub owner_kind: ResourceKind,
    pub owner: String,
    /// Kind of the missing resource.
    pub kind: ResourceKind,
    pub name: String,
}

/// Counts of loaded resources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelStats {
    pub actors: usize,
    pub roots: usize,
    pub meshes: usize,
    pub materials: usize,
    pub pixelmaps: usize,
}

/// Scene graph plus the resources it draws with.
#[derive(Debug, Clone, Default)]
pub struct Model {
    options: LoadOptions,
    actors: ActorGraph,
    meshes: IndexMap<String, Mesh>,
    materials: IndexMap<String, Material>,
    pixelmaps: IndexMap<String, Pixelmap>,
}

impl Model {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    // ==================== Loading ====================

    /// Load an actor file and add its actors.
    pub fn load_actor_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let graph = read_actor_file(path)?;
        Ok(self.add_actors(graph))
    }

    /// Load a mesh file. A mesh whose name is already present is skipped.
    pub fn load_mesh_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let meshes = read_mesh_file(path, &self.options)?;
        let mut added = 0;
        for mesh in meshes {
            if self.add_mesh(mesh) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Load a material file. Later definitions replace earlier ones.
    pub fn load_material_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let materials = read_material_file(path)?;
        let count = materials.len();
        for material in materials {
            self.add_material(material);
        }
        Ok(count)
    }

    /// Load a pixelmap file. Later definitions replace earlier ones.
    pub fn load_pixelmap_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let pixelmaps = read_pixelmap_file(path, self.options.revision)?;
        let count = pixelmaps.len();
        for pixelmap in pixelmaps {
            self.add_pixelmap(pixelmap);
        }
        Ok(count)
    }

    /// Add a decoded actor graph, returning how many actors were new.
    pub fn add_actors(&mut self, graph: ActorGraph) -> usize {
        let before = self.actors.len();
        self.actors.merge(graph);
        self.actors.len() - before
    }

    /// Add a mesh unless one with the same name exists. Returns whether it was added.
    pub fn add_mesh(&mut self, mesh: Mesh) -> bool {
        if self.meshes.contains_key(&mesh.name) {
            tracing::warn!("Mesh {} already loaded, skipping", mesh.name);
            return false;
        }
        self.meshes.insert(mesh.name.clone(), mesh);
        true
    }

    pub fn add_material(&mut self, material: Material) {
        if let Some(previous) = self.materials.insert(material.name.clone(), material) {
            tracing::debug!("Material {} redefined", previous.name);
        }
    }

    pub fn add_pixelmap(&mut self, pixelmap: Pixelmap) {
        if let Some(previous) = self.pixelmaps.insert(pixelmap.name.clone(), pixelmap) {
            tracing::debug!("Pixelmap {} redefined", previous.name);
        }
    }

    // ==================== Lookup ====================

    pub fn roots(&self) -> &[String] {
        &self.actors.roots
    }

    pub fn actors(&self) -> &IndexMap<String, Actor> {
        &self.actors.actors
    }

    pub fn meshes(&self) -> &IndexMap<String, Mesh> {
        &self.meshes
    }

    pub fn materials(&self) -> &IndexMap<String, Material> {
        &self.materials
    }

    pub fn pixelmaps(&self) -> &IndexMap<String, Pixelmap> {
        &self.pixelmaps
    }

    pub fn actor(&self, name: &str) -> Result<&Actor> {
        lookup(&self.actors.actors, ResourceKind::Actor, name)
    }

    pub fn mesh(&self, name: &str) -> Result<&Mesh> {
        lookup(&self.meshes, ResourceKind::Mesh, name)
    }

    pub fn material(&self, name: &str) -> Result<&Material> {
        lookup(&self.materials, ResourceKind::Material, name)
    }

    pub fn pixelmap(&self, name: &str) -> Result<&Pixelmap> {
        lookup(&self.pixelmaps, ResourceKind::Pixelmap, name)
    }

    /// Mesh drawn by an actor, `Ok(None)` if the actor has no mesh.
    pub fn mesh_for_actor(&self, actor: &Actor) -> Result<Option<&Mesh>> {
        actor.mesh_name.as_deref().map(|name| self.mesh(name)).transpose()
    }

    /// Material of a face, `Ok(None)` for material id 0.
    pub fn material_for_face(&self, mesh: &Mesh, face: &Face) -> Result<Option<&Material>> {
        if face.material_id == 0 {
            return Ok(None);
        }
        let Some(name) = mesh.material_name(face) else {
            return Err(Error::NotFound {
                kind: ResourceKind::Material,
                name: format!("#{} of mesh {}", face.material_id, mesh.name),
            });
        };
        self.material(name).map(Some)
    }

    /// Pixelmap referenced by a material, `Ok(None)` if it names none.
    pub fn pixelmap_for_material(&self, material: &Material) -> Result<Option<&Pixelmap>> {
        if !material.has_pixelmap() {
            return Ok(None);
        }
        self.pixelmap(&material.pixelmap_name).map(Some)
    }

    // ==================== Resolution ====================

    /// Every reference that does not resolve. Each one is logged at warn.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut missing = Vec::new();
        let mut check = |owner_kind: ResourceKind,
                         owner: &str,
                         kind: ResourceKind,
                         name: &str,
                         present: bool| {
            if !present {
                tracing::warn!("{owner_kind} {owner} refers to missing {kind} {name}");
                missing.push(UnresolvedReference {
                    owner_kind,
                    owner: owner.to_string(),
                    kind,
                    name: name.to_string(),
                });
            }
        };

        for actor in self.actors.actors.values() {
            if let Some(mesh) = &actor.mesh_name {
                let present = self.meshes.contains_key(mesh);
                check(ResourceKind::Actor, &actor.name, ResourceKind::Mesh, mesh, present);
            }
            if let Some(material) = &actor.material_name {
                let present = self.materials.contains_key(material);
                check(ResourceKind::Actor, &actor.name, ResourceKind::Material, material, present);
            }
        }
        for mesh in self.meshes.values() {
            for material in &mesh.material_names {
                let present = self.materials.contains_key(material);
                check(ResourceKind::Mesh, &mesh.name, ResourceKind::Material, material, present);
            }
        }
        for material in self.materials.values().filter(|m| m.has_pixelmap()) {
            let present = self.pixelmaps.contains_key(&material.pixelmap_name);
            check(
                ResourceKind::Material,
                &material.name,
                ResourceKind::Pixelmap,
                &material.pixelmap_name,
                present,
            );
        }
        missing
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            actors: self.actors.len(),
            roots: self.actors.roots.len(),
            meshes: self.meshes.len(),
            materials: self.materials.len(),
            pixelmaps: self.pixelmaps.len(),
        }
    }
}

fn lookup<'a, T>(map: &'a IndexMap<String, T>, kind: ResourceKind, name: &str) -> Result<&'a T> {
    map.get(name).ok_or_else(|| Error::NotFound {
        kind,
        name: name.to_string(),
    })
}
