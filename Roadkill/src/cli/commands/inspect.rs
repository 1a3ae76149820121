//! Inspection commands
//!
//! Print the records of a single resource file as text or JSON.

use crate::formats::actor::{ActorGraph, ActorInfo, read_actor_file};
use crate::formats::material::read_material_file;
use crate::formats::mesh::{MeshInfo, read_mesh_file};
use crate::formats::pixelmap::{PixelmapInfo, read_pixelmap_file};
use crate::formats::LoadOptions;
use std::path::Path;

/// Show the meshes in a mesh file.
pub fn meshes(path: &Path, options: &LoadOptions, json: bool) -> anyhow::Result<()> {
    let meshes = read_mesh_file(path, options)?;
    let infos: Vec<MeshInfo> = meshes.iter().map(|m| m.info()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{} ({} meshes)", path.display(), infos.len());
    for info in &infos {
        println!();
        println!("Mesh: {}", info.name);
        println!("  Vertices:  {}", info.vertex_count);
        println!("  UVs:       {}", info.uv_count);
        println!("  Faces:     {}", info.face_count);
        println!(
            "  Bounds:    ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
            info.bounds_min[0],
            info.bounds_min[1],
            info.bounds_min[2],
            info.bounds_max[0],
            info.bounds_max[1],
            info.bounds_max[2]
        );
        if !info.materials.is_empty() {
            println!("  Materials:");
            for (i, name) in info.materials.iter().enumerate() {
                println!("    [{:2}] {name}", i + 1);
            }
        }
    }
    Ok(())
}

/// Show the materials in a material file.
pub fn materials(path: &Path, json: bool) -> anyhow::Result<()> {
    let materials = read_material_file(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&materials)?);
        return Ok(());
    }

    println!("{} ({} materials)", path.display(), materials.len());
    for material in &materials {
        let pixelmap = if material.has_pixelmap() {
            material.pixelmap_name.as_str()
        } else {
            "-"
        };
        println!(
            "  {:<16} pixelmap {:<16} table {}",
            material.name, pixelmap, material.render_table_name
        );
    }
    Ok(())
}

/// Show the pixelmaps in a pixelmap file.
pub fn pixelmaps(path: &Path, options: &LoadOptions, json: bool) -> anyhow::Result<()> {
    let pixelmaps = read_pixelmap_file(path, options.revision)?;
    let infos: Vec<PixelmapInfo> = pixelmaps.iter().map(|p| p.info()).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{} ({} pixelmaps)", path.display(), infos.len());
    for info in &infos {
        println!(
            "  {:<16} {}x{} (use {}x{}), {} units x {} bytes",
            info.name,
            info.width,
            info.height,
            info.used_width,
            info.used_height,
            info.units,
            info.unit_bytes
        );
    }
    Ok(())
}

/// Show the actor hierarchy in an actor file.
pub fn actors(path: &Path, json: bool) -> anyhow::Result<()> {
    let graph = read_actor_file(path)?;
    if json {
        let infos: Vec<ActorInfo> = graph.actors.values().map(|a| a.info()).collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    println!("{} ({} actors)", path.display(), graph.len());
    for root in &graph.roots {
        print_actor(&graph, root, 1);
    }
    Ok(())
}

fn print_actor(graph: &ActorGraph, name: &str, depth: usize) {
    let Some(actor) = graph.get(name) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let mesh = actor.mesh_name.as_deref().unwrap_or("-");
    let material = actor.material_name.as_deref().unwrap_or("-");
    let hidden = if actor.visible { "" } else { " (hidden)" };
    println!(
        "{indent}{}{hidden} mesh {mesh} material {material} at ({:.3}, {:.3}, {:.3})",
        actor.name, actor.translation.x, actor.translation.y, actor.translation.z
    );
    if depth > graph.len() {
        return;
    }
    for child in &actor.children {
        print_actor(graph, child, depth + 1);
    }
}
