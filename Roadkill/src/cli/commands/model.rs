//! Model loading command

use crate::formats::LoadOptions;
use crate::model::{Model, ModelStats, UnresolvedReference};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Files making up one model.
pub struct ModelFiles<'a> {
    pub actor: &'a Path,
    pub meshes: &'a [PathBuf],
    pub materials: &'a [PathBuf],
    pub pixelmaps: &'a [PathBuf],
}

#[derive(Serialize)]
struct ModelReport {
    stats: ModelStats,
    roots: Vec<String>,
    unresolved: Vec<UnresolvedReference>,
}

/// Load the actor, mesh, material and pixelmap files into one model.
pub fn load(files: &ModelFiles<'_>, options: &LoadOptions, json: bool) -> anyhow::Result<()> {
    let mut model = Model::new(*options);
    model.load_actor_file(files.actor)?;
    for path in files.meshes {
        model.load_mesh_file(path)?;
    }
    for path in files.materials {
        model.load_material_file(path)?;
    }
    for path in files.pixelmaps {
        model.load_pixelmap_file(path)?;
    }

    let report = ModelReport {
        stats: model.stats(),
        roots: model.roots().to_vec(),
        unresolved: model.unresolved_references(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Model {}", files.actor.display());
    println!("  Actors:     {} ({} roots)", report.stats.actors, report.stats.roots);
    println!("  Meshes:     {}", report.stats.meshes);
    println!("  Materials:  {}", report.stats.materials);
    println!("  Pixelmaps:  {}", report.stats.pixelmaps);
    if report.unresolved.is_empty() {
        println!("All references resolved.");
    } else {
        println!("Unresolved references ({}):", report.unresolved.len());
        for missing in &report.unresolved {
            println!(
                "  {} {} -> {} {}",
                missing.owner_kind, missing.owner, missing.kind, missing.name
            );
        }
    }
    Ok(())
}
