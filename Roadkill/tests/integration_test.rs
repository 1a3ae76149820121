//! Integration tests for Roadkill
//!
//! Fixtures are encoded with `ResourceWriter` into temporary files and read
//! back through the file-level loaders.

use glam::{Vec2, Vec3};
use pretty_assertions::assert_eq;
use roadkill::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(
    dir: &Path,
    name: &str,
    format_tag: u32,
    revision: FormatRevision,
    body: impl FnOnce(&mut ResourceWriter<Vec<u8>>) -> Result<()>,
) -> PathBuf {
    let mut w = ResourceWriter::new(Vec::new(), revision);
    w.write_file_header(format_tag).unwrap();
    body(&mut w).unwrap();
    let path = dir.join(name);
    fs::write(&path, w.into_inner()).unwrap();
    path
}

fn quad(name: &str) -> Mesh {
    Mesh {
        name: name.to_string(),
        vertices: vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        normals: Vec::new(),
        uvs: vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
        faces: vec![
            Face {
                v1: 0,
                v2: 1,
                v3: 2,
                flags: 1,
                unknown: 0,
                material_id: 1,
            },
            Face {
                v1: 0,
                v2: 2,
                v3: 3,
                flags: 1,
                unknown: 0,
                material_id: 2,
            },
        ],
        material_names: vec!["BODY.MAT".to_string(), "GLASS.MAT".to_string()],
    }
}

fn material(name: &str, pixelmap: &str) -> Material {
    Material {
        name: name.to_string(),
        params: [0.5; 12],
        pixelmap_name: pixelmap.to_string(),
        render_table_name: "SHADE.TAB".to_string(),
    }
}

fn pixelmap(name: &str, data: Vec<u8>, width: u16, height: u16, unit_bytes: u32) -> Pixelmap {
    Pixelmap {
        name: name.to_string(),
        marker: 3,
        width,
        height,
        used_width: width,
        used_height: height,
        metadata: 0,
        units: data.len() as u32 / unit_bytes,
        unit_bytes,
        reserved: 0,
        data,
    }
}

fn car_graph() -> ActorGraph {
    let body = Actor {
        name: "EAGLE.ACT".to_string(),
        mesh_name: Some("EAGLE.DAT".to_string()),
        material_name: Some("BODY.MAT".to_string()),
        children: vec!["WHEEL.ACT".to_string()],
        ..Actor::default()
    };
    let mut wheel = Actor {
        name: "WHEEL.ACT".to_string(),
        mesh_name: Some("WHEEL.DAT".to_string()),
        parent: Some("EAGLE.ACT".to_string()),
        ..Actor::default()
    };
    wheel.translation = Vec3::new(-0.5, 0.0, 1.0);
    let mut graph = ActorGraph {
        roots: vec!["EAGLE.ACT".to_string()],
        ..ActorGraph::default()
    };
    graph.actors.insert(body.name.clone(), body);
    graph.actors.insert(wheel.name.clone(), wheel);
    graph
}

#[test]
fn test_mesh_file_with_normals() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "EAGLE.DAT", file_type::MESH, FormatRevision::Current, |w| {
        w.write_mesh(&quad("EAGLE.DAT"))?;
        w.write_mesh(&quad("WHEEL.DAT"))
    });

    let meshes = read_mesh_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[1].name, "WHEEL.DAT");
    assert_eq!(meshes[0].faces.len(), 2);
    assert_eq!(meshes[0].normals, vec![Vec3::Z; 4]);

    let raw = read_mesh_file(&path, &LoadOptions::default().with_normals(false)).unwrap();
    assert!(raw[0].normals.is_empty());
}

#[test]
fn test_legacy_mesh_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "OLD.DAT", file_type::MESH, FormatRevision::Legacy, |w| {
        w.write_mesh(&quad("OLD.DAT"))
    });

    let options = LoadOptions::default().legacy();
    let meshes = read_mesh_file(&path, &options).unwrap();
    assert_eq!(meshes[0].vertices, quad("OLD.DAT").vertices);

    // Same bytes read as raw floats give denormals, not the quad.
    let wrong = read_mesh_file(&path, &LoadOptions::default()).unwrap();
    assert!(wrong[0].vertices[1].x < 1e-30);
}

#[test]
fn test_header_only_file_has_no_records() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "EMPTY.MAT", file_type::MATERIAL, FormatRevision::Current, |_| Ok(()));
    assert!(read_material_file(&path).unwrap().is_empty());
}

#[test]
fn test_bad_envelope_aborts_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("BAD.DAT");
    fs::write(&path, [0, 0, 0, 0x12, 0, 0, 0, 4, 0, 0, 0, 0]).unwrap();
    let err = read_mesh_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::InFile { record: None, .. }));
    assert!(matches!(err.root_cause(), Error::InvalidFileHeader { size: 4, .. }));
    assert_eq!(err.stage(), Some(Stage::FileHeader));
    assert!(err.to_string().contains("BAD.DAT: invalid file header"), "{err}");
}

#[test]
fn test_corruption_names_stage() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "CUT.DAT", file_type::MESH, FormatRevision::Current, |w| {
        w.write_mesh(&quad("CUT.DAT"))
    });
    let mut bytes = fs::read(&path).unwrap();
    // Cut into the UV list: header 16, name chunk 10 + 8, vertex chunk 12 + 48.
    bytes.truncate(16 + 18 + 60 + 12 + 4);
    fs::write(&path, bytes).unwrap();

    let err = read_mesh_file(&path, &LoadOptions::default()).unwrap_err();
    assert_eq!(err.stage(), Some(Stage::UvList));
    assert!(err.to_string().contains("CUT.DAT, record 0"), "{err}");
    assert!(err.to_string().contains("uv list"), "{err}");
}

#[test]
fn test_error_names_failing_record() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "CAR.MAT", file_type::MATERIAL, FormatRevision::Current, |w| {
        w.write_material(&material("BODY.MAT", "BODY.PIX"))?;
        w.write_material(&material("GLASS.MAT", ""))
    });
    let mut bytes = fs::read(&path).unwrap();
    // Turn the second record's sentinel into a stray chunk tag.
    let len = bytes.len();
    bytes[len - 5] = 0x17;
    fs::write(&path, bytes).unwrap();

    let err = read_material_file(&path).unwrap_err();
    match &err {
        Error::InFile { path: failed, record, .. } => {
            assert_eq!(failed, &path);
            assert_eq!(*record, Some(1));
        }
        other => panic!("expected file context, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), Error::MissingSentinel { found: 0x17, .. }));
}

#[test]
fn test_material_and_pixelmap_files() {
    let dir = TempDir::new().unwrap();
    let mat = write_file(dir.path(), "CAR.MAT", file_type::MATERIAL, FormatRevision::Current, |w| {
        w.write_material(&material("BODY.MAT", "BODY.PIX"))?;
        w.write_material(&material("GLASS.MAT", ""))
    });
    let pix = write_file(dir.path(), "CAR.PIX", file_type::PIXELMAP, FormatRevision::Current, |w| {
        w.write_pixelmap(&pixelmap("BODY.PIX", vec![1, 2, 3, 4], 2, 2, 1))
    });

    let materials = read_material_file(&mat).unwrap();
    assert_eq!(materials, vec![material("BODY.MAT", "BODY.PIX"), material("GLASS.MAT", "")]);

    let pixelmaps = read_pixelmap_file(&pix, FormatRevision::Current).unwrap();
    assert_eq!(pixelmaps[0].data, vec![1, 2, 3, 4]);
    assert_eq!(pixelmaps[0].payload_len(), 4);
}

#[test]
fn test_actor_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "EAGLE.ACT", file_type::ACTOR, FormatRevision::Current, |w| {
        w.write_actor_graph(&car_graph())
    });

    let graph = read_actor_file(&path).unwrap();
    assert_eq!(graph, car_graph());
    let world = graph.world_matrix("WHEEL.ACT").unwrap();
    assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(-0.5, 0.0, 1.0));
}

#[test]
fn test_model_resolution() {
    let dir = TempDir::new().unwrap();
    let act = write_file(dir.path(), "EAGLE.ACT", file_type::ACTOR, FormatRevision::Current, |w| {
        w.write_actor_graph(&car_graph())
    });
    let dat = write_file(dir.path(), "EAGLE.DAT", file_type::MESH, FormatRevision::Current, |w| {
        w.write_mesh(&quad("EAGLE.DAT"))?;
        w.write_mesh(&quad("EAGLE.DAT"))
    });
    let mat = write_file(dir.path(), "EAGLE.MAT", file_type::MATERIAL, FormatRevision::Current, |w| {
        w.write_material(&material("BODY.MAT", "BODY.PIX"))
    });

    let mut model = Model::new(LoadOptions::default());
    assert_eq!(model.load_actor_file(&act).unwrap(), 2);
    assert_eq!(model.load_mesh_file(&dat).unwrap(), 1);
    assert_eq!(model.load_material_file(&mat).unwrap(), 1);

    let missing: Vec<(ResourceKind, String)> = model
        .unresolved_references()
        .into_iter()
        .map(|r| (r.kind, r.name))
        .collect();
    assert_eq!(
        missing,
        vec![
            (ResourceKind::Mesh, "WHEEL.DAT".to_string()),
            (ResourceKind::Material, "GLASS.MAT".to_string()),
            (ResourceKind::Pixelmap, "BODY.PIX".to_string()),
        ]
    );

    let body = model.actor("EAGLE.ACT").unwrap();
    let mesh = model.mesh_for_actor(body).unwrap().unwrap();
    assert_eq!(model.material_for_face(mesh, &mesh.faces[0]).unwrap().unwrap().name, "BODY.MAT");
    assert!(matches!(
        model.material_for_face(mesh, &mesh.faces[1]),
        Err(Error::NotFound { kind: ResourceKind::Material, .. })
    ));

    let wheel = model.actor("WHEEL.ACT").unwrap();
    assert!(model.mesh_for_actor(wheel).is_err());
}

#[test]
fn test_png_export_through_palette() {
    let mut palette_data = vec![0u8; 256 * 4];
    palette_data[4..8].copy_from_slice(&[0, 200, 100, 50]);
    let palette = pixelmap("DRRENDER.PAL", palette_data, 1, 256, 4);
    let image = pixelmap("DOT.PIX", vec![0, 1, 1, 0], 2, 2, 1);

    let png = image.to_png(&palette).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (2, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(decoded.get_pixel(1, 0).0, [200, 100, 50, 255]);
}
