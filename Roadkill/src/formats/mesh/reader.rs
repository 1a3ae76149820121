//! Mesh record decoding

use super::{FACE_SIZE, Face, Mesh, UV_SIZE, VERTEX_SIZE};
use crate::error::{Error, Result, Stage};
use crate::formats::chunk::{self, ChunkHeader};
use crate::formats::common::{BinaryReader, FormatRevision, LoadOptions, open_resource};
use crate::formats::resource::read_file_header;
use glam::{Vec2, Vec3};
use std::io::{BufRead, Seek};
use std::path::Path;

/// Read every mesh in a mesh file.
///
/// Normals are computed when `options.compute_normals` is set.
///
/// # Errors
///
/// Fails on an invalid envelope or on any record that does not decode.
pub fn read_mesh_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Vec<Mesh>> {
    let path = path.as_ref();
    let mut reader = open_resource(path).map_err(|e| e.in_file(path, None))?;
    read_file_header(&mut reader).map_err(|e| e.in_file(path, None))?;
    let mut meshes = Vec::new();
    for (record, mesh) in MeshReader::new(&mut reader, options.revision).enumerate() {
        let mut mesh = mesh.map_err(|e| e.in_file(path, Some(record)))?;
        if options.compute_normals {
            mesh.calc_normals();
        }
        meshes.push(mesh);
    }
    tracing::info!("Loaded {} meshes from {}", meshes.len(), path.display());
    Ok(meshes)
}

/// Streams mesh records out of a reader positioned after the envelope.
pub struct MeshReader<'a, R> {
    reader: &'a mut BinaryReader<R>,
    revision: FormatRevision,
    done: bool,
}

impl<'a, R: BufRead + Seek> MeshReader<'a, R> {
    pub fn new(reader: &'a mut BinaryReader<R>, revision: FormatRevision) -> Self {
        Self {
            reader,
            revision,
            done: false,
        }
    }

    /// Decode the next record; `Ok(None)` when the stream ends cleanly.
    pub fn next_mesh(&mut self) -> Result<Option<Mesh>> {
        read_mesh(self.reader, self.revision)
    }
}

impl<R: BufRead + Seek> Iterator for MeshReader<'_, R> {
    type Item = Result<Mesh>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_mesh().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Decode one mesh record.
///
/// Returns `Ok(None)` if the stream is exhausted before the record's first
/// byte. Any failure after that point is an error.
pub fn read_mesh<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    revision: FormatRevision,
) -> Result<Option<Mesh>> {
    if reader.at_end()? {
        return Ok(None);
    }

    let name = read_name(reader)?;
    let vertices = read_vertices(reader, revision)?;
    let uvs = read_uvs(reader, revision)?;
    let mut faces = read_faces(reader, vertices.len())?;
    let material_names = read_material_names(reader)?;
    read_face_materials(reader, &mut faces, material_names.len())?;

    match revision {
        FormatRevision::Legacy => {
            reader.set_stage(Stage::EndOfRecord);
            reader.read_u32()?;
            reader.read_u32()?;
        }
        FormatRevision::Current => chunk::read_sentinel(reader, Stage::FaceMaterials)?,
    }

    tracing::debug!(
        "Mesh {name}: {} vertices, {} uvs, {} faces, {} materials",
        vertices.len(),
        uvs.len(),
        faces.len(),
        material_names.len()
    );

    Ok(Some(Mesh {
        name,
        vertices,
        normals: Vec::new(),
        uvs,
        faces,
        material_names,
    }))
}

fn list_header<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    stage: Stage,
    tag: u32,
    record_size: u64,
) -> Result<ChunkHeader> {
    reader.set_stage(stage);
    let header = ChunkHeader::read_with_entries(reader)?.expect(stage, tag)?;
    reader.require(
        u64::from(header.entries) * record_size,
        header.position,
        chunk::tag_name(tag),
    )?;
    Ok(header)
}

fn read_name<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<String> {
    reader.set_stage(Stage::MeshName);
    let header = ChunkHeader::read_with_entries(reader)?.expect(Stage::MeshName, chunk::FILE_NAME)?;
    // The declared size counts the 16-bit entry field.
    let Some(len) = header.size.checked_sub(2) else {
        return Err(Error::SizeViolation {
            stage: Stage::MeshName,
            position: header.position,
            message: format!("declared size {} is below 2", header.size),
        });
    };
    reader.require(u64::from(len), header.position, "mesh name")?;
    reader.read_fixed_string(len as usize)
}

fn read_vertices<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    revision: FormatRevision,
) -> Result<Vec<Vec3>> {
    let header = list_header(reader, Stage::VertexList, chunk::VERTEX_LIST, VERTEX_SIZE)?;
    let mut vertices = Vec::with_capacity(header.entries as usize);
    for _ in 0..header.entries {
        let x = revision.decode_scalar(reader.read_u32()?);
        let y = revision.decode_scalar(reader.read_u32()?);
        let z = revision.decode_scalar(reader.read_u32()?);
        vertices.push(Vec3::new(x, y, z));
    }
    Ok(vertices)
}

fn read_uvs<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    revision: FormatRevision,
) -> Result<Vec<Vec2>> {
    let header = list_header(reader, Stage::UvList, chunk::UV_LIST, UV_SIZE)?;
    let mut uvs = Vec::with_capacity(header.entries as usize);
    for _ in 0..header.entries {
        let u = revision.decode_scalar(reader.read_u32()?);
        let v = revision.decode_scalar(reader.read_u32()?);
        uvs.push(Vec2::new(u, v));
    }
    Ok(uvs)
}

fn read_faces<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    vertex_count: usize,
) -> Result<Vec<Face>> {
    let header = list_header(reader, Stage::FaceList, chunk::FACE_LIST, FACE_SIZE)?;
    let mut faces = Vec::with_capacity(header.entries as usize);
    for index in 0..header.entries as usize {
        let face = Face {
            v1: reader.read_u16()?,
            v2: reader.read_u16()?,
            v3: reader.read_u16()?,
            flags: reader.read_u16()?,
            unknown: reader.read_u8()?,
            material_id: 0,
        };
        if let Some(&bad) = face.indices().iter().find(|&&i| usize::from(i) >= vertex_count) {
            return Err(Error::VertexIndexOutOfRange {
                face: index,
                index: bad,
                vertex_count,
            });
        }
        faces.push(face);
    }
    Ok(faces)
}

fn read_material_names<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<Vec<String>> {
    // Each name is at least its terminator.
    let header = list_header(reader, Stage::MaterialNames, chunk::MATERIAL_NAME_LIST, 1)?;
    let mut names = Vec::with_capacity(header.entries as usize);
    for _ in 0..header.entries {
        names.push(reader.read_c_string()?);
    }
    Ok(names)
}

fn read_face_materials<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    faces: &mut [Face],
    material_count: usize,
) -> Result<()> {
    let header = list_header(reader, Stage::FaceMaterials, chunk::FACE_MATERIAL_LIST, 2)?;
    if header.entries as usize > faces.len() {
        return Err(Error::SizeViolation {
            stage: Stage::FaceMaterials,
            position: header.position,
            message: format!(
                "{} face material entries for {} faces",
                header.entries,
                faces.len()
            ),
        });
    }
    reader.read_u32()?;
    for (index, face) in faces.iter_mut().take(header.entries as usize).enumerate() {
        let material_id = reader.read_u16()?;
        if usize::from(material_id) > material_count {
            return Err(Error::MaterialIndexOutOfRange {
                face: index,
                index: material_id,
                material_count,
            });
        }
        face.material_id = material_id;
    }
    Ok(())
}
