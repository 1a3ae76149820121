//! Resource file writing
//!
//! Encodes records in the layout the readers accept. Used to build test
//! fixtures and to re-save edited resources.

use super::actor::{Actor, ActorGraph};
use super::chunk;
use super::common::FormatRevision;
use super::material::Material;
use super::mesh::Mesh;
use super::pixelmap::Pixelmap;
use super::resource::FILE_HEADER_SIZE;
use crate::error::{Error, Result};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

/// Output sink that tracks the number of bytes written.
struct Counted<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Big-endian chunk writer.
pub struct ResourceWriter<W> {
    inner: Counted<W>,
    revision: FormatRevision,
}

impl<W: Write> ResourceWriter<W> {
    pub fn new(inner: W, revision: FormatRevision) -> Self {
        Self {
            inner: Counted { inner, written: 0 },
            revision,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner.inner
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.inner.written
    }

    /// Convert a length to a 32-bit size or count field.
    fn size_field(&self, chunk_type: u32, len: usize, what: &str) -> Result<u32> {
        u32::try_from(len).map_err(|_| Error::SizeViolation {
            stage: chunk::stage_for(chunk_type),
            position: self.position(),
            message: format!("{what} of {len} does not fit a 32-bit field"),
        })
    }

    /// Write the 16-byte envelope.
    pub fn write_file_header(&mut self, format_tag: u32) -> Result<()> {
        self.inner.write_u32::<BigEndian>(chunk::FILE_HEADER)?;
        self.inner.write_u32::<BigEndian>(FILE_HEADER_SIZE)?;
        self.inner.write_u32::<BigEndian>(format_tag)?;
        self.inner.write_u32::<BigEndian>(0)?;
        Ok(())
    }

    /// Write a plain chunk: tag, payload length, payload.
    pub fn write_chunk(&mut self, chunk_type: u32, payload: &[u8]) -> Result<()> {
        let size = self.size_field(chunk_type, payload.len(), "chunk payload")?;
        self.inner.write_u32::<BigEndian>(chunk_type)?;
        self.inner.write_u32::<BigEndian>(size)?;
        self.inner.write_all(payload)?;
        Ok(())
    }

    /// Write a zero/zero end-of-record chunk.
    pub fn write_sentinel(&mut self) -> Result<()> {
        self.write_chunk(chunk::END_OF_RECORD, &[])
    }

    fn write_list_header(&mut self, chunk_type: u32, entries: usize, payload_len: usize) -> Result<()> {
        let entries = self.size_field(chunk_type, entries, "entry count")?;
        let size = self.size_field(chunk_type, payload_len.saturating_add(4), "list payload")?;
        self.inner.write_u32::<BigEndian>(chunk_type)?;
        self.inner.write_u32::<BigEndian>(size)?;
        self.inner.write_u32::<BigEndian>(entries)?;
        Ok(())
    }

    fn write_scalar(&mut self, value: f32) -> Result<()> {
        let raw = self.revision.encode_scalar(value);
        self.inner.write_u32::<BigEndian>(raw)?;
        Ok(())
    }

    /// Write one mesh record.
    pub fn write_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        let name_size = self.size_field(chunk::FILE_NAME, mesh.name.len() + 3, "mesh name")?;
        self.inner.write_u32::<BigEndian>(chunk::FILE_NAME)?;
        self.inner.write_u32::<BigEndian>(name_size)?;
        self.inner.write_u16::<BigEndian>(0)?;
        self.inner.write_all(mesh.name.as_bytes())?;
        self.inner.write_u8(0)?;

        self.write_list_header(chunk::VERTEX_LIST, mesh.vertices.len(), mesh.vertices.len() * 12)?;
        for v in &mesh.vertices {
            self.write_scalar(v.x)?;
            self.write_scalar(v.y)?;
            self.write_scalar(v.z)?;
        }

        self.write_list_header(chunk::UV_LIST, mesh.uvs.len(), mesh.uvs.len() * 8)?;
        for uv in &mesh.uvs {
            self.write_scalar(uv.x)?;
            self.write_scalar(uv.y)?;
        }

        self.write_list_header(chunk::FACE_LIST, mesh.faces.len(), mesh.faces.len() * 9)?;
        for face in &mesh.faces {
            self.inner.write_u16::<BigEndian>(face.v1)?;
            self.inner.write_u16::<BigEndian>(face.v2)?;
            self.inner.write_u16::<BigEndian>(face.v3)?;
            self.inner.write_u16::<BigEndian>(face.flags)?;
            self.inner.write_u8(face.unknown)?;
        }

        let names_len: usize = mesh.material_names.iter().map(|n| n.len() + 1).sum();
        self.write_list_header(
            chunk::MATERIAL_NAME_LIST,
            mesh.material_names.len(),
            names_len,
        )?;
        for name in &mesh.material_names {
            self.inner.write_all(name.as_bytes())?;
            self.inner.write_u8(0)?;
        }

        // Declared size leaves out the 8 trailing bytes; the reader adds them back.
        self.write_list_header(
            chunk::FACE_MATERIAL_LIST,
            mesh.faces.len(),
            4 + mesh.faces.len() * 2,
        )?;
        self.inner.write_u32::<BigEndian>(0)?;
        for face in &mesh.faces {
            self.inner.write_u16::<BigEndian>(face.material_id)?;
        }

        // Two spare words in legacy files, a sentinel otherwise. Same bytes.
        self.write_sentinel()
    }

    /// Write one material record.
    pub fn write_material(&mut self, material: &Material) -> Result<()> {
        let mut desc = Vec::with_capacity(48 + material.name.len() + 1);
        for param in material.params {
            desc.write_u32::<BigEndian>(param.to_bits())?;
        }
        push_c_string(&mut desc, &material.name);
        self.write_chunk(chunk::MATERIAL_DESCRIPTION, &desc)?;
        self.write_chunk(chunk::PIXELMAP_REFERENCE, &c_string(&material.pixelmap_name))?;
        self.write_chunk(
            chunk::RENDER_TABLE_REFERENCE,
            &c_string(&material.render_table_name),
        )?;
        self.write_sentinel()
    }

    /// Write one pixelmap record.
    pub fn write_pixelmap(&mut self, pixelmap: &Pixelmap) -> Result<()> {
        let mut header = Vec::with_capacity(11 + pixelmap.name.len() + 1);
        header.write_u8(pixelmap.marker)?;
        header.write_u16::<BigEndian>(pixelmap.metadata)?;
        header.write_u16::<BigEndian>(pixelmap.width)?;
        header.write_u16::<BigEndian>(pixelmap.height)?;
        header.write_u16::<BigEndian>(pixelmap.used_width)?;
        header.write_u16::<BigEndian>(pixelmap.used_height)?;
        push_c_string(&mut header, &pixelmap.name);
        self.write_chunk(chunk::PIXELMAP_HEADER, &header)?;

        let mut data = Vec::with_capacity(8 + pixelmap.data.len());
        match self.revision {
            FormatRevision::Legacy => {
                let len = self.size_field(chunk::PIXELMAP_DATA, pixelmap.data.len(), "pixelmap payload")?;
                data.write_u32::<BigEndian>(len)?;
                data.write_u32::<BigEndian>(pixelmap.reserved)?;
            }
            FormatRevision::Current => {
                data.write_u32::<BigEndian>(pixelmap.units)?;
                data.write_u32::<BigEndian>(pixelmap.unit_bytes)?;
            }
        }
        data.extend_from_slice(&pixelmap.data);
        self.write_chunk(chunk::PIXELMAP_DATA, &data)?;
        self.write_sentinel()
    }

    /// Write a whole actor graph as a single record.
    pub fn write_actor_graph(&mut self, graph: &ActorGraph) -> Result<()> {
        for root in &graph.roots {
            if let Some(actor) = graph.get(root) {
                self.write_actor(graph, actor, 0)?;
            }
        }
        self.write_sentinel()
    }

    fn write_actor(&mut self, graph: &ActorGraph, actor: &Actor, depth: usize) -> Result<()> {
        let mut head = vec![u8::from(actor.visible), actor.flags];
        push_c_string(&mut head, &actor.name);
        self.write_chunk(chunk::ACTOR, &head)?;

        let mut matrix = Vec::with_capacity(48);
        for value in actor.matrix34() {
            matrix.write_u32::<BigEndian>(value.to_bits())?;
        }
        self.write_chunk(chunk::ACTOR_TRANSFORM, &matrix)?;
        self.write_chunk(chunk::ACTOR_ATTACH_TRANSFORM, &[])?;

        if let Some((min, max)) = actor.bounds {
            let mut bounds = Vec::with_capacity(24);
            for value in min.to_array().into_iter().chain(max.to_array()) {
                bounds.write_u32::<BigEndian>(value.to_bits())?;
            }
            self.write_chunk(chunk::ACTOR_BOUNDS, &bounds)?;
            self.write_chunk(chunk::ACTOR_ATTACH_BOUNDS, &[])?;
        }
        if let Some(mesh) = &actor.mesh_name {
            self.write_chunk(chunk::ACTOR_MESH_REFERENCE, &c_string(mesh))?;
        }
        if let Some(material) = &actor.material_name {
            self.write_chunk(chunk::ACTOR_MATERIAL_REFERENCE, &c_string(material))?;
        }

        // Children are looked up by name; stop at the graph size to survive cycles.
        if depth < graph.len() {
            for name in &actor.children {
                if let Some(child) = graph.get(name) {
                    self.write_actor(graph, child, depth + 1)?;
                    self.write_chunk(chunk::ACTOR_ADD_CHILD, &[])?;
                }
            }
        }
        Ok(())
    }
}

fn push_c_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn c_string(s: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(s.len() + 1);
    push_c_string(&mut buf, s);
    buf
}
