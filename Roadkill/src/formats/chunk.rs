//! Chunk headers and tags
//!
//! Every logical record in a resource file is a run of chunks, each
//! introduced by a big-endian type tag and declared size. Mesh list chunks
//! follow the header with an entry count.

use super::common::BinaryReader;
use crate::error::{Error, Result, Stage};
use std::io::{BufRead, Seek};

/// Zero/zero chunk closing a record.
pub const END_OF_RECORD: u32 = 0x00;
pub const PIXELMAP_HEADER: u32 = 0x03;
pub const MATERIAL_DESCRIPTION: u32 = 0x04;
/// Leading chunk of every resource file.
pub const FILE_HEADER: u32 = 0x12;
pub const MATERIAL_NAME_LIST: u32 = 0x16;
pub const VERTEX_LIST: u32 = 0x17;
pub const UV_LIST: u32 = 0x18;
/// Face to material index list. Its declared size is 8 short.
pub const FACE_MATERIAL_LIST: u32 = 0x1a;
pub const PIXELMAP_REFERENCE: u32 = 0x1c;
pub const RENDER_TABLE_REFERENCE: u32 = 0x1f;
pub const PIXELMAP_DATA: u32 = 0x21;
pub const ACTOR: u32 = 0x23;
pub const ACTOR_MESH_REFERENCE: u32 = 0x24;
pub const ACTOR_ATTACH_TRANSFORM: u32 = 0x25;
pub const ACTOR_MATERIAL_REFERENCE: u32 = 0x26;
pub const ACTOR_ATTACH_BOUNDS: u32 = 0x29;
pub const ACTOR_ADD_CHILD: u32 = 0x2a;
pub const ACTOR_TRANSFORM: u32 = 0x2b;
pub const ACTOR_BOUNDS: u32 = 0x32;
pub const FACE_LIST: u32 = 0x35;
/// Mesh name. Carries a 16-bit entry count instead of 32-bit.
pub const FILE_NAME: u32 = 0x36;

/// Size of the face-material header miscount.
const FACE_MATERIAL_SIZE_FIXUP: u32 = 8;

/// Human-readable tag name for logs.
pub fn tag_name(chunk_type: u32) -> &'static str {
    match chunk_type {
        END_OF_RECORD => "end-of-record",
        PIXELMAP_HEADER => "pixelmap-header",
        MATERIAL_DESCRIPTION => "material-description",
        FILE_HEADER => "file-header",
        MATERIAL_NAME_LIST => "material-name-list",
        VERTEX_LIST => "vertex-list",
        UV_LIST => "uv-list",
        FACE_MATERIAL_LIST => "face-material-list",
        PIXELMAP_REFERENCE => "pixelmap-reference",
        RENDER_TABLE_REFERENCE => "rendertable-reference",
        PIXELMAP_DATA => "pixelmap-data",
        ACTOR => "actor",
        ACTOR_MESH_REFERENCE => "actor-mesh",
        ACTOR_ATTACH_TRANSFORM => "actor-attach-transform",
        ACTOR_MATERIAL_REFERENCE => "actor-material",
        ACTOR_ATTACH_BOUNDS => "actor-attach-bounds",
        ACTOR_ADD_CHILD => "actor-add-child",
        ACTOR_TRANSFORM => "actor-transform",
        ACTOR_BOUNDS => "actor-bounds",
        FACE_LIST => "face-list",
        FILE_NAME => "file-name",
        _ => "unknown",
    }
}

/// Decode stage a chunk tag belongs to. Tags outside mesh, material and
/// pixelmap records count as actor chunks.
pub fn stage_for(chunk_type: u32) -> Stage {
    match chunk_type {
        END_OF_RECORD => Stage::EndOfRecord,
        FILE_HEADER => Stage::FileHeader,
        FILE_NAME => Stage::MeshName,
        VERTEX_LIST => Stage::VertexList,
        UV_LIST => Stage::UvList,
        FACE_LIST => Stage::FaceList,
        MATERIAL_NAME_LIST => Stage::MaterialNames,
        FACE_MATERIAL_LIST => Stage::FaceMaterials,
        MATERIAL_DESCRIPTION => Stage::MaterialDescription,
        PIXELMAP_REFERENCE => Stage::PixelmapReference,
        RENDER_TABLE_REFERENCE => Stage::RenderTableReference,
        PIXELMAP_HEADER => Stage::PixelmapHeader,
        PIXELMAP_DATA => Stage::PixelmapData,
        _ => Stage::Actor,
    }
}

/// A decoded chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Type tag.
    pub chunk_type: u32,
    /// Declared size, already corrected for the face-material quirk.
    pub size: u32,
    /// Entry count for list chunks, zero otherwise.
    pub entries: u32,
    /// Stream offset of the first header byte.
    pub position: u64,
}

impl ChunkHeader {
    /// Read a plain type + size header.
    pub fn read<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<Self> {
        let position = reader.position();
        let chunk_type = reader.read_u32()?;
        let size = reader.read_u32()?;
        tracing::trace!(
            "chunk {} (0x{chunk_type:x}) size {size} at 0x{position:x}",
            tag_name(chunk_type)
        );
        Ok(Self {
            chunk_type,
            size,
            entries: 0,
            position,
        })
    }

    /// Read a mesh list header: type + size + entry count.
    pub fn read_with_entries<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<Self> {
        let mut header = Self::read(reader)?;
        header.entries = if header.chunk_type == FILE_NAME {
            u32::from(reader.read_u16()?)
        } else {
            reader.read_u32()?
        };
        if header.chunk_type == FACE_MATERIAL_LIST {
            header.size = header.size.saturating_add(FACE_MATERIAL_SIZE_FIXUP);
        }
        tracing::trace!("  {} entries", header.entries);
        Ok(header)
    }

    /// Whether this is the zero/zero end-of-record chunk.
    pub fn is_sentinel(&self) -> bool {
        self.chunk_type == END_OF_RECORD && self.size == 0
    }

    /// Fail unless the header carries `expected`.
    pub fn expect(self, stage: Stage, expected: u32) -> Result<Self> {
        if self.chunk_type != expected {
            return Err(Error::UnexpectedChunk {
                stage,
                expected,
                found: self.chunk_type,
                position: self.position,
            });
        }
        Ok(self)
    }
}

/// Read a zero/zero chunk closing a record whose last data stage was `after`.
pub fn read_sentinel<R: BufRead + Seek>(reader: &mut BinaryReader<R>, after: Stage) -> Result<()> {
    reader.set_stage(Stage::EndOfRecord);
    let header = ChunkHeader::read(reader)?;
    if !header.is_sentinel() {
        return Err(Error::MissingSentinel {
            stage: after,
            found: header.chunk_type,
            size: header.size,
            position: header.position,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: Vec<u8>) -> BinaryReader<Cursor<Vec<u8>>> {
        BinaryReader::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_file_name_uses_short_entry_count() {
        let mut r = reader(vec![0, 0, 0, 0x36, 0, 0, 0, 0x0b, 0, 1, b'X']);
        let header = ChunkHeader::read_with_entries(&mut r).unwrap();
        assert_eq!(header.chunk_type, FILE_NAME);
        assert_eq!(header.size, 11);
        assert_eq!(header.entries, 1);
        assert_eq!(r.position(), 10);
    }

    #[test]
    fn test_face_material_size_fixup() {
        let mut r = reader(vec![0, 0, 0, 0x1a, 0, 0, 0, 0x0c, 0, 0, 0, 2]);
        let header = ChunkHeader::read_with_entries(&mut r).unwrap();
        assert_eq!(header.size, 20);
        assert_eq!(header.entries, 2);
    }

    #[test]
    fn test_other_list_sizes_untouched() {
        let mut r = reader(vec![0, 0, 0, 0x17, 0, 0, 0, 0x10, 0, 0, 0, 1]);
        let header = ChunkHeader::read_with_entries(&mut r).unwrap();
        assert_eq!(header.size, 16);
    }

    #[test]
    fn test_expect_mismatch() {
        let header = ChunkHeader {
            chunk_type: UV_LIST,
            size: 0,
            entries: 0,
            position: 24,
        };
        let err = header.expect(Stage::VertexList, VERTEX_LIST).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedChunk {
                expected: VERTEX_LIST,
                found: UV_LIST,
                position: 24,
                ..
            }
        ));
    }

    #[test]
    fn test_sentinel() {
        let mut r = reader(vec![0; 8]);
        read_sentinel(&mut r, Stage::RenderTableReference).unwrap();

        let mut r = reader(vec![0, 0, 0, 0, 0, 0, 0, 4]);
        let err = read_sentinel(&mut r, Stage::RenderTableReference).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingSentinel {
                stage: Stage::RenderTableReference,
                size: 4,
                ..
            }
        ));
    }
}
