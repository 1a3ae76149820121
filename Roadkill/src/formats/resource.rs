//! Resource file envelope
//!
//! All resource files open with a file-header chunk of size 8 holding a
//! format tag and a reserved word. Anything else aborts the whole file.

use super::chunk::{self, ChunkHeader};
use super::common::BinaryReader;
use crate::error::{Error, Result, Stage};
use std::io::{BufRead, Seek};

/// Known values of the envelope's format tag.
pub mod file_type {
    pub const ACTOR: u32 = 0x1;
    pub const PIXELMAP: u32 = 0x2;
    pub const MATERIAL: u32 = 0x5;
    pub const MESH: u32 = 0xface;
}

/// Declared size of the file-header chunk.
pub const FILE_HEADER_SIZE: u32 = 8;

/// Kind of resource named by a file's format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum FileKind {
    Actor,
    Pixelmap,
    Material,
    Mesh,
    Unknown(u32),
}

/// Decoded resource envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub format_tag: u32,
    pub reserved: u32,
}

impl FileHeader {
    pub fn kind(&self) -> FileKind {
        match self.format_tag {
            file_type::ACTOR => FileKind::Actor,
            file_type::PIXELMAP => FileKind::Pixelmap,
            file_type::MATERIAL => FileKind::Material,
            file_type::MESH => FileKind::Mesh,
            other => FileKind::Unknown(other),
        }
    }
}

/// Read and validate the 16-byte envelope.
///
/// The format tag is returned but not checked against the caller's intent.
///
/// # Errors
///
/// Returns [`Error::InvalidFileHeader`] on a wrong tag or size and
/// [`Error::UnexpectedEof`] when the file is shorter than the envelope.
pub fn read_file_header<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<FileHeader> {
    reader.set_stage(Stage::FileHeader);
    let header = ChunkHeader::read(reader)?;
    if header.chunk_type != chunk::FILE_HEADER || header.size != FILE_HEADER_SIZE {
        return Err(Error::InvalidFileHeader {
            chunk_type: header.chunk_type,
            size: header.size,
        });
    }
    let format_tag = reader.read_u32()?;
    let reserved = reader.read_u32()?;
    let file_header = FileHeader {
        format_tag,
        reserved,
    };
    tracing::debug!("file header: {:?} (tag 0x{format_tag:x})", file_header.kind());
    Ok(file_header)
}
