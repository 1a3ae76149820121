//! Error types for `Roadkill`

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Step of a record decode at which an error was raised.
///
/// The resource format is only partially understood, so every decode error
/// names the stage it failed in; that is usually the first thing to look at
/// when a new file refuses to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The 16-byte resource file envelope.
    FileHeader,
    /// Mesh file-name chunk (first chunk of a mesh record).
    MeshName,
    /// Mesh vertex list chunk.
    VertexList,
    /// Mesh UV list chunk.
    UvList,
    /// Mesh face list chunk.
    FaceList,
    /// Mesh material name list chunk.
    MaterialNames,
    /// Mesh face-to-material index chunk.
    FaceMaterials,
    /// Zero/zero chunk closing a record.
    EndOfRecord,
    /// Material description chunk (first chunk of a material record).
    MaterialDescription,
    /// Material pixelmap reference chunk.
    PixelmapReference,
    /// Material render-table reference chunk.
    RenderTableReference,
    /// Pixelmap header chunk (first chunk of a pixelmap record).
    PixelmapHeader,
    /// Pixelmap payload chunk.
    PixelmapData,
    /// Any chunk of an actor record.
    Actor,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FileHeader => "file header",
            Stage::MeshName => "mesh file name",
            Stage::VertexList => "vertex list",
            Stage::UvList => "uv list",
            Stage::FaceList => "face list",
            Stage::MaterialNames => "material name list",
            Stage::FaceMaterials => "face material list",
            Stage::EndOfRecord => "end of record",
            Stage::MaterialDescription => "material description",
            Stage::PixelmapReference => "pixelmap reference",
            Stage::RenderTableReference => "render table reference",
            Stage::PixelmapHeader => "pixelmap header",
            Stage::PixelmapData => "pixelmap data",
            Stage::Actor => "actor",
        };
        f.write_str(name)
    }
}

/// Kind of named resource a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ResourceKind {
    Actor,
    Mesh,
    Material,
    Pixelmap,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Actor => "actor",
            ResourceKind::Mesh => "mesh",
            ResourceKind::Material => "material",
            ResourceKind::Pixelmap => "pixelmap",
        };
        f.write_str(name)
    }
}

/// The error type for `Roadkill` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A decode error together with the file, and the record within it, that failed.
    #[error("{path}{}: {source}", record_label(.record.as_ref()))]
    InFile {
        /// File being loaded.
        path: PathBuf,
        /// Zero-based record index, `None` for the file envelope.
        record: Option<usize>,
        /// The underlying error.
        source: Box<Error>,
    },

    /// The stream ended before a field was complete.
    #[error("unexpected end of file in {stage} at 0x{position:x}")]
    UnexpectedEof {
        /// Stage that was being decoded.
        stage: Stage,
        /// Stream offset of the short read.
        position: u64,
    },

    // ==================== Structural Errors ====================
    /// The resource file envelope is not a file-info chunk of size 8.
    #[error("invalid file header: chunk 0x{chunk_type:x} of size {size} (expected 0x12 of size 8)")]
    InvalidFileHeader {
        /// Chunk tag found at the start of the file.
        chunk_type: u32,
        /// Declared chunk size found at the start of the file.
        size: u32,
    },

    /// A chunk tag did not match the one required at this step.
    #[error("unexpected chunk 0x{found:x} in {stage} at 0x{position:x} (expected 0x{expected:x})")]
    UnexpectedChunk {
        /// Stage that was being decoded.
        stage: Stage,
        /// Required chunk tag.
        expected: u32,
        /// Chunk tag actually read.
        found: u32,
        /// Stream offset of the chunk header.
        position: u64,
    },

    /// A record was not closed by a zero/zero chunk.
    #[error("missing end-of-record chunk after {stage} at 0x{position:x} (found 0x{found:x} of size {size})")]
    MissingSentinel {
        /// Last data stage of the record.
        stage: Stage,
        /// Chunk tag found instead of the sentinel.
        found: u32,
        /// Declared size found instead of zero.
        size: u32,
        /// Stream offset of the chunk header.
        position: u64,
    },

    /// Actor chunks arrived in an order the loading stack cannot apply.
    #[error("invalid actor chunk sequence at 0x{position:x}: {message}")]
    ActorStack {
        /// Description of the stack mismatch.
        message: String,
        /// Stream offset of the offending chunk header.
        position: u64,
    },

    // ==================== Size / Shape Errors ====================
    /// A declared size or entry count cannot be satisfied.
    #[error("size violation in {stage} at 0x{position:x}: {message}")]
    SizeViolation {
        /// Stage that was being decoded.
        stage: Stage,
        /// Stream offset of the chunk header.
        position: u64,
        /// What was declared and what was available.
        message: String,
    },

    /// A face refers to a vertex past the end of the vertex list.
    #[error("face {face} refers to vertex {index} but the mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        /// Face position in the face list.
        face: usize,
        /// Offending vertex index.
        index: u16,
        /// Length of the vertex list.
        vertex_count: usize,
    },

    /// A face refers to a material past the end of the material name list.
    #[error("face {face} uses material {index} but the mesh names {material_count} materials")]
    MaterialIndexOutOfRange {
        /// Face position in the face list.
        face: usize,
        /// Offending 1-based material index.
        index: u16,
        /// Length of the material name list.
        material_count: usize,
    },

    // ==================== Resolution Errors ====================
    /// A named resource is not present in the model.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of resource looked up.
        kind: ResourceKind,
        /// Name that did not resolve.
        name: String,
    },

    // ==================== Texture Errors ====================
    /// The palette cannot be applied to the pixelmap.
    #[error("palette error: {message}")]
    Palette {
        /// What is wrong with the palette or source pixelmap.
        message: String,
    },

    /// Failed to encode a PNG image.
    #[error("failed to encode PNG: {message}")]
    ImageEncode {
        /// The encoding error message.
        message: String,
    },
}

fn record_label(record: Option<&usize>) -> String {
    record.map(|index| format!(", record {index}")).unwrap_or_default()
}

impl Error {
    /// Attach the file and record index a decode error came from.
    pub(crate) fn in_file(self, path: &Path, record: Option<usize>) -> Self {
        Error::InFile {
            path: path.to_path_buf(),
            record,
            source: Box::new(self),
        }
    }

    /// The error with any file context stripped.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InFile { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stage the error was raised in, if it came from a record decoder.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::InFile { source, .. } => source.stage(),
            Error::UnexpectedEof { stage, .. }
            | Error::UnexpectedChunk { stage, .. }
            | Error::MissingSentinel { stage, .. }
            | Error::SizeViolation { stage, .. } => Some(*stage),
            Error::InvalidFileHeader { .. } => Some(Stage::FileHeader),
            Error::ActorStack { .. } => Some(Stage::Actor),
            Error::VertexIndexOutOfRange { .. } => Some(Stage::FaceList),
            Error::MaterialIndexOutOfRange { .. } => Some(Stage::FaceMaterials),
            _ => None,
        }
    }
}

/// A specialized Result type for `Roadkill` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stage() {
        let err = Error::UnexpectedChunk {
            stage: Stage::UvList,
            expected: 0x18,
            found: 0x35,
            position: 0x40,
        };
        assert_eq!(
            err.to_string(),
            "unexpected chunk 0x35 in uv list at 0x40 (expected 0x18)"
        );
        assert_eq!(err.stage(), Some(Stage::UvList));
    }

    #[test]
    fn test_file_context_keeps_stage() {
        let err = Error::MissingSentinel {
            stage: Stage::FaceMaterials,
            found: 0x17,
            size: 12,
            position: 0x1f0,
        }
        .in_file(Path::new("EAGLE.DAT"), Some(2));
        assert_eq!(
            err.to_string(),
            "EAGLE.DAT, record 2: missing end-of-record chunk after face material list at 0x1f0 (found 0x17 of size 12)"
        );
        assert_eq!(err.stage(), Some(Stage::FaceMaterials));
        assert!(matches!(err.root_cause(), Error::MissingSentinel { .. }));

        let envelope = Error::InvalidFileHeader {
            chunk_type: 0x12,
            size: 4,
        }
        .in_file(Path::new("BAD.MAT"), None);
        assert!(envelope.to_string().starts_with("BAD.MAT: invalid file header"));
    }

    #[test]
    fn test_resolution_errors_have_no_stage() {
        let err = Error::NotFound {
            kind: ResourceKind::Material,
            name: "GLASS.MAT".to_string(),
        };
        assert_eq!(err.to_string(), "material not found: GLASS.MAT");
        assert_eq!(err.stage(), None);
    }
}
