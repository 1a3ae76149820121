//! Decode options shared by every record reader

/// On-disk encoding revision of a resource file.
///
/// The two revisions differ only in numeric encodings, so a single value is
/// picked per file and threaded through every decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub enum FormatRevision {
    /// Early files: Q16.16 coordinates, explicit pixelmap payload size,
    /// two throwaway words closing a mesh record.
    Legacy,
    /// Shipped files: raw float coordinates, units x unit-bytes pixelmap
    /// payload, zero/zero chunk closing a mesh record.
    #[default]
    Current,
}

impl FormatRevision {
    /// Decode a vertex or UV component.
    pub fn decode_scalar(self, raw: u32) -> f32 {
        match self {
            FormatRevision::Legacy => (f64::from(raw as i32) / 65536.0) as f32,
            FormatRevision::Current => f32::from_bits(raw),
        }
    }

    /// Inverse of [`FormatRevision::decode_scalar`].
    pub fn encode_scalar(self, value: f32) -> u32 {
        match self {
            FormatRevision::Legacy => (f64::from(value) * 65536.0).round() as i32 as u32,
            FormatRevision::Current => value.to_bits(),
        }
    }
}

/// Options for loading resource files.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Encoding revision of the files being read.
    pub revision: FormatRevision,
    /// Compute per-vertex normals for each mesh as it is loaded.
    pub compute_normals: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            revision: FormatRevision::Current,
            compute_normals: true,
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encoding revision.
    #[must_use]
    pub fn with_revision(mut self, revision: FormatRevision) -> Self {
        self.revision = revision;
        self
    }

    /// Shorthand for [`FormatRevision::Legacy`].
    #[must_use]
    pub fn legacy(self) -> Self {
        self.with_revision(FormatRevision::Legacy)
    }

    /// Enable or disable normal computation on load.
    #[must_use]
    pub fn with_normals(mut self, compute: bool) -> Self {
        self.compute_normals = compute;
        self
    }
}
