//! Pixelmap (`.PIX`) records
//!
//! A pixelmap is an indexed-color image: a header chunk with dimensions and
//! name, then a data chunk with the raw payload. Palettes are pixelmaps too,
//! with four bytes per entry.

mod palette;
mod reader;

pub use reader::{PixelmapReader, read_pixelmap, read_pixelmap_file};

use serde::Serialize;

/// A decoded pixelmap.
///
/// `Clone` copies the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pixelmap {
    pub name: String,
    /// Leading header byte. Meaning unknown.
    pub marker: u8,
    /// Full buffer dimensions.
    pub width: u16,
    pub height: u16,
    /// Part of the buffer holding image content.
    pub used_width: u16,
    pub used_height: u16,
    /// Header word stored right after the marker. Row stride in bytes for
    /// most files, but not reliably so across revisions.
    pub metadata: u16,
    /// Payload element count.
    pub units: u32,
    /// Bytes per payload element.
    pub unit_bytes: u32,
    /// Second data word of a legacy payload. Zero otherwise.
    pub reserved: u32,
    pub data: Vec<u8>,
}

impl Pixelmap {
    /// Expected payload length in bytes.
    pub fn payload_len(&self) -> u64 {
        u64::from(self.units) * u64::from(self.unit_bytes)
    }

    pub fn info(&self) -> PixelmapInfo {
        PixelmapInfo {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            used_width: self.used_width,
            used_height: self.used_height,
            units: self.units,
            unit_bytes: self.unit_bytes,
            payload_bytes: self.data.len(),
        }
    }
}

/// Pixelmap summary.
#[derive(Debug, Clone, Serialize)]
pub struct PixelmapInfo {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub used_width: u16,
    pub used_height: u16,
    pub units: u32,
    pub unit_bytes: u32,
    pub payload_bytes: usize,
}
