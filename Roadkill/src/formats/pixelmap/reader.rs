//! Pixelmap record decoding

use super::Pixelmap;
use crate::error::{Error, Result, Stage};
use crate::formats::chunk::{self, ChunkHeader};
use crate::formats::common::{BinaryReader, FormatRevision, open_resource};
use crate::formats::resource::read_file_header;
use std::io::{BufRead, Seek};
use std::path::Path;

/// Read every pixelmap in a pixelmap file.
pub fn read_pixelmap_file<P: AsRef<Path>>(path: P, revision: FormatRevision) -> Result<Vec<Pixelmap>> {
    let path = path.as_ref();
    let mut reader = open_resource(path).map_err(|e| e.in_file(path, None))?;
    read_file_header(&mut reader).map_err(|e| e.in_file(path, None))?;
    let mut pixelmaps = Vec::new();
    for (record, pixelmap) in PixelmapReader::new(&mut reader, revision).enumerate() {
        pixelmaps.push(pixelmap.map_err(|e| e.in_file(path, Some(record)))?);
    }
    tracing::info!("Loaded {} pixelmaps from {}", pixelmaps.len(), path.display());
    Ok(pixelmaps)
}

/// Streams pixelmap records out of a reader positioned after the envelope.
pub struct PixelmapReader<'a, R> {
    reader: &'a mut BinaryReader<R>,
    revision: FormatRevision,
    done: bool,
}

impl<'a, R: BufRead + Seek> PixelmapReader<'a, R> {
    pub fn new(reader: &'a mut BinaryReader<R>, revision: FormatRevision) -> Self {
        Self {
            reader,
            revision,
            done: false,
        }
    }
}

impl<R: BufRead + Seek> Iterator for PixelmapReader<'_, R> {
    type Item = Result<Pixelmap>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = read_pixelmap(self.reader, self.revision).transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Decode one pixelmap record.
///
/// Returns `Ok(None)` if the stream is exhausted before the record starts.
/// A payload shorter than its declared size is an error, never a short buffer.
pub fn read_pixelmap<R: BufRead + Seek>(
    reader: &mut BinaryReader<R>,
    revision: FormatRevision,
) -> Result<Option<Pixelmap>> {
    if reader.at_end()? {
        return Ok(None);
    }

    reader.set_stage(Stage::PixelmapHeader);
    ChunkHeader::read(reader)?.expect(Stage::PixelmapHeader, chunk::PIXELMAP_HEADER)?;
    let marker = reader.read_u8()?;
    let metadata = reader.read_u16()?;
    let width = reader.read_u16()?;
    let height = reader.read_u16()?;
    let used_width = reader.read_u16()?;
    let used_height = reader.read_u16()?;
    let name = reader.read_c_string()?;

    reader.set_stage(Stage::PixelmapData);
    let header = ChunkHeader::read(reader)?.expect(Stage::PixelmapData, chunk::PIXELMAP_DATA)?;
    let first = reader.read_u32()?;
    let second = reader.read_u32()?;
    let (units, unit_bytes, reserved) = match revision {
        FormatRevision::Legacy => (first, 1, second),
        FormatRevision::Current => (first, second, 0),
    };
    let payload_len = u64::from(units) * u64::from(unit_bytes);
    let Ok(len) = usize::try_from(payload_len) else {
        return Err(Error::SizeViolation {
            stage: Stage::PixelmapData,
            position: header.position,
            message: format!("payload of {payload_len} bytes does not fit in memory"),
        });
    };
    reader.require(payload_len, header.position, "pixelmap payload")?;
    let data = reader.read_bytes(len)?;

    chunk::read_sentinel(reader, Stage::PixelmapData)?;

    tracing::debug!(
        "Pixelmap {name} ({width}x{height} use {used_width}x{used_height}): {units} units of {unit_bytes} bytes"
    );
    Ok(Some(Pixelmap {
        name,
        marker,
        width,
        height,
        used_width,
        used_height,
        metadata,
        units,
        unit_bytes,
        reserved,
        data,
    }))
}
