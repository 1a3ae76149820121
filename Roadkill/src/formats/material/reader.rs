//! Material record decoding

use super::{MATERIAL_PARAM_COUNT, Material};
use crate::error::{Result, Stage};
use crate::formats::chunk::{self, ChunkHeader};
use crate::formats::common::{BinaryReader, open_resource};
use crate::formats::resource::read_file_header;
use std::io::{BufRead, Seek};
use std::path::Path;

/// Read every material in a material file.
pub fn read_material_file<P: AsRef<Path>>(path: P) -> Result<Vec<Material>> {
    let path = path.as_ref();
    let mut reader = open_resource(path).map_err(|e| e.in_file(path, None))?;
    read_file_header(&mut reader).map_err(|e| e.in_file(path, None))?;
    let mut materials = Vec::new();
    for (record, material) in MaterialReader::new(&mut reader).enumerate() {
        materials.push(material.map_err(|e| e.in_file(path, Some(record)))?);
    }
    tracing::info!("Loaded {} materials from {}", materials.len(), path.display());
    Ok(materials)
}

/// Streams material records out of a reader positioned after the envelope.
pub struct MaterialReader<'a, R> {
    reader: &'a mut BinaryReader<R>,
    done: bool,
}

impl<'a, R: BufRead + Seek> MaterialReader<'a, R> {
    pub fn new(reader: &'a mut BinaryReader<R>) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead + Seek> Iterator for MaterialReader<'_, R> {
    type Item = Result<Material>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = read_material(self.reader).transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Decode one material record.
///
/// Returns `Ok(None)` if the stream is exhausted before the record starts.
pub fn read_material<R: BufRead + Seek>(reader: &mut BinaryReader<R>) -> Result<Option<Material>> {
    if reader.at_end()? {
        return Ok(None);
    }

    reader.set_stage(Stage::MaterialDescription);
    let header =
        ChunkHeader::read(reader)?.expect(Stage::MaterialDescription, chunk::MATERIAL_DESCRIPTION)?;
    reader.require(
        MATERIAL_PARAM_COUNT as u64 * 4 + 1,
        header.position,
        "material description",
    )?;
    let mut params = [0.0f32; MATERIAL_PARAM_COUNT];
    for param in &mut params {
        *param = reader.read_f32_bits()?;
    }
    let name = reader.read_c_string()?;

    reader.set_stage(Stage::PixelmapReference);
    ChunkHeader::read(reader)?.expect(Stage::PixelmapReference, chunk::PIXELMAP_REFERENCE)?;
    let pixelmap_name = reader.read_c_string()?;

    reader.set_stage(Stage::RenderTableReference);
    ChunkHeader::read(reader)?.expect(Stage::RenderTableReference, chunk::RENDER_TABLE_REFERENCE)?;
    let render_table_name = reader.read_c_string()?;

    chunk::read_sentinel(reader, Stage::RenderTableReference)?;

    tracing::debug!("Material {name}: pixelmap {pixelmap_name:?}, table {render_table_name:?}");
    Ok(Some(Material {
        name,
        params,
        pixelmap_name,
        render_table_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::formats::common::FormatRevision;
    use crate::formats::writer::ResourceWriter;
    use std::io::Cursor;

    fn glass() -> Material {
        let mut params = [0.0; MATERIAL_PARAM_COUNT];
        params[0] = 1.0;
        params[5] = -0.5;
        params[11] = 128.0;
        Material {
            name: "GLASS.MAT".to_string(),
            params,
            pixelmap_name: "GLASS.PIX".to_string(),
            render_table_name: "SHADE.TAB".to_string(),
        }
    }

    fn reader(bytes: Vec<u8>) -> BinaryReader<Cursor<Vec<u8>>> {
        BinaryReader::new(Cursor::new(bytes)).unwrap()
    }

    fn encode(material: &Material) -> Vec<u8> {
        let mut w = ResourceWriter::new(Vec::new(), FormatRevision::Current);
        w.write_material(material).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_decode_material() {
        let mut r = reader(encode(&glass()));
        assert_eq!(read_material(&mut r).unwrap(), Some(glass()));
        assert_eq!(read_material(&mut r).unwrap(), None);
    }

    #[test]
    fn test_empty_references_are_valid() {
        let mut material = glass();
        material.pixelmap_name.clear();
        let mut r = reader(encode(&material));
        let decoded = read_material(&mut r).unwrap().unwrap();
        assert!(!decoded.has_pixelmap());
    }

    #[test]
    fn test_missing_sentinel_fails_record() {
        let mut bytes = encode(&glass());
        bytes.truncate(bytes.len() - 8);
        bytes.extend_from_slice(&[0, 0, 0, 0x04, 0, 0, 0, 0x40]);
        let mut r = reader(bytes);
        assert!(matches!(
            read_material(&mut r),
            Err(Error::MissingSentinel {
                stage: Stage::RenderTableReference,
                found: 0x04,
                ..
            })
        ));
    }

    #[test]
    fn test_absent_sentinel_is_eof() {
        let mut bytes = encode(&glass());
        bytes.truncate(bytes.len() - 8);
        let mut r = reader(bytes);
        assert!(matches!(
            read_material(&mut r),
            Err(Error::UnexpectedEof {
                stage: Stage::EndOfRecord,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_first_chunk() {
        let mut r = reader(vec![0, 0, 0, 0x03, 0, 0, 0, 0]);
        assert!(matches!(
            read_material(&mut r),
            Err(Error::UnexpectedChunk {
                stage: Stage::MaterialDescription,
                expected: 0x04,
                ..
            })
        ));
    }
}
