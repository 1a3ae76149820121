//! Palette remapping and PNG export

use super::Pixelmap;
use crate::error::{Error, Result};
use image::{ImageBuffer, RgbaImage};

/// Bytes per entry in a palette pixelmap: inverted alpha, then R, G, B.
pub const PALETTE_ENTRY_BYTES: u32 = 4;

impl Pixelmap {
    /// Expand an 8-bit indexed pixelmap to RGBA through `palette`.
    ///
    /// Index 0 is transparent black. The result keeps the source's name and
    /// dimensions with four bytes per unit.
    pub fn remap_via_palette(&self, palette: &Pixelmap) -> Result<Pixelmap> {
        if self.unit_bytes != 1 {
            return Err(Error::Palette {
                message: format!(
                    "{} has {} bytes per unit, expected indexed 1",
                    self.name, self.unit_bytes
                ),
            });
        }
        if palette.unit_bytes < PALETTE_ENTRY_BYTES {
            return Err(Error::Palette {
                message: format!(
                    "palette {} has {} bytes per entry, expected at least {PALETTE_ENTRY_BYTES}",
                    palette.name, palette.unit_bytes
                ),
            });
        }

        let stride = palette.unit_bytes as usize;
        let mut data = Vec::with_capacity(self.data.len() * 4);
        for &index in &self.data {
            if index == 0 {
                data.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            let at = usize::from(index) * stride;
            let Some(entry) = palette.data.get(at..at + 4) else {
                return Err(Error::Palette {
                    message: format!(
                        "index {index} is past the end of palette {} ({} entries)",
                        palette.name,
                        palette.data.len() / stride
                    ),
                });
            };
            data.extend_from_slice(&[entry[1], entry[2], entry[3], 255 - entry[0]]);
        }

        Ok(Pixelmap {
            unit_bytes: PALETTE_ENTRY_BYTES,
            data,
            ..self.clone()
        })
    }

    /// Encode the used area as PNG, colored through `palette`.
    pub fn to_png(&self, palette: &Pixelmap) -> Result<Vec<u8>> {
        let rgba = self.remap_via_palette(palette)?;
        let width = u32::from(self.width);
        let height = u32::from(self.height);
        let expected = width as usize * height as usize * 4;
        if rgba.data.len() < expected {
            return Err(Error::ImageEncode {
                message: format!(
                    "{} holds {} pixels, {width}x{height} needs {}",
                    self.name,
                    rgba.data.len() / 4,
                    expected / 4
                ),
            });
        }

        let mut full = rgba.data;
        full.truncate(expected);
        let img: RgbaImage = ImageBuffer::from_raw(width, height, full).ok_or_else(|| {
            Error::ImageEncode {
                message: "failed to create image buffer".to_string(),
            }
        })?;
        let used_width = u32::from(self.used_width).clamp(1, width.max(1));
        let used_height = u32::from(self.used_height).clamp(1, height.max(1));
        let used = image::imageops::crop_imm(&img, 0, 0, used_width, used_height).to_image();

        let mut png_data = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
        used.write_with_encoder(encoder)
            .map_err(|e| Error::ImageEncode {
                message: e.to_string(),
            })?;

        tracing::debug!("Encoded {} as {used_width}x{used_height} PNG", self.name);
        Ok(png_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Pixelmap {
        let mut data = vec![0u8; 4 * 3];
        data[4..8].copy_from_slice(&[0, 255, 0, 0]);
        data[8..12].copy_from_slice(&[128, 10, 20, 30]);
        Pixelmap {
            name: "DRRENDER.PAL".to_string(),
            width: 1,
            height: 3,
            used_width: 1,
            used_height: 3,
            units: 3,
            unit_bytes: 4,
            data,
            ..Pixelmap::default()
        }
    }

    fn image() -> Pixelmap {
        Pixelmap {
            name: "TINY.PIX".to_string(),
            width: 2,
            height: 2,
            used_width: 2,
            used_height: 1,
            units: 4,
            unit_bytes: 1,
            data: vec![0, 1, 2, 1],
            ..Pixelmap::default()
        }
    }

    #[test]
    fn test_remap() {
        let rgba = image().remap_via_palette(&palette()).unwrap();
        assert_eq!(rgba.unit_bytes, 4);
        assert_eq!(rgba.units, 4);
        assert_eq!(
            rgba.data,
            vec![0, 0, 0, 0, 255, 0, 0, 255, 10, 20, 30, 127, 255, 0, 0, 255]
        );
    }

    #[test]
    fn test_index_past_palette() {
        let mut pixelmap = image();
        pixelmap.data[3] = 9;
        assert!(matches!(
            pixelmap.remap_via_palette(&palette()),
            Err(Error::Palette { .. })
        ));
    }

    #[test]
    fn test_rgb_source_rejected() {
        let mut pixelmap = image();
        pixelmap.unit_bytes = 3;
        assert!(pixelmap.remap_via_palette(&palette()).is_err());
    }

    #[test]
    fn test_png_crops_to_used_area() {
        let png = image().to_png(&palette()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.height(), 1);
    }
}
