//! Pixelmap to PNG conversion

use crate::formats::LoadOptions;
use crate::formats::pixelmap::read_pixelmap_file;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Convert every pixelmap in `path` to `<name>.png` using the first palette in `palette`.
pub fn to_png(
    path: &Path,
    palette: &Path,
    output: Option<&Path>,
    options: &LoadOptions,
) -> anyhow::Result<()> {
    let palettes = read_pixelmap_file(palette, options.revision)?;
    let palette = palettes
        .first()
        .with_context(|| format!("no palette in {}", palette.display()))?;

    let output_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => path.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    fs::create_dir_all(&output_dir)?;

    let pixelmaps = read_pixelmap_file(path, options.revision)?;
    let mut written = 0;
    for pixelmap in &pixelmaps {
        let png = match pixelmap.to_png(palette) {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!("Skipping {}: {e}", pixelmap.name);
                continue;
            }
        };
        let stem = Path::new(&pixelmap.name)
            .file_stem()
            .map_or_else(|| pixelmap.name.clone(), |s| s.to_string_lossy().into_owned());
        let dest = output_dir.join(format!("{stem}.png"));
        fs::write(&dest, png).with_context(|| format!("writing {}", dest.display()))?;
        println!("  {} -> {}", pixelmap.name, dest.display());
        written += 1;
    }

    println!("Converted {written} of {} pixelmaps", pixelmaps.len());
    Ok(())
}
