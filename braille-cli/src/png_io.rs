//! PNG output and image loading.

use std::path::Path;

use anyhow::{Context, Result};
use braille::raster::RasterImage;

pub fn write_png(img: &RasterImage, path: &Path) -> Result<()> {
    write_grayscale_png(path, &img.to_packed(), img.width, img.height)
}

fn write_grayscale_png(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let w = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("writing PNG header for {}", path.display()))?;
    writer
        .write_image_data(pixels)
        .with_context(|| format!("writing PNG data for {}", path.display()))?;

    Ok(())
}

/// Load a PNG or JPEG as grayscale.
pub fn load_image(path: &Path) -> Result<RasterImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?
        .into_luma8();

    let width = img.width();
    let height = img.height();
    let pixels = img.into_raw();

    RasterImage::from_buf(width, height, width, pixels)
        .with_context(|| format!("unexpected pixel layout in {}", path.display()))
}

pub fn is_image_path(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use braille::raster::{rasterize, recognize, Geometry};
    use braille::Cell;

    #[test]
    fn png_round_trip_preserves_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("braille.png");
        let geometry = Geometry::default();
        let cells: Vec<Cell> = [1u8, 3, 9, 63, 0, 21]
            .iter()
            .map(|&v| Cell::from_bits_truncate(v))
            .collect();
        write_png(&rasterize(&cells, 4, &geometry), &path).unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!(recognize(&loaded, &geometry).unwrap().cells, cells);
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_path("scan.PNG"));
        assert!(is_image_path("a/b.jpeg"));
        assert!(!is_image_path("cells.json"));
    }
}
