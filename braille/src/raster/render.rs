use super::geometry::Geometry;
use super::image::{RasterImage, INK};
use crate::cell::Cell;

/// Grid columns and rows needed for `count` cells wrapped at `wrap`.
pub fn grid_for(count: usize, wrap: usize) -> (u32, u32) {
    let wrap = wrap.max(1);
    let cols = count.min(wrap);
    let rows = count.div_ceil(wrap);
    (cols as u32, rows as u32)
}

/// Draw `cells` row by row, `wrap` cells per row.
pub fn rasterize(cells: &[Cell], wrap: usize, geometry: &Geometry) -> RasterImage {
    let (cols, rows) = grid_for(cells.len(), wrap);
    let (width, height) = geometry.canvas_size(cols, rows);
    let mut img = RasterImage::new(width, height);

    for (idx, cell) in cells.iter().enumerate() {
        let col = (idx % wrap.max(1)) as u32;
        let row = (idx / wrap.max(1)) as u32;
        for dot in 0..6 {
            if cell.has_dot(dot as u8 + 1) {
                let (cx, cy) = geometry.dot_center(col, row, dot);
                img.fill_disc(cx, cy, geometry.radius, INK);
            }
        }
    }
    img
}
