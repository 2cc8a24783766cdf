use std::fmt;

use tracing::{debug, warn};

use super::geometry::Geometry;
use super::image::{RasterImage, INK};
use super::threshold::binarize;
use crate::cell::{Cell, CellSequence};
use crate::error::RasterError;

/// Something worth reporting about a recognized image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No cells were found.
    Empty,
    /// A sample window was neither clearly ink nor clearly paper.
    Ambiguous {
        cell: usize,
        dot: u8,
        dark: u32,
        total: u32,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Empty => write!(f, "no braille cells detected"),
            Diagnostic::Ambiguous {
                cell,
                dot,
                dark,
                total,
            } => write!(
                f,
                "cell {cell} dot {dot}: {dark} of {total} samples are ink"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    pub cells: CellSequence,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read cells back from a canvas drawn with `geometry`.
///
/// The canvas must have the dimensions the rasterizer would produce.
/// Blank cells at the end of the last row cannot be told apart from
/// padding and are dropped.
pub fn recognize(img: &RasterImage, geometry: &Geometry) -> Result<Recognition, RasterError> {
    geometry.validate()?;
    let (cols, rows) = geometry.grid_dims(img.width, img.height)?;
    let bin = binarize(img, geometry.threshold);
    let half = geometry.sample_half();

    let mut out = Recognition::default();
    for row in 0..rows {
        for col in 0..cols {
            let index = out.cells.len();
            let mut value = 0u8;
            for dot in 0..6 {
                let (cx, cy) = geometry.dot_center(col, row, dot);
                let (dark, total) = sample(&bin, cx, cy, half);
                if dark * 2 > total {
                    value |= 1 << dot;
                }
                if dark * 4 > total && dark * 4 < total * 3 {
                    out.diagnostics.push(Diagnostic::Ambiguous {
                        cell: index,
                        dot: dot as u8 + 1,
                        dark,
                        total,
                    });
                }
            }
            out.cells.push(Cell::from_bits_truncate(value));
        }
    }

    let last_row_start = (rows.saturating_sub(1) * cols) as usize;
    while out.cells.len() > last_row_start && out.cells.last().is_some_and(|c| c.is_blank()) {
        out.cells.pop();
    }

    if out.cells.is_empty() {
        warn!(width = img.width, height = img.height, "no braille cells detected");
        out.diagnostics.push(Diagnostic::Empty);
    } else {
        debug!(
            cells = out.cells.len(),
            cols,
            rows,
            ambiguous = out.diagnostics.len(),
            "recognized image"
        );
    }
    Ok(out)
}

/// Count ink pixels in the square window of half-size `half` around (cx, cy).
fn sample(img: &RasterImage, cx: u32, cy: u32, half: u32) -> (u32, u32) {
    let x0 = cx.saturating_sub(half);
    let y0 = cy.saturating_sub(half);
    let x1 = (cx + half).min(img.width.saturating_sub(1));
    let y1 = (cy + half).min(img.height.saturating_sub(1));
    let mut dark = 0;
    let mut total = 0;
    for y in y0..=y1 {
        for x in x0..=x1 {
            total += 1;
            if img.get(x, y) == INK {
                dark += 1;
            }
        }
    }
    (dark, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::render::rasterize;

    fn cells(values: &[u8]) -> CellSequence {
        values.iter().map(|&v| Cell::new(v).unwrap()).collect()
    }

    #[test]
    fn round_trip_two_rows_three_columns() {
        let g = Geometry::default();
        let seq = cells(&[1, 63, 0, 21, 42, 7]);
        let img = rasterize(&seq, 3, &g);
        let rec = recognize(&img, &g).unwrap();
        assert_eq!(rec.cells, seq);
        assert!(rec.diagnostics.is_empty());
    }

    #[test]
    fn round_trip_every_value() {
        let g = Geometry::default();
        let seq: CellSequence = (1..64).map(|v| Cell::new(v).unwrap()).collect();
        let img = rasterize(&seq, 25, &g);
        assert_eq!(recognize(&img, &g).unwrap().cells, seq);
    }

    #[test]
    fn trailing_blanks_of_last_row_are_trimmed() {
        let g = Geometry::default();
        let seq = cells(&[1, 0, 0, 3, 0]);
        let img = rasterize(&seq, 3, &g);
        assert_eq!(recognize(&img, &g).unwrap().cells, cells(&[1, 0, 0, 3]));
    }

    #[test]
    fn blank_canvas_yields_empty_with_diagnostic() {
        let g = Geometry::default();
        let img = rasterize(&cells(&[0, 0]), 25, &g);
        let rec = recognize(&img, &g).unwrap();
        assert!(rec.cells.is_empty());
        assert_eq!(rec.diagnostics, vec![Diagnostic::Empty]);
    }

    #[test]
    fn mismatched_canvas_is_rejected() {
        let g = Geometry::default();
        let img = RasterImage::new(123, 100);
        assert!(matches!(
            recognize(&img, &g),
            Err(RasterError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn gray_ink_below_threshold_still_reads() {
        let g = Geometry::default();
        let seq = cells(&[9]);
        let mut img = rasterize(&seq, 25, &g);
        for px in img.buf.iter_mut() {
            if *px == INK {
                *px = 100;
            }
        }
        assert_eq!(recognize(&img, &g).unwrap().cells, seq);
    }

    #[test]
    fn half_covered_window_is_reported() {
        let g = Geometry::default();
        let (w, h) = g.canvas_size(1, 1);
        let mut img = RasterImage::new(w, h);
        let (cx, cy) = g.dot_center(0, 0, 0);
        // ink the left half of dot 1's window only
        for y in cy - 3..=cy + 3 {
            for x in cx - 3..cx {
                img.set(x, y, INK);
            }
        }
        let rec = recognize(&img, &g).unwrap();
        assert_eq!(
            rec.diagnostics,
            vec![
                Diagnostic::Ambiguous {
                    cell: 0,
                    dot: 1,
                    dark: 21,
                    total: 49
                },
                Diagnostic::Empty
            ]
        );
    }
}
