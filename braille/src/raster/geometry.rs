use crate::error::RasterError;

/// Layout of cells and dots on a canvas, in pixels.
///
/// Cells sit on a grid with `margin` pixels around and between them.
/// Dot `i` (0-based) is in column `i / 3` and row `i % 3` of its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Geometry {
    pub cell: u32,
    pub margin: u32,
    pub radius: u32,
    /// Samples darker than this are ink.
    pub threshold: u8,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            cell: 40,
            margin: 20,
            radius: 6,
            threshold: 128,
        }
    }
}

impl Geometry {
    /// Offset of dot `index` from its cell's top-left corner.
    #[inline]
    pub fn dot_offset(&self, index: usize) -> (u32, u32) {
        let col = (index / 3) as u32;
        let row = (index % 3) as u32;
        (self.cell * (2 * col + 1) / 4, self.cell * (2 * row + 1) / 6)
    }

    /// Top-left corner of the cell at grid position (col, row).
    #[inline]
    pub fn cell_origin(&self, col: u32, row: u32) -> (u32, u32) {
        let pitch = self.cell + self.margin;
        (self.margin + col * pitch, self.margin + row * pitch)
    }

    pub fn dot_center(&self, col: u32, row: u32, index: usize) -> (u32, u32) {
        let (ox, oy) = self.cell_origin(col, row);
        let (dx, dy) = self.dot_offset(index);
        (ox + dx, oy + dy)
    }

    /// Half-size of the square sampling window around a dot centre.
    pub fn sample_half(&self) -> u32 {
        (self.radius / 2).max(1)
    }

    pub fn canvas_size(&self, cols: u32, rows: u32) -> (u32, u32) {
        let pitch = self.cell + self.margin;
        (self.margin + cols * pitch, self.margin + rows * pitch)
    }

    /// Grid columns and rows of a canvas drawn with this geometry.
    pub fn grid_dims(&self, width: u32, height: u32) -> Result<(u32, u32), RasterError> {
        let pitch = self.cell + self.margin;
        let fits = |dim: u32| dim >= self.margin && (dim - self.margin) % pitch == 0;
        if pitch == 0 || !fits(width) || !fits(height) {
            return Err(RasterError::GeometryMismatch {
                width,
                height,
                cell: self.cell,
                margin: self.margin,
            });
        }
        Ok(((width - self.margin) / pitch, (height - self.margin) / pitch))
    }

    /// Reject geometries whose dots leave the cell or whose sampling
    /// windows reach a neighbouring dot.
    pub fn validate(&self) -> Result<(), RasterError> {
        if self.cell == 0 || self.radius == 0 {
            return Err(RasterError::InvalidGeometry(
                "cell size and dot radius must be positive".into(),
            ));
        }
        for index in 0..6 {
            let (dx, dy) = self.dot_offset(index);
            let lo = dx.min(dy);
            let hi = dx.max(dy);
            if lo < self.radius || hi + self.radius >= self.cell {
                return Err(RasterError::InvalidGeometry(format!(
                    "dot {} of radius {} leaves a {}px cell",
                    index + 1,
                    self.radius,
                    self.cell
                )));
            }
        }
        let (x0, y0) = self.dot_offset(0);
        let (_, y1) = self.dot_offset(1);
        let (_, y2) = self.dot_offset(2);
        let (x3, _) = self.dot_offset(3);
        let spacing = (x3 - x0).min(y1 - y0).min(y2 - y1);
        if spacing <= self.radius + self.sample_half() {
            return Err(RasterError::InvalidGeometry(format!(
                "dot spacing {spacing}px is too small for radius {} and sample window {}",
                self.radius,
                self.sample_half()
            )));
        }
        Ok(())
    }
}
