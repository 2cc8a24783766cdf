use crate::error::RasterError;

/// Ink value of a raised dot.
pub const INK: u8 = 0;
/// Background value.
pub const PAPER: u8 = 255;

/// Grayscale image with row-major pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub buf: Vec<u8>,
}

impl RasterImage {
    /// Create a blank (white) canvas.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width;
        let buf = vec![PAPER; stride as usize * height as usize];
        Self {
            width,
            height,
            stride,
            buf,
        }
    }

    /// Wrap existing pixel data.
    ///
    /// `stride` must be >= `width`, and `buf` must hold `stride * height` bytes.
    pub fn from_buf(width: u32, height: u32, stride: u32, buf: Vec<u8>) -> Result<Self, RasterError> {
        if stride < width {
            return Err(RasterError::InvalidGeometry(format!(
                "stride {stride} is smaller than width {width}"
            )));
        }
        let expected = stride as usize * height as usize;
        if buf.len() < expected {
            return Err(RasterError::BufferSize {
                len: buf.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            buf,
        })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.buf[(y * self.stride + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u8) {
        self.buf[(y * self.stride + x) as usize] = val;
    }

    /// Fill a disc of radius `r` centred on (cx, cy), clipped to the canvas.
    pub fn fill_disc(&mut self, cx: u32, cy: u32, r: u32, val: u8) {
        let r2 = (r * r) as i64;
        let x0 = cx.saturating_sub(r);
        let y0 = cy.saturating_sub(r);
        let x1 = (cx + r).min(self.width.saturating_sub(1));
        let y1 = (cy + r).min(self.height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as i64 - cx as i64;
                let dy = y as i64 - cy as i64;
                if dx * dx + dy * dy <= r2 {
                    self.set(x, y, val);
                }
            }
        }
    }

    /// Pixel data without row padding.
    pub fn to_packed(&self) -> Vec<u8> {
        if self.stride == self.width {
            return self.buf[..(self.width * self.height) as usize].to_vec();
        }
        (0..self.height)
            .flat_map(|y| {
                let start = (y * self.stride) as usize;
                self.buf[start..start + self.width as usize].iter().copied()
            })
            .collect()
    }
}
