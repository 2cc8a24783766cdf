use super::image::{RasterImage, INK, PAPER};

/// Map every pixel darker than `threshold` to ink and the rest to paper.
pub fn binarize(img: &RasterImage, threshold: u8) -> RasterImage {
    let mut out = RasterImage::new(img.width, img.height);
    for y in 0..img.height {
        for x in 0..img.width {
            let val = if img.get(x, y) < threshold { INK } else { PAPER };
            out.set(x, y, val);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let buf = vec![0, 127, 128, 255];
        let img = RasterImage::from_buf(4, 1, 4, buf).unwrap();
        let bin = binarize(&img, 128);
        assert_eq!(bin.buf, vec![INK, INK, PAPER, PAPER]);
    }

    #[test]
    fn binarize_drops_stride_padding() {
        let img = RasterImage::from_buf(2, 2, 3, vec![10, 200, 9, 200, 10, 9]).unwrap();
        let bin = binarize(&img, 128);
        assert_eq!(bin.stride, 2);
        assert_eq!(bin.buf, vec![INK, PAPER, PAPER, INK]);
    }
}
