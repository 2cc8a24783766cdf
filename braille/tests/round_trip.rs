/// Round-trip laws of the codecs, the segmenter and the raster path.
use braille::cell::{Cell, CellSequence};
use braille::codec::{bits_to_cells, cells_to_bits, cells_to_points, points_to_cells};
use braille::raster::{rasterize, recognize, Geometry};
use braille::segment::segment;
use braille::CodecError;

/// Deterministic pseudo-random cell sequences (LCG).
fn sequences() -> Vec<CellSequence> {
    let mut state: u32 = 0x2545_f491;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 24) as u8
    };
    (0..40)
        .map(|len| (0..len).map(|_| Cell::from_bits_truncate(next())).collect())
        .collect()
}

#[test]
fn bits_and_points_round_trip() {
    for seq in sequences() {
        assert_eq!(bits_to_cells(&cells_to_bits(&seq)).unwrap(), seq);
        assert_eq!(points_to_cells(&cells_to_points(&seq)).unwrap(), seq);
    }
}

#[test]
fn bit_strings_never_truncate() {
    for len in [1usize, 5, 7, 11, 13] {
        let bits = "1".repeat(len);
        assert_eq!(bits_to_cells(&bits), Err(CodecError::BitLength(len)));
    }
}

#[test]
fn raster_round_trip_with_reference_geometry() {
    let geometry = Geometry {
        cell: 40,
        margin: 20,
        radius: 6,
        threshold: 128,
    };
    for seq in sequences() {
        // the last cell must not be blank: trailing blanks are dropped
        let mut seq = seq;
        seq.push(Cell::from_bits_truncate(0b001001));
        for wrap in [3, 5, 25] {
            let img = rasterize(&seq, wrap, &geometry);
            let rec = recognize(&img, &geometry).unwrap();
            assert_eq!(rec.cells, seq, "wrap {wrap}");
        }
    }
}

#[test]
fn raster_round_trip_two_rows_three_columns() {
    let geometry = Geometry::default();
    let seq: CellSequence = [0b111111, 0b000001, 0b100100, 0b010010, 0b001001, 0b110000]
        .iter()
        .map(|&v| Cell::from_bits_truncate(v))
        .collect();
    let img = rasterize(&seq, 3, &geometry);
    assert_eq!(geometry.grid_dims(img.width, img.height).unwrap(), (3, 2));
    assert_eq!(recognize(&img, &geometry).unwrap().cells, seq);
}

#[test]
fn segmentation_is_lossless() {
    for text in [
        "",
        "a",
        "ABC 123 한글",
        "mixed한글text42!?",
        "  spaces\tand\ttabs  ",
        "ㄱㄴㄷ ᄀ é ß 東京",
    ] {
        let joined: String = segment(text).iter().map(|r| r.text).collect();
        assert_eq!(joined, text);
    }
}
