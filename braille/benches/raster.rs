use criterion::{black_box, criterion_group, criterion_main, Criterion};

use braille::cell::{Cell, CellSequence};
use braille::raster::{rasterize, recognize, Geometry};
use braille::{MemoryService, Translator, TranslatorConfig};

fn sample_cells(n: usize) -> CellSequence {
    (0..n).map(|i| Cell::from_bits_truncate((i * 37 % 63 + 1) as u8)).collect()
}

fn bench_rasterize(c: &mut Criterion) {
    let geometry = Geometry::default();
    let cells = sample_cells(100);
    c.bench_function("rasterize (100 cells, 25 per row)", |b| {
        b.iter(|| black_box(rasterize(black_box(&cells), 25, &geometry)));
    });
}

fn bench_recognize(c: &mut Criterion) {
    let geometry = Geometry::default();
    let img = rasterize(&sample_cells(100), 25, &geometry);
    c.bench_function("recognize (100 cells, 25 per row)", |b| {
        b.iter(|| black_box(recognize(black_box(&img), &geometry)));
    });
}

fn bench_encode(c: &mut Criterion) {
    let config = TranslatorConfig {
        timeout: None,
        ..TranslatorConfig::default()
    };
    let translator = match Translator::new(MemoryService::english(), config) {
        Ok(t) => t,
        Err(e) => panic!("built-in config rejected: {e}"),
    };
    let text = "The other 42 things, AND then some shouting with children.";
    c.bench_function("encode english sentence", |b| {
        b.iter(|| black_box(translator.encode(black_box(text))));
    });
}

criterion_group!(benches, bench_rasterize, bench_recognize, bench_encode);
criterion_main!(benches);
