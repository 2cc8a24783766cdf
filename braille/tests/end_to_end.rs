/// End-to-end tests: text → cells → every representation → text.
use braille::cell::Cell;
use braille::codec;
use braille::marker::{cell_digit, Marker, MarkerScheme};
use braille::translate::memory::{english_grade1, english_grade2, MemoryService, MemoryTable};
use braille::{Input, Language, Translator, TranslatorConfig};

/// English built-ins plus a small Hangul table on non-reserved cells.
fn service() -> MemoryService {
    let hangul = MemoryTable::new()
        .with("한", &[41])
        .with("글", &[27])
        .with("안", &[37])
        .with("녕", &[35]);
    MemoryService::new()
        .with_table("en-us-g1.ctb", english_grade1())
        .with_table("en-us-g2.ctb", english_grade2())
        .with_table("ko-g1.ctb", hangul.clone())
        .with_table("ko-g2.ctb", hangul)
}

fn translator() -> Translator<MemoryService> {
    Translator::new(service(), TranslatorConfig::default()).unwrap()
}

/// Markers in reading order, collapsing consecutive capitals into one
/// capital-mode transition.
fn transitions(cells: &[Cell], scheme: &MarkerScheme) -> Vec<Marker> {
    let mut out: Vec<Marker> = Vec::new();
    let mut prev: Option<Marker> = None;
    for &c in cells {
        let m = scheme.marker(c);
        if let Some(m) = m {
            if !(m == Marker::Capital && prev == Some(Marker::Capital)) {
                out.push(m);
            }
        }
        prev = m;
    }
    out
}

#[test]
fn mixed_script_markers_appear_once_in_order() {
    let t = translator();
    let scheme = MarkerScheme::default();
    let report = t.encode("ABC 123 한글");
    assert!(report.is_complete(), "{:?}", report.failures);

    assert_eq!(
        transitions(&report.cells, &scheme),
        vec![
            Marker::Capital,
            Marker::NumberSign,
            Marker::Switch(Language::Hangul),
        ]
    );

    // digit cells follow the number sign and differ from letter cells
    let ns = report
        .cells
        .iter()
        .position(|&c| c == scheme.number_sign)
        .unwrap();
    let digits: String = report.cells[ns + 1..ns + 4]
        .iter()
        .filter_map(|&c| cell_digit(c))
        .collect();
    assert_eq!(digits, "123");
    let letters = english_grade1().forward("abcdefghij").unwrap();
    for d in &report.cells[ns + 1..ns + 4] {
        assert!(!letters.contains(d));
    }

    let decoded = t.decode(&report.cells).unwrap();
    assert_eq!(decoded.text, "ABC 123 한글");
}

#[test]
fn full_pipeline_round_trips_mixed_text() {
    let t = translator();
    for text in [
        "안녕 Hello, World!",
        "The 3 things and 한글.",
        "line one\nLINE two\n\n42",
        "x",
        "",
    ] {
        let report = t.encode(text);
        assert!(report.is_complete(), "{text}: {:?}", report.failures);
        assert_eq!(t.decode(&report.cells).unwrap().text, text, "{text}");
    }
}

#[test]
fn every_representation_decodes_to_the_same_text() {
    let t = translator();
    let text = "Shout 7 times, 한글";
    let cells = t.encode(text).cells;

    let inputs = [
        Input::detect(&codec::cells_to_unicode(&cells)),
        Input::detect(&codec::cells_to_points(&cells)),
        Input::detect(&codec::cells_to_bits(&cells)),
        Input::Image(t.render(&cells)),
    ];
    for input in &inputs {
        let report = t.decode_input(input).unwrap();
        assert_eq!(report.text, text, "{:?}", input.kind());
    }
}

#[test]
fn json_bit_arrays_round_trip_through_serde() {
    let t = translator();
    let cells = t.encode("Json 1").cells;
    let json = serde_json::to_string(&codec::cells_to_bit_arrays(&cells)).unwrap();
    let arrays: Vec<Vec<u8>> = serde_json::from_str(&json).unwrap();
    let back = codec::bit_arrays_to_cells(&arrays).unwrap();
    assert_eq!(t.decode(&back).unwrap().text, "Json 1");
}

#[test]
fn failed_piece_does_not_stop_siblings() {
    let t = translator();
    // '(' has no rule in the built-in tables
    let report = t.encode("ok ( ok");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].position, 3);
    assert_eq!(report.results.len(), 2);
    let decoded = t.decode(&report.cells).unwrap();
    assert_eq!(decoded.text, "ok  ok");
}

#[test]
fn malformed_indicator_sequence_is_rejected() {
    let t = translator();
    let scheme = MarkerScheme::default();
    let cells = vec![scheme.capital, Cell::BLANK];
    assert!(t.decode(&cells).is_err());
}
