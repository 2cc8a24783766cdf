//! Text ↔ cells, end to end.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cell::{Cell, CellSequence};
use crate::codec;
use crate::config::TranslatorConfig;
use crate::error::{CodecError, ConfigError, Error, RasterError};
use crate::format::Input;
use crate::mode;
use crate::raster::{self, Diagnostic, RasterImage, Recognition};
use crate::segment::{classify_text, TextScript};
use crate::stats::TranslationStats;
use crate::translate::orchestrator::Orchestrator;
use crate::translate::{TranslationFailure, TranslationResult, TranslationService};

/// Outcome of encoding one text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EncodeReport {
    pub cells: CellSequence,
    pub script: TextScript,
    pub results: Vec<TranslationResult>,
    /// Pieces that produced no cells. Their text is missing from `cells`.
    pub failures: Vec<TranslationFailure>,
}

impl EncodeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn unicode(&self) -> String {
        codec::cells_to_unicode(&self.cells)
    }
}

/// Outcome of decoding one cell sequence.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodeReport {
    pub text: String,
    pub failures: Vec<TranslationFailure>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Encoder and decoder over a translation service.
pub struct Translator<S> {
    config: TranslatorConfig,
    orchestrator: Orchestrator<S>,
}

impl<S: TranslationService> Translator<S> {
    pub fn new(service: S, config: TranslatorConfig) -> Result<Self, ConfigError> {
        Self::with_shared(Arc::new(service), config)
    }

    pub fn with_shared(service: Arc<S>, config: TranslatorConfig) -> Result<Self, ConfigError> {
        let orchestrator = Orchestrator::new(service, &config)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator<S> {
        &self.orchestrator
    }

    pub fn encode(&self, text: &str) -> EncodeReport {
        let plan = mode::plan(text, self.config.default_language);
        let outcomes = self.orchestrator.forward_all(&plan.pieces);

        let mut translations = Vec::with_capacity(outcomes.len());
        let mut results = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(r) => {
                    translations.push(Some(r.cells.clone()));
                    results.push(r);
                }
                Err(f) => {
                    translations.push(None);
                    failures.push(f);
                }
            }
        }
        let cells = plan.assemble(&self.config.markers, &translations);
        info!(
            chars = text.chars().count(),
            pieces = plan.pieces.len(),
            markers = plan.marker_count(),
            cells = cells.len(),
            failures = failures.len(),
            "encoded text"
        );
        EncodeReport {
            cells,
            script: classify_text(text),
            results,
            failures,
        }
    }

    /// Encode and add the outcome to `stats`.
    pub fn encode_counted(&self, text: &str, stats: &mut TranslationStats) -> EncodeReport {
        let report = self.encode(text);
        stats.record(report.script, &report.results, &report.failures);
        report
    }

    pub fn decode(&self, cells: &[Cell]) -> Result<DecodeReport, CodecError> {
        let plan = mode::plan_decode(cells, &self.config.markers, self.config.default_language)?;
        let outcomes = self.orchestrator.reverse_all(&plan.units);

        let mut texts = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (text, unit_failures) in outcomes {
            texts.push(text);
            failures.extend(unit_failures);
        }
        let text = plan.finish(&texts);
        info!(
            cells = cells.len(),
            units = plan.units.len(),
            failures = failures.len(),
            "decoded cells"
        );
        Ok(DecodeReport {
            text,
            failures,
            diagnostics: Vec::new(),
        })
    }

    /// Decode any braille representation. Plain text is rejected with the
    /// positions of its non-braille characters.
    pub fn decode_input(&self, input: &Input) -> Result<DecodeReport, Error> {
        match input {
            Input::Image(img) => {
                let recognition = self.recognize(img)?;
                let mut report = self.decode(&recognition.cells)?;
                report.diagnostics = recognition.diagnostics;
                Ok(report)
            }
            Input::Text(s) => {
                let invalid = codec::invalid_braille_positions(s);
                warn!(positions = ?invalid, "input is not braille");
                Err(CodecError::NotBraille(invalid).into())
            }
            other => {
                let cells = match other.parse_cells() {
                    Some(parsed) => parsed.inspect_err(|e| {
                        if let CodecError::NotBraille(positions) = e {
                            warn!(?positions, "invalid braille characters");
                        }
                    })?,
                    None => Vec::new(),
                };
                Ok(self.decode(&cells)?)
            }
        }
    }

    /// Draw `cells` on the configured grid.
    ///
    /// The image does not record how many cells it holds, so blank cells
    /// at the end of the sequence are indistinguishable from the unused
    /// grid and do not come back from [`recognize`](Self::recognize).
    /// Text ending in spaces loses them through an image.
    pub fn render(&self, cells: &[Cell]) -> RasterImage {
        raster::rasterize(cells, self.config.wrap, &self.config.geometry)
    }

    /// Read the cells of an image drawn with the configured geometry.
    /// Trailing blank cells are dropped.
    pub fn recognize(&self, img: &RasterImage) -> Result<Recognition, RasterError> {
        raster::recognize(img, &self.config.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::memory::MemoryService;

    fn english() -> Translator<MemoryService> {
        Translator::new(MemoryService::english(), TranslatorConfig::default()).unwrap()
    }

    #[test]
    fn english_round_trip() {
        let t = english();
        for text in ["Hello, world!", "The other 42 things.", "AND then", "it's ok?"] {
            let enc = t.encode(text);
            assert!(enc.is_complete(), "{text}: {:?}", enc.failures);
            let dec = t.decode(&enc.cells).unwrap();
            assert_eq!(dec.text, text);
        }
    }

    #[test]
    fn contraction_shortens_output() {
        let t = english();
        let enc = t.encode("the");
        assert_eq!(enc.cells, vec![Cell::new(46).unwrap()]);
    }

    #[test]
    fn unknown_script_is_reported_not_dropped_silently() {
        let t = english();
        let enc = t.encode("hi 한글");
        assert_eq!(enc.failures.len(), 1);
        assert_eq!(enc.failures[0].position, 3);
        assert!(!enc.is_complete());
    }

    #[test]
    fn decode_input_detects_representation() {
        let t = english();
        let cells = t.encode("cab").cells;
        for input in [
            Input::Unicode(codec::cells_to_unicode(&cells)),
            Input::Points(codec::cells_to_points(&cells)),
            Input::Bits(codec::cells_to_bits(&cells)),
            Input::Image(t.render(&cells)),
        ] {
            assert_eq!(t.decode_input(&input).unwrap().text, "cab");
        }
    }

    #[test]
    fn detected_points_of_spaced_letters_round_trip() {
        let t = english();
        let cells = t.encode("a a a ").cells;
        let points = codec::cells_to_points(&cells);
        assert_eq!(points, "1 0 1 0 1 0");
        let report = t.decode_input(&Input::detect(&points)).unwrap();
        assert_eq!(report.text, "a a a ");
    }

    #[test]
    fn image_path_drops_trailing_spaces_only() {
        let t = english();
        let cells = t.encode("hi there ").cells;
        let img = t.render(&cells);
        assert_eq!(t.recognize(&img).unwrap().cells, &cells[..cells.len() - 1]);

        let report = t.decode_input(&Input::Image(img)).unwrap();
        assert_eq!(report.text, "hi there");

        let inner = t.encode("hi  there").cells;
        let report = t.decode_input(&Input::Image(t.render(&inner))).unwrap();
        assert_eq!(report.text, "hi  there");
    }

    #[test]
    fn decode_input_rejects_plain_text() {
        let err = english().decode_input(&Input::Text("⠁b".into())).unwrap_err();
        assert!(matches!(err, Error::Codec(CodecError::NotBraille(p)) if p == vec![1]));
    }

    #[test]
    fn stats_accumulate_per_caller() {
        let config = TranslatorConfig {
            analyze: true,
            ..TranslatorConfig::default()
        };
        let t = Translator::new(MemoryService::english(), config).unwrap();
        let mut stats = TranslationStats::new();
        t.encode_counted("the cat", &mut stats);
        t.encode_counted("and", &mut stats);
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.pieces_translated, 3);
        assert_eq!(stats.contracted_pieces, 2);
        assert_eq!(stats.contraction_rate_percent(), 66.67);
    }
}
