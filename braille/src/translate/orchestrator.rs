use std::collections::BTreeMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

use super::reverse::ContractionIndex;
use super::{
    Direction, FailureKind, Grade, ServiceError, TableId, TablePair, TranslationFailure,
    TranslationResult, TranslationService,
};
use crate::cell::{Cell, CellSequence};
use crate::config::TranslatorConfig;
use crate::error::ConfigError;
use crate::marker::MarkerScheme;
use crate::mode::{Piece, Unit};
use crate::segment::Language;

enum CallError {
    Service(ServiceError),
    Timeout(Duration),
}

impl CallError {
    fn into_failure(self) -> (FailureKind, String) {
        match self {
            CallError::Service(e) => (FailureKind::Service, e.message),
            CallError::Timeout(limit) => (
                FailureKind::Timeout,
                format!("no answer within {} ms", limit.as_millis()),
            ),
        }
    }
}

/// Drives a [`TranslationService`] with table fallback, timeouts and a
/// single retry on transient errors.
pub struct Orchestrator<S> {
    service: Arc<S>,
    tables: BTreeMap<Language, TablePair>,
    plausibility_ratio: f64,
    timeout: Option<Duration>,
    analyze: bool,
    scheme: MarkerScheme,
    index: ContractionIndex,
}

impl<S: TranslationService> Orchestrator<S> {
    /// Validate `config` and build the contraction index.
    pub fn new(service: Arc<S>, config: &TranslatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut orch = Self {
            service,
            tables: config.tables.clone(),
            plausibility_ratio: config.plausibility_ratio,
            timeout: config.timeout,
            analyze: config.analyze,
            scheme: config.markers.clone(),
            index: ContractionIndex::new(),
        };
        let index = ContractionIndex::build(config.contraction_words(), &orch.scheme, |lang, word| {
            let table = orch.tables.get(&lang)?.grade2.clone();
            orch.call_translate(&table, word).ok()
        });
        debug!(entries = index.len(), "built contraction index");
        orch.index = index;
        Ok(orch)
    }

    pub fn index(&self) -> &ContractionIndex {
        &self.index
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run `job` on a worker thread, giving up after the configured timeout.
    ///
    /// A worker that overruns is detached and exits when the service call
    /// returns. Services that spawn processes bound that call themselves
    /// (see [`LouService::with_timeout`](super::louis::LouService::with_timeout)).
    fn timed<T, F>(&self, job: F) -> Result<T, CallError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, ServiceError> + Send + 'static,
    {
        let Some(limit) = self.timeout else {
            return job(self.service.as_ref()).map_err(CallError::Service);
        };
        let service = Arc::clone(&self.service);
        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("braille-translate".into())
            .spawn(move || {
                // The receiver is gone if the call already timed out.
                let _ = tx.send(job(service.as_ref()));
            })
            .map_err(|e| CallError::Service(ServiceError::transient(format!("spawning worker: {e}"))))?;
        match rx.recv_timeout(limit) {
            Ok(result) => result.map_err(CallError::Service),
            Err(RecvTimeoutError::Timeout) => Err(CallError::Timeout(limit)),
            Err(RecvTimeoutError::Disconnected) => Err(CallError::Service(
                ServiceError::permanent("translation worker exited without a result"),
            )),
        }
    }

    fn call<T, F>(&self, job: F) -> Result<T, CallError>
    where
        T: Send + 'static,
        F: Fn(&S) -> Result<T, ServiceError> + Clone + Send + 'static,
    {
        match self.timed(job.clone()) {
            Err(CallError::Service(e)) if e.transient => {
                warn!(error = %e.message, "transient translation error, retrying once");
                self.timed(job)
            }
            other => other,
        }
    }

    fn call_translate(&self, table: &TableId, text: &str) -> Result<CellSequence, CallError> {
        let table = table.clone();
        let text = text.to_string();
        self.call(move |s: &S| s.translate(&table, &text))
    }

    fn call_back_translate(&self, table: &TableId, cells: &[Cell]) -> Result<String, CallError> {
        let table = table.clone();
        let cells = cells.to_vec();
        self.call(move |s: &S| s.back_translate(&table, &cells))
    }

    /// Reason the output for `text` is unusable, if any.
    fn implausible(&self, text: &str, cells: &[Cell]) -> Option<String> {
        let min = (text.chars().count() as f64 * self.plausibility_ratio).floor() as usize;
        if cells.is_empty() {
            Some("empty output".into())
        } else if cells.len() < min {
            Some(format!("{} cells for {} characters", cells.len(), text.chars().count()))
        } else if let Some(c) = cells.iter().find(|&&c| self.scheme.is_reserved(c)) {
            Some(format!("output uses reserved cell {c}"))
        } else {
            None
        }
    }

    /// Translate one piece, grade 2 first and grade 1 as fallback.
    pub fn forward(&self, piece: &Piece) -> Result<TranslationResult, TranslationFailure> {
        let failure = |kind, cause| TranslationFailure {
            position: piece.position,
            language: piece.language,
            direction: Direction::Forward,
            kind,
            cause,
        };
        let Some(pair) = self.tables.get(&piece.language) else {
            return Err(failure(
                FailureKind::Service,
                format!("no tables for {}", piece.language),
            ));
        };

        let mut last = (FailureKind::Service, String::new());
        for grade in [Grade::Two, Grade::One] {
            let table = pair.table(grade);
            match self.call_translate(table, &piece.text) {
                Ok(cells) => match self.implausible(&piece.text, &cells) {
                    None => {
                        let contracted = self.contraction_flag(pair, grade, &piece.text, &cells);
                        return Ok(TranslationResult {
                            position: piece.position,
                            language: piece.language,
                            text: piece.text.clone(),
                            cells,
                            used_fallback_table: grade == Grade::One,
                            contracted,
                        });
                    }
                    Some(reason) => last = (FailureKind::Implausible, reason),
                },
                Err(e) => last = e.into_failure(),
            }
            debug!(
                %table,
                position = piece.position,
                cause = %last.1,
                "translation rejected"
            );
        }

        warn!(
            language = %piece.language,
            position = piece.position,
            cause = %last.1,
            "translation failed with both tables"
        );
        Err(failure(last.0, last.1))
    }

    fn contraction_flag(
        &self,
        pair: &TablePair,
        grade: Grade,
        text: &str,
        cells: &[Cell],
    ) -> Option<bool> {
        if !self.analyze {
            return None;
        }
        if grade == Grade::One {
            return Some(false);
        }
        match self.call_translate(&pair.grade1, text) {
            Ok(uncontracted) => Some(cells.len() < uncontracted.len()),
            Err(_) => None,
        }
    }

    /// Translate pieces, in order. Failures do not stop sibling pieces.
    pub fn forward_all(&self, pieces: &[Piece]) -> Vec<Result<TranslationResult, TranslationFailure>> {
        #[cfg(feature = "parallel")]
        let results = pieces.par_iter().map(|p| self.forward(p)).collect();

        #[cfg(not(feature = "parallel"))]
        let results = pieces.iter().map(|p| self.forward(p)).collect();

        results
    }

    /// Back-translate one unit: longest indexed contraction first, then
    /// single cells through grade 2 and grade 1.
    pub fn reverse(&self, unit: &Unit) -> (String, Vec<TranslationFailure>) {
        let mut text = String::new();
        let mut failures = Vec::new();
        let mut i = 0;
        while i < unit.cells.len() {
            let rest = &unit.cells[i..];
            if let Some((len, word)) = self.index.longest_match(unit.language, rest) {
                text.push_str(word);
                i += len;
                continue;
            }
            match self.back_translate_cell(unit.language, rest[0]) {
                Ok(s) => text.push_str(&s),
                Err((kind, cause)) => {
                    warn!(
                        language = %unit.language,
                        position = unit.position + i,
                        cause = %cause,
                        "back-translation failed"
                    );
                    failures.push(TranslationFailure {
                        position: unit.position + i,
                        language: unit.language,
                        direction: Direction::Reverse,
                        kind,
                        cause,
                    });
                }
            }
            i += 1;
        }
        (text, failures)
    }

    fn back_translate_cell(&self, language: Language, cell: Cell) -> Result<String, (FailureKind, String)> {
        let pair = self.tables.get(&language).ok_or_else(|| {
            (FailureKind::Service, format!("no tables for {language}"))
        })?;
        let mut last = (FailureKind::Service, String::new());
        for grade in [Grade::Two, Grade::One] {
            match self.call_back_translate(pair.table(grade), &[cell]) {
                Ok(s) if !s.is_empty() => return Ok(s),
                Ok(_) => last = (FailureKind::Implausible, format!("empty text for {cell}")),
                Err(e) => last = e.into_failure(),
            }
        }
        Err(last)
    }

    pub fn reverse_all(&self, units: &[Unit]) -> Vec<(String, Vec<TranslationFailure>)> {
        #[cfg(feature = "parallel")]
        let results = units.par_iter().map(|u| self.reverse(u)).collect();

        #[cfg(not(feature = "parallel"))]
        let results = units.iter().map(|u| self.reverse(u)).collect();

        results
    }
}
