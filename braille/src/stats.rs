use std::collections::BTreeMap;

use crate::segment::{Language, TextScript};
use crate::translate::{TranslationFailure, TranslationResult};

/// Running totals over translation requests, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TranslationStats {
    pub total_requests: u64,
    pub pieces_translated: u64,
    /// Pieces whose contracted form is shorter than letter-by-letter.
    pub contracted_pieces: u64,
    pub fallback_uses: u64,
    pub failures: u64,
    /// Pieces per language.
    pub language_distribution: BTreeMap<Language, u64>,
    /// Requests per overall script of the input.
    pub script_distribution: BTreeMap<String, u64>,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one encode request and its outcome.
    pub fn record(
        &mut self,
        script: TextScript,
        results: &[TranslationResult],
        failures: &[TranslationFailure],
    ) {
        self.total_requests += 1;
        *self
            .script_distribution
            .entry(script_name(script).to_string())
            .or_default() += 1;
        for r in results {
            self.pieces_translated += 1;
            *self.language_distribution.entry(r.language).or_default() += 1;
            if r.used_fallback_table {
                self.fallback_uses += 1;
            }
            if r.contracted == Some(true) {
                self.contracted_pieces += 1;
            }
        }
        self.failures += failures.len() as u64;
    }

    /// Share of translated pieces that were contracted, rounded to two
    /// decimals.
    pub fn contraction_rate_percent(&self) -> f64 {
        if self.pieces_translated == 0 {
            return 0.0;
        }
        let rate = self.contracted_pieces as f64 / self.pieces_translated as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

fn script_name(script: TextScript) -> &'static str {
    match script {
        TextScript::Hangul => "hangul",
        TextScript::Latin => "latin",
        TextScript::Mixed => "mixed",
        TextScript::Other => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(language: Language, contracted: Option<bool>, fallback: bool) -> TranslationResult {
        TranslationResult {
            position: 0,
            language,
            text: String::new(),
            cells: Vec::new(),
            used_fallback_table: fallback,
            contracted,
        }
    }

    #[test]
    fn empty_stats_have_zero_rate() {
        let s = TranslationStats::new();
        assert_eq!(s.total_requests, 0);
        assert_eq!(s.contraction_rate_percent(), 0.0);
    }

    #[test]
    fn rate_is_rounded_to_two_decimals() {
        let mut s = TranslationStats::new();
        s.record(
            TextScript::Latin,
            &[
                result(Language::Latin, Some(true), false),
                result(Language::Latin, Some(false), true),
                result(Language::Hangul, Some(false), false),
            ],
            &[],
        );
        assert_eq!(s.contraction_rate_percent(), 33.33);
        assert_eq!(s.fallback_uses, 1);
        assert_eq!(s.language_distribution[&Language::Latin], 2);
        assert_eq!(s.language_distribution[&Language::Hangul], 1);
    }

    #[test]
    fn separate_accumulators_do_not_interfere() {
        let mut a = TranslationStats::new();
        let b = TranslationStats::new();
        a.record(TextScript::Mixed, &[result(Language::Other, None, false)], &[]);
        assert_eq!(a.total_requests, 1);
        assert_eq!(a.script_distribution["mixed"], 1);
        assert_eq!(b.total_requests, 0);
    }
}
