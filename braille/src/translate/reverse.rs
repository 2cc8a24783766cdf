use std::collections::HashMap;

use tracing::debug;

use crate::cell::{Cell, CellSequence};
use crate::marker::MarkerScheme;
use crate::segment::Language;

/// Reverse map from contracted cells to source words, per language.
///
/// Built once before decoding and read-only afterwards. When two words
/// produce the same cells the lexicographically smallest word is kept.
#[derive(Debug, Clone, Default)]
pub struct ContractionIndex {
    maps: HashMap<Language, HashMap<CellSequence, String>>,
    longest: HashMap<Language, usize>,
}

impl ContractionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-translate every word and index the results.
    ///
    /// Words the translator rejects, or whose cells collide with a
    /// marker, are skipped.
    pub fn build<'a, I, F>(words: I, scheme: &MarkerScheme, mut translate: F) -> Self
    where
        I: IntoIterator<Item = (Language, &'a str)>,
        F: FnMut(Language, &str) -> Option<CellSequence>,
    {
        let mut index = Self::new();
        for (language, word) in words {
            let Some(cells) = translate(language, word) else {
                debug!(%language, word, "contraction word not translatable, skipped");
                continue;
            };
            if cells.is_empty() || cells.iter().any(|&c| scheme.is_reserved(c)) {
                debug!(%language, word, "contraction word maps to reserved cells, skipped");
                continue;
            }
            index.insert(language, cells, word);
        }
        index
    }

    pub fn insert(&mut self, language: Language, cells: CellSequence, word: &str) {
        let len = cells.len();
        let map = self.maps.entry(language).or_default();
        match map.get_mut(&cells) {
            Some(existing) if existing.as_str() <= word => {}
            Some(existing) => *existing = word.to_string(),
            None => {
                map.insert(cells, word.to_string());
            }
        }
        let longest = self.longest.entry(language).or_insert(0);
        *longest = (*longest).max(len);
    }

    /// Longest indexed prefix of `cells`, as (cell count, word).
    pub fn longest_match(&self, language: Language, cells: &[Cell]) -> Option<(usize, &str)> {
        let map = self.maps.get(&language)?;
        let max = self.longest.get(&language).copied().unwrap_or(0).min(cells.len());
        (1..=max)
            .rev()
            .find_map(|len| map.get(&cells[..len]).map(|w| (len, w.as_str())))
    }

    pub fn len(&self) -> usize {
        self.maps.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
