//! In-process translation tables.
//!
//! Tables map strings to cell sequences and are applied with a greedy
//! longest-match tokenizer in both directions.

use std::collections::HashMap;

use super::{ServiceError, TableId, TranslationService};
use crate::cell::{Cell, CellSequence};

/// A string ↔ cells table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    forward: HashMap<String, CellSequence>,
    backward: HashMap<CellSequence, String>,
    longest_text: usize,
    longest_cells: usize,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A later entry with the same cells does not replace
    /// the earlier one for back-translation.
    pub fn insert(&mut self, text: &str, cells: CellSequence) {
        self.longest_text = self.longest_text.max(text.chars().count());
        self.longest_cells = self.longest_cells.max(cells.len());
        self.backward
            .entry(cells.clone())
            .or_insert_with(|| text.to_string());
        self.forward.insert(text.to_string(), cells);
    }

    pub fn with(mut self, text: &str, values: &[u8]) -> Self {
        self.insert(text, values.iter().map(|&v| Cell::from_bits_truncate(v)).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn forward(&self, text: &str) -> Result<CellSequence, ServiceError> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut i = 0;
        'outer: while i < chars.len() {
            let max = self.longest_text.min(chars.len() - i);
            for len in (1..=max).rev() {
                let key: String = chars[i..i + len].iter().collect();
                if let Some(cells) = self.forward.get(&key) {
                    out.extend_from_slice(cells);
                    i += len;
                    continue 'outer;
                }
            }
            return Err(ServiceError::permanent(format!(
                "no rule for '{}' at character {i}",
                chars[i]
            )));
        }
        Ok(out)
    }

    pub fn backward(&self, cells: &[Cell]) -> Result<String, ServiceError> {
        let mut out = String::new();
        let mut i = 0;
        'outer: while i < cells.len() {
            let max = self.longest_cells.min(cells.len() - i);
            for len in (1..=max).rev() {
                if let Some(text) = self.backward.get(&cells[i..i + len]) {
                    out.push_str(text);
                    i += len;
                    continue 'outer;
                }
            }
            return Err(ServiceError::permanent(format!(
                "no rule for cell {} at index {i}",
                cells[i]
            )));
        }
        Ok(out)
    }
}

/// Translation service backed by [`MemoryTable`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryService {
    tables: HashMap<TableId, MemoryTable>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, id: impl Into<String>, table: MemoryTable) -> Self {
        self.tables.insert(TableId::new(id), table);
        self
    }

    /// Service with the built-in English tables `en-us-g1.ctb` and
    /// `en-us-g2.ctb`.
    pub fn english() -> Self {
        Self::new()
            .with_table("en-us-g1.ctb", english_grade1())
            .with_table("en-us-g2.ctb", english_grade2())
    }

    fn table(&self, id: &TableId) -> Result<&MemoryTable, ServiceError> {
        self.tables
            .get(id)
            .ok_or_else(|| ServiceError::permanent(format!("unknown table {id}")))
    }
}

impl TranslationService for MemoryService {
    fn translate(&self, table: &TableId, text: &str) -> Result<CellSequence, ServiceError> {
        self.table(table)?.forward(text)
    }

    fn back_translate(&self, table: &TableId, cells: &[Cell]) -> Result<String, ServiceError> {
        self.table(table)?.backward(cells)
    }
}

const ENGLISH_LETTERS: [(&str, u8); 26] = [
    ("a", 1),
    ("b", 3),
    ("c", 9),
    ("d", 25),
    ("e", 17),
    ("f", 11),
    ("g", 27),
    ("h", 19),
    ("i", 10),
    ("j", 26),
    ("k", 5),
    ("l", 7),
    ("m", 13),
    ("n", 29),
    ("o", 21),
    ("p", 15),
    ("q", 31),
    ("r", 23),
    ("s", 14),
    ("t", 30),
    ("u", 37),
    ("v", 39),
    ("w", 58),
    ("x", 45),
    ("y", 61),
    ("z", 53),
];

// Single-cell punctuation only.
const ENGLISH_PUNCTUATION: [(&str, u8); 8] = [
    (",", 2),
    (";", 6),
    (":", 18),
    (".", 50),
    ("!", 22),
    ("?", 38),
    ("'", 4),
    ("-", 36),
];

/// Grade-2 strong contractions and groupsigns of the built-in table.
pub const ENGLISH_CONTRACTIONS: [(&str, u8); 13] = [
    ("and", 47),
    ("of", 55),
    ("the", 46),
    ("with", 62),
    ("ch", 33),
    ("sh", 41),
    ("th", 57),
    ("wh", 49),
    ("ou", 51),
    ("st", 12),
    ("ing", 44),
    ("ed", 43),
    ("er", 59),
];

pub fn english_grade1() -> MemoryTable {
    ENGLISH_LETTERS
        .iter()
        .chain(ENGLISH_PUNCTUATION.iter())
        .fold(MemoryTable::new(), |t, &(s, v)| t.with(s, &[v]))
}

pub fn english_grade2() -> MemoryTable {
    ENGLISH_CONTRACTIONS
        .iter()
        .fold(english_grade1(), |t, &(s, v)| t.with(s, &[v]))
}

/// Words of the built-in grade-2 table worth indexing for reverse lookup.
pub fn english_contraction_words() -> Vec<String> {
    ENGLISH_CONTRACTIONS.iter().map(|(s, _)| s.to_string()).collect()
}
