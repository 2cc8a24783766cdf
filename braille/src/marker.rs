//! Reserved cells used as in-band mode indicators, and the digit alphabet.

use crate::cell::Cell;
use crate::error::ConfigError;
use crate::segment::Language;

/// A mode indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Capital,
    NumberSign,
    Switch(Language),
    LineBreak,
}

impl Marker {
    pub fn name(self) -> &'static str {
        match self {
            Marker::Capital => "capital indicator",
            Marker::NumberSign => "number sign",
            Marker::Switch(Language::Hangul) => "hangul switch",
            Marker::Switch(Language::Latin) => "latin switch",
            Marker::Switch(Language::Other) => "other switch",
            Marker::LineBreak => "line break",
        }
    }
}

/// Digits 1..9 then 0 in the lower cell (dots 2, 3, 5, 6).
pub const DIGITS: [(char, Cell); 10] = [
    ('1', Cell::from_bits_truncate(0b000010)),
    ('2', Cell::from_bits_truncate(0b000110)),
    ('3', Cell::from_bits_truncate(0b010010)),
    ('4', Cell::from_bits_truncate(0b110010)),
    ('5', Cell::from_bits_truncate(0b100010)),
    ('6', Cell::from_bits_truncate(0b010110)),
    ('7', Cell::from_bits_truncate(0b110110)),
    ('8', Cell::from_bits_truncate(0b100110)),
    ('9', Cell::from_bits_truncate(0b010100)),
    ('0', Cell::from_bits_truncate(0b110100)),
];

pub fn digit_cell(c: char) -> Option<Cell> {
    DIGITS.iter().find(|(d, _)| *d == c).map(|&(_, cell)| cell)
}

pub fn cell_digit(cell: Cell) -> Option<char> {
    DIGITS.iter().find(|(_, c)| *c == cell).map(|&(d, _)| d)
}

/// Cell assignment for every marker.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MarkerScheme {
    pub capital: Cell,
    pub number_sign: Cell,
    pub switch_hangul: Cell,
    pub switch_latin: Cell,
    pub switch_other: Cell,
    pub line_break: Cell,
}

impl Default for MarkerScheme {
    fn default() -> Self {
        Self {
            capital: Cell::from_bits_truncate(0b100000),       // 6
            number_sign: Cell::from_bits_truncate(0b111100),   // 3-4-5-6
            switch_hangul: Cell::from_bits_truncate(0b111000), // 4-5-6
            switch_latin: Cell::from_bits_truncate(0b110000),  // 5-6
            switch_other: Cell::from_bits_truncate(0b011000),  // 4-5
            line_break: Cell::from_bits_truncate(0b111111),
        }
    }
}

impl MarkerScheme {
    const MARKERS: [Marker; 6] = [
        Marker::Capital,
        Marker::NumberSign,
        Marker::Switch(Language::Hangul),
        Marker::Switch(Language::Latin),
        Marker::Switch(Language::Other),
        Marker::LineBreak,
    ];

    /// Check that markers are pairwise distinct, not blank, and not digits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cells: Vec<(Marker, Cell)> = Self::MARKERS.iter().map(|&m| (m, self.cell(m))).collect();
        for (i, &(m, c)) in cells.iter().enumerate() {
            if c.is_blank() {
                return Err(ConfigError::Markers(format!("{} uses the blank cell", m.name())));
            }
            if let Some(d) = cell_digit(c) {
                return Err(ConfigError::Markers(format!(
                    "{} collides with digit {d}",
                    m.name()
                )));
            }
            if let Some(&(other, _)) = cells[i + 1..].iter().find(|(_, oc)| *oc == c) {
                return Err(ConfigError::Markers(format!(
                    "{} and {} share cell {c}",
                    m.name(),
                    other.name()
                )));
            }
        }
        Ok(())
    }

    pub fn cell(&self, marker: Marker) -> Cell {
        match marker {
            Marker::Capital => self.capital,
            Marker::NumberSign => self.number_sign,
            Marker::Switch(Language::Hangul) => self.switch_hangul,
            Marker::Switch(Language::Latin) => self.switch_latin,
            Marker::Switch(Language::Other) => self.switch_other,
            Marker::LineBreak => self.line_break,
        }
    }

    pub fn marker(&self, cell: Cell) -> Option<Marker> {
        Self::MARKERS.into_iter().find(|&m| self.cell(m) == cell)
    }

    /// Whether content translation may not produce `cell`.
    pub fn is_reserved(&self, cell: Cell) -> bool {
        cell.is_blank() || self.marker(cell).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_is_valid() {
        MarkerScheme::default().validate().unwrap();
    }

    #[test]
    fn digits_are_distinct_and_round_trip() {
        for (d, c) in DIGITS {
            assert_eq!(digit_cell(d), Some(c));
            assert_eq!(cell_digit(c), Some(d));
        }
        let mut values: Vec<u8> = DIGITS.iter().map(|(_, c)| c.value()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 10);
    }

    #[test]
    fn digits_do_not_use_top_dots() {
        // Lower-cell digits never raise dots 1 or 4.
        for (_, c) in DIGITS {
            assert!(!c.has_dot(1) && !c.has_dot(4), "{c}");
        }
    }

    #[test]
    fn duplicate_markers_are_rejected() {
        let scheme = MarkerScheme {
            switch_other: MarkerScheme::default().switch_latin,
            ..MarkerScheme::default()
        };
        assert!(matches!(scheme.validate(), Err(ConfigError::Markers(_))));
    }

    #[test]
    fn marker_on_digit_cell_is_rejected() {
        let scheme = MarkerScheme {
            capital: digit_cell('1').unwrap(),
            ..MarkerScheme::default()
        };
        assert!(scheme.validate().is_err());
    }

    #[test]
    fn lookup_finds_marker_by_cell() {
        let s = MarkerScheme::default();
        assert_eq!(s.marker(Cell::new(60).unwrap()), Some(Marker::NumberSign));
        assert_eq!(
            s.marker(Cell::new(56).unwrap()),
            Some(Marker::Switch(Language::Hangul))
        );
        assert_eq!(s.marker(Cell::new(1).unwrap()), None);
        assert!(s.is_reserved(Cell::BLANK));
        assert!(s.is_reserved(Cell::new(63).unwrap()));
    }
}
