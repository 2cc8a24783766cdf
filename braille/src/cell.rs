use smallvec::SmallVec;
use std::fmt;

/// First code point of the Unicode braille block.
pub const BRAILLE_BASE: u32 = 0x2800;

/// Number of distinct six-dot patterns.
pub const CELL_VALUES: usize = 64;

/// One six-dot braille cell.
///
/// Dot *n* (1..=6) is stored in bit *n − 1*, so the value equals the
/// offset of the glyph inside the Unicode braille block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cell(u8);

/// Cells in reading order.
pub type CellSequence = Vec<Cell>;

impl Cell {
    /// The cell with no raised dots.
    pub const BLANK: Cell = Cell(0);

    /// Create a cell from a value, rejecting anything above six bits.
    pub fn new(value: u8) -> Option<Cell> {
        (value < CELL_VALUES as u8).then_some(Cell(value))
    }

    /// Create a cell, dropping bits above dot 6.
    pub const fn from_bits_truncate(value: u8) -> Cell {
        Cell(value & 0x3f)
    }

    #[inline]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Build a cell from dot numbers. Returns `None` if any dot is outside 1..=6.
    pub fn from_dots(dots: &[u8]) -> Option<Cell> {
        let mut value = 0u8;
        for &dot in dots {
            if !(1..=6).contains(&dot) {
                return None;
            }
            value |= 1 << (dot - 1);
        }
        Some(Cell(value))
    }

    /// Whether dot `dot` (1..=6) is raised.
    #[inline]
    pub fn has_dot(self, dot: u8) -> bool {
        (1..=6).contains(&dot) && self.0 & (1 << (dot - 1)) != 0
    }

    /// Raised dots in ascending order.
    pub fn dots(self) -> SmallVec<[u8; 6]> {
        (1..=6).filter(|&d| self.has_dot(d)).collect()
    }

    pub fn is_blank(self) -> bool {
        self.0 == 0
    }

    pub fn to_char(self) -> char {
        // 0x2800..=0x283f are all assigned scalar values.
        char::from_u32(BRAILLE_BASE + self.0 as u32).unwrap_or('\u{2800}')
    }

    /// Parse a six-dot braille glyph. Eight-dot patterns are rejected.
    pub fn from_char(c: char) -> Option<Cell> {
        let cp = c as u32;
        if (BRAILLE_BASE..BRAILLE_BASE + CELL_VALUES as u32).contains(&cp) {
            Some(Cell((cp - BRAILLE_BASE) as u8))
        } else {
            None
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Cell {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Cell {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Cell::new(value)
            .ok_or_else(|| serde::de::Error::custom(format!("cell value {value} exceeds 63")))
    }
}
