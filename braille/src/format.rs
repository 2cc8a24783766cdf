//! Input kinds and output formats at the library boundary.

use std::fmt;
use std::str::FromStr;

use crate::cell::{Cell, CellSequence, BRAILLE_BASE};
use crate::codec;
use crate::error::{CodecError, FormatError};
use crate::raster::RasterImage;

/// An input resolved once to its representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Unicode(String),
    Points(String),
    Bits(String),
    Image(RasterImage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Unicode,
    Points,
    Bits,
    Image,
}

impl Input {
    /// Guess the representation of a string.
    ///
    /// Order: braille glyphs, then point-number tokens, then 0/1 groups
    /// whose lengths are each a multiple of 6, then plain text.
    pub fn detect(s: &str) -> Input {
        if s.trim().is_empty() {
            return Input::Text(s.to_string());
        }
        if s
            .chars()
            .filter(|c| !c.is_whitespace())
            .all(|c| (BRAILLE_BASE..=0x28FF).contains(&(c as u32)))
        {
            return Input::Unicode(s.to_string());
        }
        if s.split_whitespace().all(is_point_token) {
            return Input::Points(s.to_string());
        }
        if s.split_whitespace().all(is_bit_group) {
            return Input::Bits(s.to_string());
        }
        Input::Text(s.to_string())
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Input::Text(_) => InputKind::Text,
            Input::Unicode(_) => InputKind::Unicode,
            Input::Points(_) => InputKind::Points,
            Input::Bits(_) => InputKind::Bits,
            Input::Image(_) => InputKind::Image,
        }
    }

    /// Cells for the braille string representations; `None` for text
    /// and images.
    pub fn parse_cells(&self) -> Option<Result<CellSequence, CodecError>> {
        match self {
            Input::Unicode(s) => Some(codec::unicode_to_cells(s)),
            Input::Points(s) => Some(codec::points_to_cells(s)),
            Input::Bits(s) => Some(codec::bits_to_cells(s)),
            Input::Text(_) | Input::Image(_) => None,
        }
    }
}

fn is_bit_group(group: &str) -> bool {
    group.len() % 6 == 0 && group.chars().all(|c| c == '0' || c == '1')
}

fn is_point_token(token: &str) -> bool {
    token == "0"
        || token.split('-').all(|part| {
            let mut chars = part.chars();
            matches!((chars.next(), chars.next()), (Some('1'..='6'), None))
        })
}

/// Output representation of a cell sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Unicode,
    Points,
    Bits,
    Json,
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unicode" => Ok(OutputFormat::Unicode),
            "dots" | "points" => Ok(OutputFormat::Points),
            "binary" | "bits" => Ok(OutputFormat::Bits),
            "json" => Ok(OutputFormat::Json),
            _ => Err(FormatError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Unicode => "unicode",
            OutputFormat::Points => "dots",
            OutputFormat::Bits => "binary",
            OutputFormat::Json => "json",
        })
    }
}

impl OutputFormat {
    pub fn render(self, cells: &[Cell]) -> Result<String, FormatError> {
        match self {
            OutputFormat::Unicode => Ok(codec::cells_to_unicode(cells)),
            OutputFormat::Points => Ok(codec::cells_to_points(cells)),
            OutputFormat::Bits => Ok(codec::cells_to_bits(cells)),
            #[cfg(feature = "serde")]
            OutputFormat::Json => serde_json::to_string(&codec::cells_to_bit_arrays(cells))
                .map_err(|e| FormatError::Unsupported(format!("json: {e}"))),
            #[cfg(not(feature = "serde"))]
            OutputFormat::Json => Err(FormatError::Unsupported(
                "json (built without the serde feature)".into(),
            )),
        }
    }
}
