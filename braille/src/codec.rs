//! Conversions between the textual braille representations.
//!
//! Packed bits write each cell as its 6-digit binary numeral, dot 6 first
//! and dot 1 last. Point numbers are space-separated tokens, each either
//! `0` or ascending dot numbers joined by `-`.

use crate::cell::{Cell, CellSequence};
use crate::error::CodecError;

/// Concatenate the 6-bit numerals of all cells.
pub fn cells_to_bits(cells: &[Cell]) -> String {
    let mut out = String::with_capacity(cells.len() * 6);
    for cell in cells {
        for bit in (0..6).rev() {
            out.push(if cell.value() & (1 << bit) != 0 { '1' } else { '0' });
        }
    }
    out
}

/// Render cells as space-separated 6-bit groups.
pub fn cells_to_bit_groups(cells: &[Cell]) -> Vec<String> {
    cells.iter().map(|c| cells_to_bits(std::slice::from_ref(c))).collect()
}

/// Parse packed bits. Whitespace between groups is ignored.
pub fn bits_to_cells(bits: &str) -> Result<CellSequence, CodecError> {
    let mut digits = Vec::with_capacity(bits.len());
    for (i, ch) in bits.chars().enumerate() {
        match ch {
            '0' => digits.push(0u8),
            '1' => digits.push(1u8),
            c if c.is_whitespace() => {}
            c => return Err(CodecError::BitChar(c, i)),
        }
    }
    if digits.len() % 6 != 0 {
        return Err(CodecError::BitLength(digits.len()));
    }
    Ok(digits
        .chunks_exact(6)
        .map(|chunk| Cell::from_bits_truncate(chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b)))
        .collect())
}

pub fn cell_to_points(cell: Cell) -> String {
    if cell.is_blank() {
        return "0".to_string();
    }
    let dots: Vec<String> = cell.dots().iter().map(|d| d.to_string()).collect();
    dots.join("-")
}

pub fn cells_to_points(cells: &[Cell]) -> String {
    let tokens: Vec<String> = cells.iter().map(|&c| cell_to_points(c)).collect();
    tokens.join(" ")
}

/// Parse point-number text.
///
/// Each token must be `0` or distinct dot numbers 1..=6 separated by
/// single hyphens.
pub fn points_to_cells(points: &str) -> Result<CellSequence, CodecError> {
    points
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_point_token(token, index))
        .collect()
}

fn parse_point_token(token: &str, index: usize) -> Result<Cell, CodecError> {
    let bad = || CodecError::PointToken {
        token: token.to_string(),
        index,
    };
    if token == "0" {
        return Ok(Cell::BLANK);
    }
    let mut value = 0u8;
    for part in token.split('-') {
        let mut chars = part.chars();
        let dot = match (chars.next(), chars.next()) {
            (Some(c @ '1'..='6'), None) => c as u8 - b'0',
            _ => return Err(bad()),
        };
        let bit = 1 << (dot - 1);
        if value & bit != 0 {
            return Err(bad());
        }
        value |= bit;
    }
    Ok(Cell::from_bits_truncate(value))
}

pub fn cells_to_unicode(cells: &[Cell]) -> String {
    cells.iter().map(|c| c.to_char()).collect()
}

/// Character positions that are neither six-dot braille nor whitespace.
pub fn invalid_braille_positions(text: &str) -> Vec<usize> {
    text.chars()
        .enumerate()
        .filter(|&(_, c)| Cell::from_char(c).is_none() && !c.is_whitespace())
        .map(|(i, _)| i)
        .collect()
}

/// Parse Unicode braille.
///
/// An ASCII space reads as the blank cell; other whitespace is skipped.
pub fn unicode_to_cells(text: &str) -> Result<CellSequence, CodecError> {
    let invalid = invalid_braille_positions(text);
    if !invalid.is_empty() {
        return Err(CodecError::NotBraille(invalid));
    }
    Ok(text
        .chars()
        .filter_map(|c| match c {
            ' ' => Some(Cell::BLANK),
            c => Cell::from_char(c),
        })
        .collect())
}

/// One 6-element vector per cell, in the same order as the packed numeral.
pub fn cells_to_bit_arrays(cells: &[Cell]) -> Vec<[u8; 6]> {
    cells
        .iter()
        .map(|c| {
            let mut arr = [0u8; 6];
            for (i, slot) in arr.iter_mut().enumerate() {
                *slot = (c.value() >> (5 - i)) & 1;
            }
            arr
        })
        .collect()
}

pub fn bit_arrays_to_cells(arrays: &[Vec<u8>]) -> Result<CellSequence, CodecError> {
    arrays
        .iter()
        .enumerate()
        .map(|(index, arr)| {
            if arr.len() != 6 {
                return Err(CodecError::BitArrayLength {
                    index,
                    len: arr.len(),
                });
            }
            let mut value = 0u8;
            for &b in arr {
                if b > 1 {
                    return Err(CodecError::BitArrayValue { index, value: b });
                }
                value = (value << 1) | b;
            }
            Ok(Cell::from_bits_truncate(value))
        })
        .collect()
}
