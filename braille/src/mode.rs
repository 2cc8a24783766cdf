//! Mode indicators around segmented runs.
//!
//! Encoding turns text into a plan: marker, blank and digit cells that
//! are fixed, interleaved with content pieces that still need a
//! translation service. Decoding does the reverse, splitting a cell
//! sequence into literal characters and content units.
//!
//! Rules, per line (lines are joined by the line-break marker and all
//! state resets at each line start):
//!
//! - the active language starts at the default language;
//! - each whitespace character is the blank cell and leaves the active
//!   language alone (blanks decode as ASCII spaces, so tabs come back as
//!   spaces);
//! - a text run in another language is preceded by its switch marker;
//! - a digit run is the number sign followed by digit cells and leaves
//!   no active language, so the next text run always gets a switch;
//! - an uppercase stretch of two or more letters gets two capital
//!   indicators; a switch back to Latin closes it if lowercase follows;
//! - a single uppercase letter gets one capital indicator and shares its
//!   unit with the lowercase letters after it.

use crate::cell::{Cell, CellSequence};
use crate::error::CodecError;
use crate::marker::{cell_digit, digit_cell, Marker, MarkerScheme};
use crate::segment::{segment, Language, RunTag};

/// A piece of text handed to the translation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    /// Byte offset in the encoded text.
    pub position: usize,
    pub language: Language,
    /// Lowercase, digit-free, no spaces.
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    Marker(Marker),
    Blank,
    Digit(Cell),
    /// Index into `EncodePlan::pieces`.
    Content(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodePlan {
    pub items: Vec<Item>,
    pub pieces: Vec<Piece>,
}

impl EncodePlan {
    fn push_piece(&mut self, position: usize, language: Language, text: String) {
        self.items.push(Item::Content(self.pieces.len()));
        self.pieces.push(Piece {
            position,
            language,
            text,
        });
    }

    /// Concatenate items in order. `translations[i]` holds the cells for
    /// piece `i`; a `None` contributes nothing.
    pub fn assemble(&self, scheme: &MarkerScheme, translations: &[Option<CellSequence>]) -> CellSequence {
        let mut out = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match *item {
                Item::Marker(m) => out.push(scheme.cell(m)),
                Item::Blank => out.push(Cell::BLANK),
                Item::Digit(c) => out.push(c),
                Item::Content(i) => {
                    if let Some(Some(cells)) = translations.get(i) {
                        out.extend_from_slice(cells);
                    }
                }
            }
        }
        out
    }

    pub fn marker_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, Item::Marker(_)))
            .count()
    }
}

/// Build the encode plan for `text`.
pub fn plan(text: &str, default_language: Language) -> EncodePlan {
    let mut plan = EncodePlan::default();
    let mut offset = 0;
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            plan.items.push(Item::Marker(Marker::LineBreak));
        }
        plan_line(&mut plan, line, offset, default_language);
        offset += line.len() + 1;
    }
    plan
}

fn plan_line(plan: &mut EncodePlan, line: &str, offset: usize, default_language: Language) {
    let mut active = RunTag::from(default_language);

    for run in segment(line) {
        let base = offset + run.start;
        match run.tag {
            RunTag::Numeric => {
                plan.items.push(Item::Marker(Marker::NumberSign));
                for c in run.text.chars() {
                    if let Some(cell) = digit_cell(c) {
                        plan.items.push(Item::Digit(cell));
                    }
                }
                active = RunTag::Numeric;
            }
            RunTag::Other => {
                for (start, chunk) in split_spaces(run.text) {
                    if chunk.starts_with(char::is_whitespace) {
                        plan.items
                            .extend(std::iter::repeat(Item::Blank).take(chunk.chars().count()));
                        continue;
                    }
                    switch_to(plan, &mut active, Language::Other);
                    plan.push_piece(base + start, Language::Other, chunk.to_string());
                }
            }
            RunTag::Hangul => {
                switch_to(plan, &mut active, Language::Hangul);
                plan.push_piece(base, Language::Hangul, run.text.to_string());
            }
            RunTag::Latin => {
                switch_to(plan, &mut active, Language::Latin);
                plan_latin(plan, run.text, base);
            }
        }
    }
}

fn switch_to(plan: &mut EncodePlan, active: &mut RunTag, language: Language) {
    let tag = RunTag::from(language);
    if *active != tag {
        plan.items.push(Item::Marker(Marker::Switch(language)));
        *active = tag;
    }
}

/// Alternating stretches of whitespace and non-whitespace with their byte
/// offsets.
fn split_spaces(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<bool> = None;
    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if prev.is_some_and(|p| p != space) {
            out.push((start, &text[start..i]));
            start = i;
        }
        prev = Some(space);
    }
    if start < text.len() {
        out.push((start, &text[start..]));
    }
    out
}

/// Capitalisation within an ASCII letter run.
fn plan_latin(plan: &mut EncodePlan, text: &str, base: usize) {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let upper_end = i + bytes[i..].iter().take_while(|b| b.is_ascii_uppercase()).count();
        let upper_len = upper_end - i;
        if upper_len >= 2 {
            plan.items.push(Item::Marker(Marker::Capital));
            plan.items.push(Item::Marker(Marker::Capital));
            plan.push_piece(base + i, Language::Latin, text[i..upper_end].to_ascii_lowercase());
            if upper_end < bytes.len() {
                plan.items.push(Item::Marker(Marker::Switch(Language::Latin)));
            }
            i = upper_end;
            continue;
        }
        let start = i;
        if upper_len == 1 {
            plan.items.push(Item::Marker(Marker::Capital));
            i += 1;
        }
        i += bytes[i..].iter().take_while(|b| b.is_ascii_lowercase()).count();
        plan.push_piece(base + start, Language::Latin, text[start..i].to_ascii_lowercase());
    }
}

/// Capitalisation applied to a decoded unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caps {
    #[default]
    None,
    Letter,
    Word,
}

/// Content cells between markers, to be reverse-translated as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub language: Language,
    pub cells: CellSequence,
    pub caps: Caps,
    /// Index of the first cell in the decoded sequence.
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Literal(char),
    /// Index into `DecodePlan::units`.
    Unit(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodePlan {
    pub parts: Vec<Part>,
    pub units: Vec<Unit>,
}

impl DecodePlan {
    /// Join literals and translated units. `translations[i]` is the text
    /// for unit `i`.
    pub fn finish(&self, translations: &[String]) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match *part {
                Part::Literal(c) => out.push(c),
                Part::Unit(i) => {
                    let Some(text) = translations.get(i) else {
                        continue;
                    };
                    match self.units[i].caps {
                        Caps::None => out.push_str(text),
                        Caps::Word => out.push_str(&text.to_uppercase()),
                        Caps::Letter => {
                            let mut chars = text.chars();
                            if let Some(first) = chars.next() {
                                out.extend(first.to_uppercase());
                                out.push_str(chars.as_str());
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

struct LineState {
    language: Language,
    numeric: bool,
    /// Position of a number sign still waiting for its first digit.
    number_sign: Option<usize>,
    /// Consecutive capital indicators and the position of the first.
    capitals: Option<(usize, usize)>,
    unit: Option<Unit>,
}

impl LineState {
    fn new(language: Language) -> Self {
        Self {
            language,
            numeric: false,
            number_sign: None,
            capitals: None,
            unit: None,
        }
    }

    fn flush(&mut self, plan: &mut DecodePlan) {
        if let Some(unit) = self.unit.take() {
            plan.parts.push(Part::Unit(plan.units.len()));
            plan.units.push(unit);
        }
    }

    /// Fails if an indicator is still waiting for what it modifies.
    fn check_dangling(&self) -> Result<(), CodecError> {
        if let Some(position) = self.number_sign {
            return Err(CodecError::DanglingIndicator {
                indicator: Marker::NumberSign.name(),
                position,
            });
        }
        if let Some((position, _)) = self.capitals {
            return Err(CodecError::DanglingIndicator {
                indicator: Marker::Capital.name(),
                position,
            });
        }
        Ok(())
    }

    fn boundary(&mut self, plan: &mut DecodePlan) -> Result<(), CodecError> {
        self.flush(plan);
        self.check_dangling()
    }
}

/// Split `cells` into literal characters and content units.
pub fn plan_decode(
    cells: &[Cell],
    scheme: &MarkerScheme,
    default_language: Language,
) -> Result<DecodePlan, CodecError> {
    let mut plan = DecodePlan::default();
    let mut state = LineState::new(default_language);

    for (pos, &cell) in cells.iter().enumerate() {
        if cell.is_blank() {
            state.boundary(&mut plan)?;
            plan.parts.push(Part::Literal(' '));
            state.numeric = false;
            continue;
        }
        match scheme.marker(cell) {
            Some(Marker::LineBreak) => {
                state.boundary(&mut plan)?;
                plan.parts.push(Part::Literal('\n'));
                state = LineState::new(default_language);
            }
            Some(Marker::Switch(language)) => {
                state.boundary(&mut plan)?;
                state.language = language;
                state.numeric = false;
            }
            Some(Marker::NumberSign) => {
                state.boundary(&mut plan)?;
                state.numeric = true;
                state.number_sign = Some(pos);
            }
            Some(Marker::Capital) => {
                state.flush(&mut plan);
                if let Some(position) = state.number_sign {
                    return Err(CodecError::DanglingIndicator {
                        indicator: Marker::NumberSign.name(),
                        position,
                    });
                }
                state.numeric = false;
                state.capitals = match state.capitals {
                    None => Some((pos, 1)),
                    Some((first, 2)) => {
                        return Err(CodecError::CapitalRun {
                            count: 3,
                            position: first,
                        })
                    }
                    Some((first, n)) => Some((first, n + 1)),
                };
            }
            None => {
                if state.numeric {
                    if let Some(d) = cell_digit(cell) {
                        state.number_sign = None;
                        plan.parts.push(Part::Literal(d));
                        continue;
                    }
                    state.check_dangling()?;
                    state.numeric = false;
                }
                match state.unit.as_mut() {
                    Some(unit) => unit.cells.push(cell),
                    None => {
                        let caps = match state.capitals.take() {
                            Some((_, 1)) => Caps::Letter,
                            Some(_) => Caps::Word,
                            None => Caps::None,
                        };
                        state.unit = Some(Unit {
                            language: state.language,
                            cells: vec![cell],
                            caps,
                            position: pos,
                        });
                    }
                }
            }
        }
    }
    state.boundary(&mut plan)?;
    Ok(plan)
}
