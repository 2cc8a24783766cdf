//! Translation services and the orchestrator that drives them.

pub mod louis;
pub mod memory;
pub mod orchestrator;
pub mod reverse;

use std::fmt;

use crate::cell::{Cell, CellSequence};
use crate::segment::Language;

/// Name of a translation table, e.g. `en-us-g2.ctb`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TableId(pub String);

impl TableId {
    pub fn new(name: impl Into<String>) -> Self {
        TableId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uncontracted and contracted tables for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TablePair {
    pub grade1: TableId,
    pub grade2: TableId,
}

impl TablePair {
    pub fn new(grade1: impl Into<String>, grade2: impl Into<String>) -> Self {
        Self {
            grade1: TableId::new(grade1),
            grade2: TableId::new(grade2),
        }
    }

    pub fn table(&self, grade: Grade) -> &TableId {
        match grade {
            Grade::One => &self.grade1,
            Grade::Two => &self.grade2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Grade {
    One,
    Two,
}

/// Failure reported by a translation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
    /// Worth one more attempt, e.g. a process that failed to spawn.
    pub transient: bool,
}

impl ServiceError {
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: false,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            transient: true,
        }
    }
}

/// External text/cell translator.
///
/// Implementations are shared across worker threads.
pub trait TranslationService: Send + Sync + 'static {
    fn translate(&self, table: &TableId, text: &str) -> Result<CellSequence, ServiceError>;

    fn back_translate(&self, table: &TableId, cells: &[Cell]) -> Result<String, ServiceError>;
}

/// Where a translation gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum FailureKind {
    /// The service returned an error.
    Service,
    /// The output was empty, too short, or used reserved cells.
    Implausible,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A piece of text or cells that produced no output after all fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{direction:?} translation failed at {position} ({language}, {kind:?}): {cause}")]
pub struct TranslationFailure {
    /// Byte offset in the text (forward) or cell index (reverse).
    pub position: usize,
    pub language: Language,
    pub direction: Direction,
    pub kind: FailureKind,
    pub cause: String,
}

/// Cells produced for one content piece.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TranslationResult {
    pub position: usize,
    pub language: Language,
    pub text: String,
    pub cells: CellSequence,
    pub used_fallback_table: bool,
    /// Whether the contracted form is shorter than the letter-by-letter
    /// form. Only computed when analysis is enabled.
    pub contracted: Option<bool>,
}
