//! Semantic comparison of two lockfiles.
//!
//! This crate ties the schema layer together into the diff engine: both
//! documents are parsed and normalized, every package entry is reduced to
//! its canonical form, and the differences are grouped into `meta` and
//! `packages` hunks (`diff_lockfiles`). The `highlight` module classifies
//! the tokens of a modified entry so a renderer can emphasise what changed.
//! Nothing here prints or touches the terminal.

pub mod diff;
pub mod highlight;

pub use diff::{diff_documents, diff_lockfiles, Change, DiffOptions, DiffReport, Hunk, Section};
pub use highlight::{highlight, tokenize, Highlight, HighlightedLine, Marker, Segment};

use lockdiff_schema::LockError;
use std::fmt;
use thiserror::Error;

/// Which of the two compared documents an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => f.write_str("old"),
            Side::New => f.write_str("new"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{side} lockfile: {source}")]
    Document {
        side: Side,
        #[source]
        source: LockError,
    },
}

impl CoreError {
    pub(crate) fn document(side: Side) -> impl FnOnce(LockError) -> Self {
        move |source| CoreError::Document { side, source }
    }

    pub fn side(&self) -> Side {
        match self {
            CoreError::Document { side, .. } => *side,
        }
    }

    pub fn lock_error(&self) -> &LockError {
        match self {
            CoreError::Document { source, .. } => source,
        }
    }

    pub fn is_schema_violation(&self) -> bool {
        self.lock_error().is_schema_violation()
    }
}
