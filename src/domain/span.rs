//! Half-open character offset intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AdjudicationError, Result};

/// Half-open interval `[start, end)` into a document's text.
///
/// Construction enforces `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span, failing with `InvalidSpan` when `start >= end`
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start >= end {
            return Err(AdjudicationError::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Interval intersection test
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }
}

impl TryFrom<(usize, usize)> for Span {
    type Error = AdjudicationError;

    fn try_from((start, end): (usize, usize)) -> Result<Self> {
        Span::new(start, end)
    }
}

impl From<Span> for (usize, usize) {
    fn from(span: Span) -> Self {
        (span.start, span.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.start, self.end)
    }
}
