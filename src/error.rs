//! Error taxonomy for matching, classification, ingestion and adjudication.
//!
//! Every variant is fatal to the single document being processed. The
//! corpus driver records the failure and moves on to the next document.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AdjudicationError>;

/// Failures raised while processing one document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjudicationError {
    /// Span with non-positive length
    #[error("invalid span ({start}, {end}): start must be strictly less than end")]
    InvalidSpan { start: usize, end: usize },

    /// Relation references an entity outside the expected classification
    #[error("linkage error in file {file_id}: {detail}")]
    Linkage { file_id: u64, detail: String },

    /// More than one raw fragment resolved to one logical annotation
    #[error("duplicate annotation in file {file_id}: {key} resolved to {count} annotations")]
    DuplicateAnnotation {
        file_id: u64,
        key: String,
        count: usize,
    },

    /// Attribute kind outside the recognized set
    #[error("unsupported attribute '{attribute}' on annotation {annotation_id}")]
    UnsupportedAttribute {
        annotation_id: String,
        attribute: String,
    },

    /// Conflicting values for the same attribute on one entity
    #[error("ambiguous attribute '{attribute}' on annotation {annotation_id}: {values:?}")]
    AmbiguousAttribute {
        annotation_id: String,
        attribute: String,
        values: Vec<String>,
    },

    /// Stored support disagrees with TP + FN
    #[error("inconsistent support: stored {stored}, true positives + false negatives = {computed}")]
    InconsistentSupport { stored: usize, computed: usize },

    /// Fragment missing a load-bearing field
    #[error("malformed annotation fragment: {0}")]
    Malformed(String),
}

impl AdjudicationError {
    pub(crate) fn linkage(file_id: u64, detail: impl Into<String>) -> Self {
        Self::Linkage {
            file_id,
            detail: detail.into(),
        }
    }

    /// Short machine-readable kind, used in failure logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSpan { .. } => "invalid_span",
            Self::Linkage { .. } => "linkage",
            Self::DuplicateAnnotation { .. } => "duplicate_annotation",
            Self::UnsupportedAttribute { .. } => "unsupported_attribute",
            Self::AmbiguousAttribute { .. } => "ambiguous_attribute",
            Self::InconsistentSupport { .. } => "inconsistent_support",
            Self::Malformed(_) => "malformed",
        }
    }
}
