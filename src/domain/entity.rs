//! Entity annotations.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::span::Span;

/// Temporal relation of an event to the document creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocTimeRel {
    #[serde(rename = "BEFORE")]
    Before,
    #[serde(rename = "OVERLAP")]
    Overlap,
    #[serde(rename = "AFTER")]
    After,
    #[serde(rename = "BEFORE-OVERLAP")]
    BeforeOverlap,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl DocTimeRel {
    /// Parse a tag, mapping anything unrecognized to `NotApplicable`
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "BEFORE" => Self::Before,
            "OVERLAP" => Self::Overlap,
            "AFTER" => Self::After,
            "BEFORE-OVERLAP" | "BEFORE/OVERLAP" => Self::BeforeOverlap,
            _ => Self::NotApplicable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "BEFORE",
            Self::Overlap => "OVERLAP",
            Self::After => "AFTER",
            Self::BeforeOverlap => "BEFORE-OVERLAP",
            Self::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for DocTimeRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span annotation produced by one annotator.
///
/// Equality and hashing consider only `(file_id, span)`. Label, text,
/// DocTimeRel and CUIs never take part in matching.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub file_id: u64,
    pub span: Span,
    /// Surface text, display only
    pub text: Option<String>,
    pub label: Option<String>,
    pub dtr: Option<DocTimeRel>,
    pub cuis: Vec<String>,
    /// Original per-attribute fragments from the export, verbatim
    pub source_annotations: Vec<Value>,
    /// Region id from the annotation tool
    pub external_id: String,
}

impl Entity {
    /// Bare entity with no attributes or source fragments
    pub fn new(file_id: u64, span: Span, external_id: impl Into<String>) -> Self {
        Self {
            file_id,
            span,
            text: None,
            label: None,
            dtr: None,
            cuis: Vec::new(),
            source_annotations: Vec::new(),
            external_id: external_id.into(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_dtr(mut self, dtr: DocTimeRel) -> Self {
        self.dtr = Some(dtr);
        self
    }

    pub fn with_cuis(mut self, cuis: Vec<String>) -> Self {
        self.cuis = cuis;
        self
    }

    pub fn with_sources(mut self, sources: Vec<Value>) -> Self {
        self.source_annotations = sources;
        self
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.file_id == other.file_id && self.span == other.span
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_id.hash(state);
        self.span.hash(state);
    }
}
