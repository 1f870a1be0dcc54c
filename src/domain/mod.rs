//! Domain types for annotation comparison.
//!
//! This module contains the immutable value objects:
//! - Span: half-open offset interval
//! - Entity / Relation: one annotator's annotations
//! - AnnotatorTag: provenance label for adjudication output

pub mod annotator;
pub mod document;
pub mod entity;
pub mod relation;
pub mod span;

// Re-export commonly used types
pub use annotator::{AnnotatorIdentity, AnnotatorTag, Annotators, Side, AGREEMENT_LABEL};
pub use document::{AnnotatedFile, DocumentPair};
pub use entity::{DocTimeRel, Entity};
pub use relation::Relation;
pub use span::Span;
