//! adjudicator - Inter-annotator agreement and adjudication
//!
//! Compares two annotators' span-based entity and relation annotations
//! over the same documents, classifies every annotation as a true
//! positive, false positive or false negative, derives precision/recall/F
//! scores, and rebuilds a reviewer-facing adjudication file that tags each
//! surviving annotation with its provenance.
//!
//! # Architecture
//!
//! Processing is a pure, per-document transformation:
//! - Matching decides whether two entities or relations correspond
//! - Classification partitions annotations into correctness buckets
//! - Adjudication re-emits the classified annotations for review
//!
//! # Modules
//!
//! - `core`: Matching, classification, scoring, adjudication, corpus driver
//! - `domain`: Data structures (Span, Entity, Relation, AnnotatorTag)
//! - `ingest`: Export parsing and attribute coordination
//! - `report`: Score summaries
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Score agreement
//! adjudicator score export.json
//!
//! # Write a disagreements-only review file
//! adjudicator adjudicate export.json -o review.json --filter-agreements
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod report;

// Re-export main types at crate root for convenience
pub use crate::config::{load_config, ResolvedConfig};
pub use crate::core::{
    adjudicate_corpus, build_entity_correctness_matrix, build_relation_correctness_matrix,
    entities_match, relations_match, AdjudicationBuilder, AdjudicationOptions,
    AdjudicationRecord, Correctness, CorrectnessMatrix, CorrectnessTotals,
};
pub use crate::domain::{AnnotatorTag, Annotators, DocTimeRel, Entity, Relation, Span};
pub use crate::error::{AdjudicationError, Result};
