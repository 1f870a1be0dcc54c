//! Core comparison logic.
//!
//! This module contains:
//! - Matcher: exact/overlap match predicates for entities and relations
//! - Correctness: TP/FP/FN classification and linkage validation
//! - Scoring: precision, recall, F-beta and summable totals
//! - Adjudication: reviewer-facing records tagged by provenance
//! - Corpus: per-document driver collecting records and failures
//! - Observer: injected event sink

pub mod adjudication;
pub mod corpus;
pub mod correctness;
pub mod matcher;
pub mod observer;
pub mod scoring;

// Re-export commonly used types
pub use adjudication::{
    tag_for, AdjudicationBuilder, AdjudicationOptions, AdjudicationRecord, Prediction, TaskData,
};
pub use corpus::{
    adjudicate_corpus, adjudicate_document, classify_document, score_corpus, CorpusOutcome,
    DocumentClassification, DocumentFailure, DocumentOutcome,
};
pub use correctness::{
    build_entity_correctness_matrix, build_relation_correctness_matrix, check_linkage,
    Correctness, CorrectnessMatrix,
};
pub use matcher::{entities_match, perfect_matching_exists, relations_match};
pub use observer::{AnnotationKind, CollectingObserver, ObservedEvent, Observer, TracingObserver};
pub use scoring::{f1, f_beta, precision, recall, CorrectnessTotals, Scores};
