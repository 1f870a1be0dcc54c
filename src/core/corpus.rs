//! Corpus-level driver: parse, classify and adjudicate every document.
//!
//! Documents are independent. A failure aborts only the document it
//! occurred in; the caller receives the successful records together with
//! the list of per-document failures.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::ResolvedConfig;
use crate::domain::{DocumentPair, Entity, Relation};
use crate::error::{AdjudicationError, Result};
use crate::ingest::{parse_task, task_id};

use super::adjudication::{AdjudicationBuilder, AdjudicationRecord};
use super::correctness::{
    build_entity_correctness_matrix, build_relation_correctness_matrix, check_linkage,
    CorrectnessMatrix,
};
use super::observer::{AnnotationKind, ObservedEvent, Observer};
use super::scoring::CorrectnessTotals;

/// Both correctness matrices of one document
#[derive(Debug, Clone)]
pub struct DocumentClassification {
    pub file_id: u64,
    pub entities: CorrectnessMatrix<Entity>,
    pub relations: CorrectnessMatrix<Relation>,
}

/// Result of processing one document successfully
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub classification: DocumentClassification,
    /// None when agreements were filtered and nothing remained
    pub record: Option<AdjudicationRecord>,
}

/// A document that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub file_id: Option<u64>,
    pub kind: String,
    pub message: String,
    #[serde(skip)]
    pub error: AdjudicationError,
}

impl DocumentFailure {
    pub fn new(file_id: Option<u64>, error: AdjudicationError) -> Self {
        Self {
            file_id,
            kind: error.kind().to_string(),
            message: error.to_string(),
            error,
        }
    }
}

/// Everything produced by one corpus run
#[derive(Debug, Clone, Default)]
pub struct CorpusOutcome {
    pub records: Vec<AdjudicationRecord>,
    pub failures: Vec<DocumentFailure>,
    pub entity_totals: CorrectnessTotals,
    pub relation_totals: CorrectnessTotals,
    /// Documents classified without error, including those whose record
    /// could not be built
    pub documents: usize,
    /// Documents omitted because everything agreed
    pub omitted: usize,
}

/// Classify entities and relations of one document and validate linkage
pub fn classify_document(
    pair: &DocumentPair,
    overlap: bool,
    observer: &dyn Observer,
) -> Result<DocumentClassification> {
    let entities = build_entity_correctness_matrix(
        &pair.prediction.entities,
        &pair.reference.entities,
        overlap,
    );
    observer.observe(ObservedEvent::MatrixBuilt {
        file_id: pair.file_id,
        kind: AnnotationKind::Entity,
        totals: entities.totals(),
    });

    let relations = build_relation_correctness_matrix(
        &pair.prediction.relations,
        &pair.reference.relations,
        overlap,
    );
    check_linkage(&relations, &entities, overlap)?;
    observer.observe(ObservedEvent::MatrixBuilt {
        file_id: pair.file_id,
        kind: AnnotationKind::Relation,
        totals: relations.totals(),
    });

    Ok(DocumentClassification {
        file_id: pair.file_id,
        entities,
        relations,
    })
}

/// Classify one document and build its adjudication record
pub fn adjudicate_document(
    pair: &DocumentPair,
    config: &ResolvedConfig,
    observer: &dyn Observer,
) -> Result<DocumentOutcome> {
    let classification = classify_document(pair, config.overlap, observer)?;
    let record = build_record(pair, &classification, config, observer)?;
    Ok(DocumentOutcome {
        classification,
        record,
    })
}

fn build_record(
    pair: &DocumentPair,
    classification: &DocumentClassification,
    config: &ResolvedConfig,
    observer: &dyn Observer,
) -> Result<Option<AdjudicationRecord>> {
    let record = AdjudicationBuilder::new(&config.annotators, &config.adjudication)
        .with_overlap(config.overlap)
        .build(
            pair.file_id,
            &pair.text,
            &classification.entities,
            &classification.relations,
        )?;

    match &record {
        Some(record) => observer.observe(ObservedEvent::RecordBuilt {
            file_id: pair.file_id,
            result_count: record.results().count(),
        }),
        None => observer.observe(ObservedEvent::DocumentOmitted {
            file_id: pair.file_id,
        }),
    }
    Ok(record)
}

/// Process exported tasks in order, collecting records and failures.
///
/// A document's counts enter the totals as soon as it is classified, so a
/// document whose record cannot be built still counts toward the scores.
#[instrument(skip_all, fields(tasks = tasks.len(), overlap = config.overlap))]
pub fn adjudicate_corpus(
    tasks: &[Value],
    config: &ResolvedConfig,
    observer: &dyn Observer,
) -> CorpusOutcome {
    run_corpus(tasks, config, observer, true)
}

/// Classify every task and sum the counts; no records are built
#[instrument(skip_all, fields(tasks = tasks.len(), overlap = config.overlap))]
pub fn score_corpus(tasks: &[Value], config: &ResolvedConfig, observer: &dyn Observer) -> CorpusOutcome {
    run_corpus(tasks, config, observer, false)
}

fn run_corpus(
    tasks: &[Value],
    config: &ResolvedConfig,
    observer: &dyn Observer,
    build_records: bool,
) -> CorpusOutcome {
    let mut outcome = CorpusOutcome::default();

    for task in tasks {
        let file_id = task_id(task);
        let classified = parse_task(task, &config.annotators, &config.ingest).and_then(|pair| {
            let classification = classify_document(&pair, config.overlap, observer)?;
            Ok((pair, classification))
        });

        let (pair, classification) = match classified {
            Ok(classified) => classified,
            Err(error) => {
                record_failure(&mut outcome, observer, file_id, error);
                continue;
            }
        };

        outcome.documents += 1;
        outcome.entity_totals += classification.entities.totals();
        outcome.relation_totals += classification.relations.totals();

        if !build_records {
            continue;
        }
        match build_record(&pair, &classification, config, observer) {
            Ok(Some(record)) => outcome.records.push(record),
            Ok(None) => outcome.omitted += 1,
            Err(error) => record_failure(&mut outcome, observer, file_id, error),
        }
    }

    info!(
        documents = outcome.documents,
        records = outcome.records.len(),
        omitted = outcome.omitted,
        failures = outcome.failures.len(),
        "Corpus processed"
    );
    outcome
}

fn record_failure(
    outcome: &mut CorpusOutcome,
    observer: &dyn Observer,
    file_id: Option<u64>,
    error: AdjudicationError,
) {
    observer.observe(ObservedEvent::DocumentFailed {
        file_id: file_id.unwrap_or_default(),
        kind: error.kind().to_string(),
        error: error.to_string(),
    });
    outcome.failures.push(DocumentFailure::new(file_id, error));
}
