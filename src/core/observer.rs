//! Injected observation hooks for classification and adjudication.
//!
//! The core never configures logging itself. Callers pass an [`Observer`]
//! explicitly: [`TracingObserver`] forwards to `tracing`, while
//! [`CollectingObserver`] keeps events in memory.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::scoring::CorrectnessTotals;

/// Annotation kind a matrix was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Entity,
    Relation,
}

/// Something that happened while processing a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObservedEvent {
    MatrixBuilt {
        file_id: u64,
        kind: AnnotationKind,
        totals: CorrectnessTotals,
    },
    RecordBuilt {
        file_id: u64,
        result_count: usize,
    },
    /// All annotations agreed and agreements were filtered out
    DocumentOmitted { file_id: u64 },
    DocumentFailed {
        file_id: u64,
        kind: String,
        error: String,
    },
}

/// Receiver for processing events
pub trait Observer: Send + Sync {
    fn observe(&self, event: ObservedEvent);
}

/// Forwards events to the `tracing` subscriber configured by the caller
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, event: ObservedEvent) {
        match event {
            ObservedEvent::MatrixBuilt {
                file_id,
                kind,
                totals,
            } => debug!(
                file_id,
                ?kind,
                tp = totals.true_positives,
                fp = totals.false_positives,
                fn_ = totals.false_negatives,
                "Correctness matrix built"
            ),
            ObservedEvent::RecordBuilt {
                file_id,
                result_count,
            } => debug!(file_id, result_count, "Adjudication record built"),
            ObservedEvent::DocumentOmitted { file_id } => {
                info!(file_id, "Full agreement, document omitted")
            }
            ObservedEvent::DocumentFailed {
                file_id,
                kind,
                error,
            } => warn!(file_id, %kind, %error, "Document failed"),
        }
    }
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<ObservedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn failures(&self) -> Vec<ObservedEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, ObservedEvent::DocumentFailed { .. }))
            .collect()
    }
}

impl Observer for CollectingObserver {
    fn observe(&self, event: ObservedEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
