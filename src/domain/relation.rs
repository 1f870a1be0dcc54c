//! Relation annotations linking two entities.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::entity::Entity;

/// A labelled link between two entities of the same file.
///
/// Matching semantics live in `core::matcher`; a directed and an
/// undirected relation never match.
#[derive(Debug, Clone, Serialize)]
pub struct Relation {
    pub file_id: u64,
    pub arg1: Entity,
    pub arg2: Entity,
    pub label: BTreeSet<String>,
    pub directed: bool,
    pub source_annotations: Vec<Value>,
}

impl Relation {
    pub fn new<I, S>(file_id: u64, arg1: Entity, arg2: Entity, labels: I, directed: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_id,
            arg1,
            arg2,
            label: labels.into_iter().map(Into::into).collect(),
            directed,
            source_annotations: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<Value>) -> Self {
        self.source_annotations = sources;
        self
    }

    /// Grouping key: (from-id, to-id) of the argument regions
    pub fn endpoint_ids(&self) -> (&str, &str) {
        (&self.arg1.external_id, &self.arg2.external_id)
    }

    /// Direction string understood by the review tool
    pub fn direction(&self) -> &'static str {
        if self.directed {
            "right"
        } else {
            "bi"
        }
    }
}
