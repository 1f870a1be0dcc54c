//! Per-document, per-annotator annotation sets.

use super::entity::Entity;
use super::relation::Relation;

/// Everything one annotator produced for one document
#[derive(Debug, Clone, Default)]
pub struct AnnotatedFile {
    pub file_id: u64,
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

/// A document with both annotators' work, ready for comparison
#[derive(Debug, Clone)]
pub struct DocumentPair {
    pub file_id: u64,
    pub text: String,
    pub reference: AnnotatedFile,
    pub prediction: AnnotatedFile,
}

impl AnnotatedFile {
    pub fn new(file_id: u64) -> Self {
        Self {
            file_id,
            ..Default::default()
        }
    }
}
