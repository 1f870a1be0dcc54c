//! Correctness classification of predicted vs reference annotations.
//!
//! Matching is existential: a predicted item is a true positive when it
//! matches at least one reference item, otherwise a false positive. A
//! reference item is a false negative when no predicted item matches it.
//! True positives and false positives therefore carry predicted-side
//! provenance, false negatives carry reference-side provenance.
//!
//! True negatives are never materialized; span tasks have no finite
//! negative set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Entity, Relation};
use crate::error::{AdjudicationError, Result};

use super::matcher::{entities_match, relations_match};
use super::scoring::{self, CorrectnessTotals};

/// Outcome of classifying one annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

/// Four-way classification of annotation instances plus support.
///
/// Buckets keep input order so that classifying the same inputs twice
/// yields identical contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectnessMatrix<T> {
    pub true_positives: Vec<T>,
    pub true_negatives: Vec<T>,
    pub false_positives: Vec<T>,
    pub false_negatives: Vec<T>,
    pub support: usize,
}

impl<T> Default for CorrectnessMatrix<T> {
    fn default() -> Self {
        Self {
            true_positives: Vec::new(),
            true_negatives: Vec::new(),
            false_positives: Vec::new(),
            false_negatives: Vec::new(),
            support: 0,
        }
    }
}

impl<T> CorrectnessMatrix<T> {
    /// Iterate every classified item with its outcome, bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = (Correctness, &T)> {
        let tp = self.true_positives.iter().map(|t| (Correctness::TruePositive, t));
        let tn = self.true_negatives.iter().map(|t| (Correctness::TrueNegative, t));
        let fp = self.false_positives.iter().map(|t| (Correctness::FalsePositive, t));
        let fn_ = self.false_negatives.iter().map(|t| (Correctness::FalseNegative, t));
        tp.chain(tn).chain(fp).chain(fn_)
    }

    pub fn len(&self) -> usize {
        self.true_positives.len()
            + self.true_negatives.len()
            + self.false_positives.len()
            + self.false_negatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Support, validated against TP + FN
    pub fn checked_support(&self) -> Result<usize> {
        let computed = self.true_positives.len() + self.false_negatives.len();
        if self.support != computed {
            return Err(AdjudicationError::InconsistentSupport {
                stored: self.support,
                computed,
            });
        }
        Ok(self.support)
    }

    pub fn totals(&self) -> CorrectnessTotals {
        CorrectnessTotals {
            true_positives: self.true_positives.len(),
            true_negatives: self.true_negatives.len(),
            false_positives: self.false_positives.len(),
            false_negatives: self.false_negatives.len(),
            support: self.support,
        }
    }

    pub fn precision(&self) -> f64 {
        scoring::precision(self.true_positives.len(), self.false_positives.len())
    }

    pub fn recall(&self) -> f64 {
        scoring::recall(self.true_positives.len(), self.false_negatives.len())
    }

    pub fn f_beta(&self, beta: f64) -> f64 {
        scoring::f_beta(self.precision(), self.recall(), beta)
    }

    pub fn f1(&self) -> f64 {
        scoring::f1(self.precision(), self.recall())
    }

    /// Group items by a stable key, keeping every item found under it.
    ///
    /// Callers decide whether more than one item per key is an error.
    pub fn index_by<K, F>(&self, key: F) -> BTreeMap<K, Vec<(Correctness, &T)>>
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut index: BTreeMap<K, Vec<(Correctness, &T)>> = BTreeMap::new();
        for (correctness, item) in self.iter() {
            index.entry(key(item)).or_default().push((correctness, item));
        }
        index
    }
}

impl<T: PartialEq> CorrectnessMatrix<T> {
    /// Outcome for an item, compared with `T`'s equality
    pub fn correctness_of(&self, item: &T) -> Option<Correctness> {
        self.iter().find(|(_, t)| *t == item).map(|(c, _)| c)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.correctness_of(item).is_some()
    }
}

/// Existential partition shared by entities and relations
fn partition<T, F>(predicted: &[T], reference: &[T], matches: F) -> CorrectnessMatrix<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut matrix = CorrectnessMatrix::default();

    for p in predicted {
        if reference.iter().any(|r| matches(p, r)) {
            matrix.true_positives.push(p.clone());
        } else {
            matrix.false_positives.push(p.clone());
        }
    }

    for r in reference {
        if !predicted.iter().any(|p| matches(p, r)) {
            matrix.false_negatives.push(r.clone());
        }
    }

    matrix.support = matrix.true_positives.len() + matrix.false_negatives.len();
    matrix
}

/// Classify predicted entities against reference entities
pub fn build_entity_correctness_matrix(
    predicted: &[Entity],
    reference: &[Entity],
    overlap: bool,
) -> CorrectnessMatrix<Entity> {
    partition(predicted, reference, |p, r| entities_match(p, r, overlap))
}

/// Classify predicted relations against reference relations.
///
/// Pair with [`check_linkage`] to validate the result against the entity
/// classification of the same document.
pub fn build_relation_correctness_matrix(
    predicted: &[Relation],
    reference: &[Relation],
    overlap: bool,
) -> CorrectnessMatrix<Relation> {
    partition(predicted, reference, |p, r| relations_match(p, r, overlap))
}

/// Validate that relation correctness never outruns entity correctness.
///
/// - true-positive relations: both arguments are entity true positives
/// - false-positive relations: arguments are true or false positives
/// - false-negative relations: arguments are true positives (a reference
///   entity counts when some true positive matches it) or false negatives
pub fn check_linkage(
    relations: &CorrectnessMatrix<Relation>,
    entities: &CorrectnessMatrix<Entity>,
    overlap: bool,
) -> Result<()> {
    let is_tp = |e: &Entity| entities.true_positives.contains(e);
    let is_fp = |e: &Entity| entities.false_positives.contains(e);
    let is_fn = |e: &Entity| entities.false_negatives.contains(e);
    let covered_by_tp = |e: &Entity| {
        entities
            .true_positives
            .iter()
            .any(|tp| entities_match(tp, e, overlap))
    };

    for relation in &relations.true_positives {
        for arg in [&relation.arg1, &relation.arg2] {
            if !is_tp(arg) {
                return Err(linkage_error(relation, arg, "true-positive", "entity true positives"));
            }
        }
    }

    for relation in &relations.false_positives {
        for arg in [&relation.arg1, &relation.arg2] {
            if !(is_tp(arg) || is_fp(arg)) {
                return Err(linkage_error(
                    relation,
                    arg,
                    "false-positive",
                    "entity true or false positives",
                ));
            }
        }
    }

    for relation in &relations.false_negatives {
        for arg in [&relation.arg1, &relation.arg2] {
            if !(is_tp(arg) || is_fn(arg) || covered_by_tp(arg)) {
                return Err(linkage_error(
                    relation,
                    arg,
                    "false-negative",
                    "entity true positives or false negatives",
                ));
            }
        }
    }

    Ok(())
}

fn linkage_error(relation: &Relation, arg: &Entity, kind: &str, expected: &str) -> AdjudicationError {
    AdjudicationError::linkage(
        relation.file_id,
        format!(
            "{} relation {:?} argument {} at {} is not among {}",
            kind, relation.label, arg.external_id, arg.span, expected
        ),
    )
}
