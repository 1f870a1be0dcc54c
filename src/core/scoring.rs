//! Precision, recall and F-beta from correctness counts.
//!
//! Undefined scores (zero denominators) are NaN rather than errors: "no
//! data" is distinct from "failure". NaN propagates through arithmetic.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{AdjudicationError, Result};

/// tp / (tp + fp), NaN when both are zero
pub fn precision(true_positives: usize, false_positives: usize) -> f64 {
    ratio(true_positives, true_positives + false_positives)
}

/// tp / (tp + fn), NaN when both are zero
pub fn recall(true_positives: usize, false_negatives: usize) -> f64 {
    ratio(true_positives, true_positives + false_negatives)
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return f64::NAN;
    }
    numerator as f64 / denominator as f64
}

/// Weighted harmonic mean of precision and recall
pub fn f_beta(precision: f64, recall: f64, beta: f64) -> f64 {
    let beta_squared = beta * beta;
    let denominator = beta_squared * precision + recall;
    if denominator == 0.0 || denominator.is_nan() {
        return f64::NAN;
    }
    (1.0 + beta_squared) * precision * recall / denominator
}

pub fn f1(precision: f64, recall: f64) -> f64 {
    f_beta(precision, recall, 1.0)
}

/// Raw counts for one annotation kind, summable across documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectnessTotals {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub support: usize,
}

impl CorrectnessTotals {
    /// Support, validated against TP + FN
    pub fn checked_support(&self) -> Result<usize> {
        let computed = self.true_positives + self.false_negatives;
        if self.support != computed {
            return Err(AdjudicationError::InconsistentSupport {
                stored: self.support,
                computed,
            });
        }
        Ok(self.support)
    }

    pub fn score(&self, beta: f64) -> Scores {
        let precision = precision(self.true_positives, self.false_positives);
        let recall = recall(self.true_positives, self.false_negatives);
        Scores {
            precision,
            recall,
            f_beta: f_beta(precision, recall, beta),
            beta,
            support: self.true_positives + self.false_negatives,
        }
    }
}

impl Add for CorrectnessTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            true_positives: self.true_positives + rhs.true_positives,
            true_negatives: self.true_negatives + rhs.true_negatives,
            false_positives: self.false_positives + rhs.false_positives,
            false_negatives: self.false_negatives + rhs.false_negatives,
            support: self.support + rhs.support,
        }
    }
}

impl AddAssign for CorrectnessTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for CorrectnessTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Derived metrics for one annotation kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    pub f_beta: f64,
    pub beta: f64,
    pub support: usize,
}
