//! Agreement score reports.
//!
//! A report summarizes one corpus run: entity and relation scores derived
//! from the summed correctness totals, plus the per-document failures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{CorpusOutcome, CorrectnessTotals, DocumentFailure, Scores};

/// Scores and raw counts for one annotation kind
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub totals: CorrectnessTotals,
    pub scores: Scores,
}

impl KindReport {
    pub fn new(totals: CorrectnessTotals, beta: f64) -> Self {
        Self {
            totals,
            scores: totals.score(beta),
        }
    }
}

/// Serializable summary of a corpus run
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub reference: String,
    pub prediction: String,
    pub overlap: bool,
    pub documents: usize,
    pub entities: KindReport,
    pub relations: KindReport,
    pub failures: Vec<DocumentFailure>,
}

impl ScoreReport {
    pub fn from_outcome(
        outcome: &CorpusOutcome,
        reference: &str,
        prediction: &str,
        overlap: bool,
        beta: f64,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            reference: reference.to_string(),
            prediction: prediction.to_string(),
            overlap,
            documents: outcome.documents,
            entities: KindReport::new(outcome.entity_totals, beta),
            relations: KindReport::new(outcome.relation_totals, beta),
            failures: outcome.failures.clone(),
        }
    }

    /// Fixed-width table for terminal output
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Reference: {}   Prediction: {}   Matching: {}\n",
            self.reference,
            self.prediction,
            if self.overlap { "overlap" } else { "exact" }
        ));
        out.push_str(&format!(
            "{:<10} {:>6} {:>6} {:>6} {:>10} {:>10} {:>10} {:>8}\n",
            "KIND", "TP", "FP", "FN", "PRECISION", "RECALL", "F", "SUPPORT"
        ));
        out.push_str(&format!("{}\n", "-".repeat(72)));
        for (name, kind) in [("entities", &self.entities), ("relations", &self.relations)] {
            out.push_str(&format!(
                "{:<10} {:>6} {:>6} {:>6} {:>10} {:>10} {:>10} {:>8}\n",
                name,
                kind.totals.true_positives,
                kind.totals.false_positives,
                kind.totals.false_negatives,
                format_score(kind.scores.precision),
                format_score(kind.scores.recall),
                format_score(kind.scores.f_beta),
                kind.scores.support,
            ));
        }
        out.push_str(&format!(
            "\nDocuments: {}   Failures: {}\n",
            self.documents,
            self.failures.len()
        ));
        out
    }
}

fn format_score(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_outcome() {
        let outcome = CorpusOutcome {
            entity_totals: CorrectnessTotals {
                true_positives: 3,
                false_positives: 1,
                false_negatives: 1,
                support: 4,
                ..Default::default()
            },
            documents: 2,
            ..Default::default()
        };

        let report = ScoreReport::from_outcome(&outcome, "alice", "bob", false, 1.0);
        assert_eq!(report.entities.scores.precision, 0.75);
        assert_eq!(report.entities.scores.recall, 0.75);
        assert!(report.relations.scores.precision.is_nan());

        let table = report.render_table();
        assert!(table.contains("0.7500"));
        assert!(table.contains("n/a"));
        assert!(table.contains("Documents: 2"));
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let outcome = CorpusOutcome::default();
        let report = ScoreReport::from_outcome(&outcome, "a", "b", true, 1.0);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["entities"]["scores"]["precision"].is_null());
    }
}
