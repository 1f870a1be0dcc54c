//! Annotator provenance tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Label emitted for annotations both annotators produced
pub const AGREEMENT_LABEL: &str = "Agreement";

/// Provenance of a surviving annotation in an adjudication record.
///
/// Reference and Prediction carry the annotator's display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "side", content = "name", rename_all = "snake_case")]
pub enum AnnotatorTag {
    Reference(String),
    Prediction(String),
    Agreement,
}

impl AnnotatorTag {
    /// Label value written into the review tool's `labels` field
    pub fn label(&self) -> &str {
        match self {
            Self::Reference(name) | Self::Prediction(name) => name,
            Self::Agreement => AGREEMENT_LABEL,
        }
    }

    pub fn is_agreement(&self) -> bool {
        matches!(self, Self::Agreement)
    }
}

impl fmt::Display for AnnotatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two compared annotators, assembled once from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotators {
    pub reference: AnnotatorIdentity,
    pub prediction: AnnotatorIdentity,
}

/// Display name plus the tool-side user ids that belong to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorIdentity {
    pub name: String,
    #[serde(default)]
    pub ids: Vec<u64>,
}

/// Which side of the comparison an annotation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Reference,
    Prediction,
}

impl Annotators {
    pub fn new(reference: AnnotatorIdentity, prediction: AnnotatorIdentity) -> Self {
        Self {
            reference,
            prediction,
        }
    }

    pub fn reference_tag(&self) -> AnnotatorTag {
        AnnotatorTag::Reference(self.reference.name.clone())
    }

    pub fn prediction_tag(&self) -> AnnotatorTag {
        AnnotatorTag::Prediction(self.prediction.name.clone())
    }

    /// Resolve a tool user id to a side
    pub fn side_of(&self, user_id: u64) -> Option<Side> {
        if self.reference.ids.contains(&user_id) {
            Some(Side::Reference)
        } else if self.prediction.ids.contains(&user_id) {
            Some(Side::Prediction)
        } else {
            None
        }
    }
}

impl AnnotatorIdentity {
    pub fn new(name: impl Into<String>, ids: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_labels() {
        let annotators = Annotators::new(
            AnnotatorIdentity::new("alice", vec![1]),
            AnnotatorIdentity::new("bob", vec![2, 3]),
        );
        assert_eq!(annotators.reference_tag().label(), "alice");
        assert_eq!(annotators.prediction_tag().label(), "bob");
        assert_eq!(AnnotatorTag::Agreement.label(), "Agreement");
    }

    #[test]
    fn test_side_lookup() {
        let annotators = Annotators::new(
            AnnotatorIdentity::new("alice", vec![1]),
            AnnotatorIdentity::new("bob", vec![2, 3]),
        );
        assert_eq!(annotators.side_of(1), Some(Side::Reference));
        assert_eq!(annotators.side_of(3), Some(Side::Prediction));
        assert_eq!(annotators.side_of(9), None);
    }
}
