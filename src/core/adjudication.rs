//! Reviewer-facing adjudication records.
//!
//! Consumes the classified entity and relation matrices of one document and
//! re-emits every surviving annotation tagged with its provenance:
//! true positives become `Agreement`, false positives carry the prediction
//! annotator's name, false negatives the reference annotator's name.
//!
//! Each entity contributes one synthetic labels record followed by its
//! original fragments, and each relation one synthetic relation record
//! followed by its original relation fragment. Record ids are the external
//! ids assigned upstream. The one exception: a false-negative relation
//! whose argument was only matched through a true-positive entity is
//! re-pointed at that entity's id, since the reference copy is never
//! emitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{AnnotatorTag, Annotators, Entity, Relation};
use crate::error::{AdjudicationError, Result};

use super::correctness::{Correctness, CorrectnessMatrix};
use super::matcher::entities_match;

/// Output shaping options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationOptions {
    /// Drop agreements; omit documents left with nothing to review
    #[serde(default)]
    pub filter_agreements: bool,
    /// Control name carrying the provenance labels
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Object tag the control labels
    #[serde(default = "default_to_name")]
    pub to_name: String,
    /// Value written into every emitted region's `origin`
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_from_name() -> String {
    "annotator".to_string()
}
fn default_to_name() -> String {
    "text".to_string()
}
fn default_origin() -> String {
    "prediction".to_string()
}

impl Default for AdjudicationOptions {
    fn default() -> Self {
        Self {
            filter_agreements: false,
            from_name: default_from_name(),
            to_name: default_to_name(),
            origin: default_origin(),
        }
    }
}

/// One document in the review tool's import format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjudicationRecord {
    pub id: u64,
    pub data: TaskData,
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u64,
    pub result: Vec<Value>,
}

impl AdjudicationRecord {
    /// Every emitted result item
    pub fn results(&self) -> impl Iterator<Item = &Value> {
        self.predictions.iter().flat_map(|p| p.result.iter())
    }
}

/// Map a classification outcome to its provenance tag.
///
/// True negatives never appear in the output.
pub fn tag_for(correctness: Correctness, annotators: &Annotators) -> Option<AnnotatorTag> {
    match correctness {
        Correctness::TruePositive => Some(AnnotatorTag::Agreement),
        Correctness::FalsePositive => Some(annotators.prediction_tag()),
        Correctness::FalseNegative => Some(annotators.reference_tag()),
        Correctness::TrueNegative => None,
    }
}

/// Builds adjudication records for single documents
pub struct AdjudicationBuilder<'a> {
    annotators: &'a Annotators,
    options: &'a AdjudicationOptions,
    overlap: bool,
}

/// Endpoint ids as written in the export, and as emitted
type EndpointIds = (String, String);

impl<'a> AdjudicationBuilder<'a> {
    pub fn new(annotators: &'a Annotators, options: &'a AdjudicationOptions) -> Self {
        Self {
            annotators,
            options,
            overlap: false,
        }
    }

    /// Matching policy the matrices were classified with
    pub fn with_overlap(mut self, overlap: bool) -> Self {
        self.overlap = overlap;
        self
    }

    /// Build the record for one document.
    ///
    /// Returns `Ok(None)` when agreements are filtered and nothing else
    /// survives. Any duplicate or dangling reference aborts the whole
    /// document; no partial record is produced.
    pub fn build(
        &self,
        file_id: u64,
        text: &str,
        entities: &CorrectnessMatrix<Entity>,
        relations: &CorrectnessMatrix<Relation>,
    ) -> Result<Option<AdjudicationRecord>> {
        let entity_groups = entities.index_by(|e| e.external_id.clone());
        let entity_index = singular(file_id, entity_groups, |id| format!("entity {}", id))?;

        let relation_groups = relations.index_by(|r| {
            let (from, to) = r.endpoint_ids();
            (from.to_string(), to.to_string())
        });
        let relation_index = singular(file_id, relation_groups, |(from, to)| {
            format!("relation {} -> {}", from, to)
        })?;

        let mut endpoints: BTreeMap<EndpointIds, EndpointIds> = BTreeMap::new();
        for (key, (correctness, relation)) in &relation_index {
            let resolved = (
                self.resolve_argument(file_id, *correctness, &relation.arg1, &entity_index, entities)?,
                self.resolve_argument(file_id, *correctness, &relation.arg2, &entity_index, entities)?,
            );
            endpoints.insert(key.clone(), resolved);
        }

        let mut ordered: Vec<(Correctness, &Entity)> = entity_index.values().copied().collect();
        ordered.sort_by(|(_, a), (_, b)| {
            a.span
                .cmp(&b.span)
                .then_with(|| a.external_id.cmp(&b.external_id))
        });

        let mut result = Vec::new();

        for (correctness, entity) in ordered {
            let Some(tag) = self.surviving_tag(correctness) else {
                continue;
            };
            result.push(self.entity_record(entity, &tag, text));
            for fragment in &entity.source_annotations {
                result.push(self.with_origin(fragment)?);
            }
        }

        for (correctness, relation) in relations.iter() {
            let Some(tag) = self.surviving_tag(correctness) else {
                continue;
            };
            let (from, to) = relation.endpoint_ids();
            let Some((from_id, to_id)) = endpoints.get(&(from.to_string(), to.to_string())) else {
                continue;
            };
            result.push(relation_record(relation, from_id, to_id, &tag));

            let renames = [(from, from_id.as_str()), (to, to_id.as_str())];
            for fragment in &relation.source_annotations {
                result.push(with_endpoints(fragment, &renames)?);
            }
        }

        if result.is_empty() && self.options.filter_agreements {
            return Ok(None);
        }

        Ok(Some(AdjudicationRecord {
            id: file_id,
            data: TaskData {
                text: text.to_string(),
            },
            predictions: vec![Prediction {
                id: file_id,
                result,
            }],
        }))
    }

    fn surviving_tag(&self, correctness: Correctness) -> Option<AnnotatorTag> {
        let tag = tag_for(correctness, self.annotators)?;
        if tag.is_agreement() && self.options.filter_agreements {
            return None;
        }
        Some(tag)
    }

    /// Find the id an argument is emitted under.
    ///
    /// The argument must be classified with an outcome compatible with the
    /// relation's own outcome. A false-negative relation's argument may
    /// instead be matched by a true-positive entity, whose id is returned.
    fn resolve_argument(
        &self,
        file_id: u64,
        correctness: Correctness,
        arg: &Entity,
        entity_index: &BTreeMap<String, (Correctness, &Entity)>,
        entities: &CorrectnessMatrix<Entity>,
    ) -> Result<String> {
        let allowed: &[Correctness] = match correctness {
            Correctness::TruePositive => &[Correctness::TruePositive],
            Correctness::FalsePositive => &[Correctness::TruePositive, Correctness::FalsePositive],
            Correctness::FalseNegative => &[Correctness::TruePositive, Correctness::FalseNegative],
            Correctness::TrueNegative => &[],
        };

        if let Some((found, indexed)) = entity_index.get(&arg.external_id) {
            if *indexed == arg {
                if allowed.contains(found) {
                    return Ok(arg.external_id.clone());
                }
                return Err(AdjudicationError::linkage(
                    file_id,
                    format!(
                        "{:?} relation argument {} is classified {:?}",
                        correctness, arg.external_id, found
                    ),
                ));
            }
        }

        if correctness == Correctness::FalseNegative {
            if let Some(covering) = entities
                .true_positives
                .iter()
                .find(|tp| entities_match(tp, arg, self.overlap))
            {
                return Ok(covering.external_id.clone());
            }
        }

        Err(AdjudicationError::linkage(
            file_id,
            format!(
                "{:?} relation argument {} at {} not found among classified entities",
                correctness, arg.external_id, arg.span
            ),
        ))
    }

    fn entity_record(&self, entity: &Entity, tag: &AnnotatorTag, document: &str) -> Value {
        let text = entity
            .text
            .clone()
            .unwrap_or_else(|| char_slice(document, entity.span.start(), entity.span.end()));

        json!({
            "id": entity.external_id,
            "value": {
                "start": entity.span.start(),
                "end": entity.span.end(),
                "text": text,
                "labels": [tag.label()],
            },
            "from_name": self.options.from_name,
            "to_name": self.options.to_name,
            "type": "labels",
            "origin": self.options.origin,
        })
    }

    fn with_origin(&self, fragment: &Value) -> Result<Value> {
        let mut object: Map<String, Value> = fragment
            .as_object()
            .cloned()
            .ok_or_else(|| AdjudicationError::Malformed(format!("fragment is not an object: {}", fragment)))?;
        object.insert("origin".to_string(), Value::String(self.options.origin.clone()));
        Ok(Value::Object(object))
    }
}

fn relation_record(relation: &Relation, from_id: &str, to_id: &str, tag: &AnnotatorTag) -> Value {
    json!({
        "from_id": from_id,
        "to_id": to_id,
        "type": "relation",
        "direction": relation.direction(),
        "labels": [tag.label()],
    })
}

/// Original relation fragment, with endpoint ids re-pointed where needed
fn with_endpoints(fragment: &Value, renames: &[(&str, &str)]) -> Result<Value> {
    let mut object: Map<String, Value> = fragment
        .as_object()
        .cloned()
        .ok_or_else(|| AdjudicationError::Malformed(format!("fragment is not an object: {}", fragment)))?;
    for key in ["from_id", "to_id"] {
        let renamed = object
            .get(key)
            .and_then(Value::as_str)
            .and_then(|id| renames.iter().find(|(old, _)| *old == id))
            .map(|(_, new)| new.to_string());
        if let Some(new) = renamed {
            object.insert(key.to_string(), Value::String(new));
        }
    }
    Ok(Value::Object(object))
}

/// Collapse groups to their single member, failing on duplicates
fn singular<'m, K, T, F>(
    file_id: u64,
    groups: BTreeMap<K, Vec<(Correctness, &'m T)>>,
    describe: F,
) -> Result<BTreeMap<K, (Correctness, &'m T)>>
where
    K: Ord,
    F: Fn(&K) -> String,
{
    let mut index = BTreeMap::new();
    for (key, members) in groups {
        match members.as_slice() {
            [single] => {
                index.insert(key, *single);
            }
            _ => {
                return Err(AdjudicationError::DuplicateAnnotation {
                    file_id,
                    key: describe(&key),
                    count: members.len(),
                })
            }
        }
    }
    Ok(index)
}

/// Substring by character offsets, as the review tool counts them
fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}
