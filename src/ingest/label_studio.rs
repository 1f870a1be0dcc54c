//! Parsing of the review tool's JSON export into typed annotations.
//!
//! A task looks like:
//!
//! ```text
//! { "id": 12, "data": {"text": "..."},
//!   "annotations": [ { "completed_by": 3, "result": [fragment, ...] } ] }
//! ```
//!
//! Region fragments sharing an `id` describe one entity: the `labels`
//! fragment carries its category, `choices`/`textarea` fragments carry
//! attributes (DocTimeRel, CUIs) keyed by their control name.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{AnnotatedFile, Annotators, DocTimeRel, DocumentPair, Entity, Relation, Side, Span};
use crate::error::{AdjudicationError, Result};

/// Control names recognized during attribute coordination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Key under `data` holding the document text
    #[serde(default = "default_text_field")]
    pub text_field: String,
    #[serde(default = "default_doc_time_rel")]
    pub doc_time_rel: String,
    #[serde(default = "default_cui")]
    pub cui: String,
    /// Controls that are present in the export but carry nothing to compare
    #[serde(default)]
    pub ignored: Vec<String>,
}

fn default_text_field() -> String {
    "text".to_string()
}
fn default_doc_time_rel() -> String {
    "DocTimeRel".to_string()
}
fn default_cui() -> String {
    "CUI".to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            text_field: default_text_field(),
            doc_time_rel: default_doc_time_rel(),
            cui: default_cui(),
            ignored: Vec::new(),
        }
    }
}

/// Task id, if the task carries a usable one
pub fn task_id(task: &Value) -> Option<u64> {
    match task.get("id")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Split one exported task into the reference and prediction annotations
pub fn parse_task(task: &Value, annotators: &Annotators, config: &IngestConfig) -> Result<DocumentPair> {
    let file_id = task_id(task).ok_or_else(|| malformed("task is missing a numeric id", task))?;

    let text = task
        .get("data")
        .and_then(|d| d.get(&config.text_field))
        .and_then(Value::as_str)
        .ok_or_else(|| AdjudicationError::Malformed(format!("task {} has no data.{}", file_id, config.text_field)))?
        .to_string();

    let annotations = task
        .get("annotations")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut reference = None;
    let mut prediction = None;

    for annotation in annotations {
        if annotation.get("was_cancelled").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        let Some(user_id) = completed_by(annotation) else {
            return Err(malformed("annotation has no completed_by", annotation));
        };
        let (slot, name) = match annotators.side_of(user_id) {
            Some(Side::Reference) => (&mut reference, &annotators.reference.name),
            Some(Side::Prediction) => (&mut prediction, &annotators.prediction.name),
            None => {
                debug!(file_id, user_id, "Skipping annotation by unmapped annotator");
                continue;
            }
        };
        if slot.is_some() {
            return Err(AdjudicationError::DuplicateAnnotation {
                file_id,
                key: format!("annotation by {}", name),
                count: 2,
            });
        }
        let result = annotation
            .get("result")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        *slot = Some(parse_annotation(file_id, result, config)?);
    }

    let missing = |name: &str| {
        AdjudicationError::Malformed(format!("task {} has no annotation by {}", file_id, name))
    };
    let reference = reference.ok_or_else(|| missing(&annotators.reference.name))?;
    let prediction = prediction.ok_or_else(|| missing(&annotators.prediction.name))?;

    Ok(DocumentPair {
        file_id,
        text,
        reference,
        prediction,
    })
}

fn completed_by(annotation: &Value) -> Option<u64> {
    match annotation.get("completed_by")? {
        Value::Number(n) => n.as_u64(),
        Value::Object(user) => user.get("id").and_then(Value::as_u64),
        _ => None,
    }
}

/// Turn one annotator's result list into entities and linked relations
pub fn parse_annotation(file_id: u64, result: &[Value], config: &IngestConfig) -> Result<AnnotatedFile> {
    let (relation_fragments, region_fragments): (Vec<&Value>, Vec<&Value>) = result
        .iter()
        .partition(|f| f.get("type").and_then(Value::as_str) == Some("relation"));

    // Group by region id, first appearance order
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&Value>> = HashMap::new();
    for fragment in region_fragments {
        let id = fragment
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("region fragment has no id", fragment))?;
        if !groups.contains_key(id) {
            order.push(id.to_string());
        }
        groups.entry(id.to_string()).or_default().push(fragment);
    }

    let mut entities = Vec::with_capacity(order.len());
    let mut by_id: HashMap<String, Entity> = HashMap::new();
    for id in order {
        let fragments = groups.remove(&id).unwrap_or_default();
        let entity = coordinate_entity(file_id, &id, &fragments, config)?;
        by_id.insert(id, entity.clone());
        entities.push(entity);
    }

    let relations = relation_fragments
        .into_iter()
        .map(|fragment| parse_relation(file_id, fragment, &by_id))
        .collect::<Result<Vec<_>>>()?;

    Ok(AnnotatedFile {
        file_id,
        entities,
        relations,
    })
}

/// Merge the per-attribute fragments of one region into a single entity
pub fn coordinate_entity(
    file_id: u64,
    id: &str,
    fragments: &[&Value],
    config: &IngestConfig,
) -> Result<Entity> {
    let mut spans: Vec<(u64, u64)> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    let mut dtrs: Vec<String> = Vec::new();
    let mut cuis: Vec<String> = Vec::new();
    let mut text = None;

    for fragment in fragments {
        let value = fragment
            .get("value")
            .ok_or_else(|| malformed("region fragment has no value", fragment))?;
        let start = value.get("start").and_then(Value::as_u64);
        let end = value.get("end").and_then(Value::as_u64);
        match (start, end) {
            (Some(start), Some(end)) => {
                if !spans.contains(&(start, end)) {
                    spans.push((start, end));
                }
            }
            _ => return Err(malformed("region fragment has no value.start/value.end", fragment)),
        }
        if text.is_none() {
            text = value.get("text").and_then(Value::as_str).map(str::to_string);
        }

        let kind = fragment.get("type").and_then(Value::as_str).unwrap_or_default();
        if kind == "labels" {
            for label in strings(value.get("labels")) {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
            continue;
        }

        let control = fragment.get("from_name").and_then(Value::as_str).unwrap_or(kind);
        if control == config.doc_time_rel {
            dtrs.extend(strings(value.get("choices")));
            dtrs.extend(strings(value.get("text")));
        } else if control == config.cui {
            cuis.extend(strings(value.get("text")));
            cuis.extend(strings(value.get("choices")));
        } else if !config.ignored.iter().any(|c| c == control) {
            return Err(AdjudicationError::UnsupportedAttribute {
                annotation_id: id.to_string(),
                attribute: control.to_string(),
            });
        }
    }

    let (start, end) = match spans.as_slice() {
        [single] => *single,
        [] => return Err(AdjudicationError::Malformed(format!("region {} has no fragments", id))),
        many => {
            return Err(AdjudicationError::AmbiguousAttribute {
                annotation_id: id.to_string(),
                attribute: "span".to_string(),
                values: many.iter().map(|(s, e)| format!("{}-{}", s, e)).collect(),
            })
        }
    };
    let span = Span::new(start as usize, end as usize)?;

    let label = single_value(id, "label", labels)?;
    let dtr = single_value(id, &config.doc_time_rel, dtrs)?.map(|v| DocTimeRel::parse(&v));

    let mut seen = BTreeSet::new();
    cuis.retain(|cui| seen.insert(cui.clone()));

    let mut entity = Entity::new(file_id, span, id)
        .with_cuis(cuis)
        .with_sources(fragments.iter().map(|f| (*f).clone()).collect());
    entity.text = text;
    entity.label = label;
    entity.dtr = dtr;
    Ok(entity)
}

/// Zero values is None, agreeing values collapse, disagreement is an error
fn single_value(id: &str, attribute: &str, values: Vec<String>) -> Result<Option<String>> {
    let mut distinct: Vec<String> = Vec::new();
    for value in values {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    match distinct.len() {
        0 => Ok(None),
        1 => Ok(distinct.pop()),
        _ => Err(AdjudicationError::AmbiguousAttribute {
            annotation_id: id.to_string(),
            attribute: attribute.to_string(),
            values: distinct,
        }),
    }
}

fn parse_relation(file_id: u64, fragment: &Value, entities: &HashMap<String, Entity>) -> Result<Relation> {
    let endpoint = |key: &str| -> Result<Entity> {
        let id = fragment
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(&format!("relation has no {}", key), fragment))?;
        entities.get(id).cloned().ok_or_else(|| {
            AdjudicationError::linkage(file_id, format!("relation {} {} does not name a region", key, id))
        })
    };
    let from = endpoint("from_id")?;
    let to = endpoint("to_id")?;

    let (arg1, arg2, directed) = match fragment.get("direction").and_then(Value::as_str) {
        Some("right") => (from, to, true),
        Some("left") => (to, from, true),
        _ => (from, to, false),
    };

    Ok(Relation::new(file_id, arg1, arg2, strings(fragment.get("labels")), directed)
        .with_sources(vec![fragment.clone()]))
}

/// String items of a JSON array, or a lone string
fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn malformed(what: &str, fragment: &Value) -> AdjudicationError {
    AdjudicationError::Malformed(format!("{}: {}", what, fragment))
}
