//! Adjudication Integration Tests
//!
//! Tests for provenance tagging, agreement filtering and failure handling
//! of adjudication records.

use adjudicator::core::{
    build_entity_correctness_matrix, build_relation_correctness_matrix, AdjudicationBuilder,
    AdjudicationOptions,
};
use adjudicator::domain::{AnnotatorIdentity, Annotators, Entity, Relation, Span};
use adjudicator::AdjudicationError;
use serde_json::{json, Value};

const TEXT: &str = "Aspirin relieved the headache quickly.";

fn annotators() -> Annotators {
    Annotators::new(
        AnnotatorIdentity::new("alice", vec![1]),
        AnnotatorIdentity::new("bob", vec![2]),
    )
}

fn entity(start: usize, end: usize, id: &str) -> Entity {
    let text: String = TEXT.chars().skip(start).take(end - start).collect();
    Entity::new(3, Span::new(start, end).unwrap(), id)
        .with_text(text.clone())
        .with_sources(vec![json!({
            "id": id,
            "type": "labels",
            "from_name": "label",
            "to_name": "text",
            "origin": "manual",
            "value": {"start": start, "end": end, "text": text, "labels": ["Entity"]},
        })])
}

fn relation(arg1: &Entity, arg2: &Entity, label: &str) -> Relation {
    Relation::new(3, arg1.clone(), arg2.clone(), [label], true).with_sources(vec![json!({
        "from_id": arg1.external_id,
        "to_id": arg2.external_id,
        "type": "relation",
        "direction": "right",
        "labels": [label],
    })])
}

fn synthetic_labels(results: &[Value]) -> Vec<(String, String)> {
    results
        .iter()
        .filter(|r| r["from_name"] == "annotator")
        .map(|r| {
            (
                r["id"].as_str().unwrap().to_string(),
                r["value"]["labels"][0].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[test]
fn test_full_agreement_with_and_without_filter() {
    let annotators = annotators();
    let drug = entity(0, 7, "e1");
    let problem = entity(21, 29, "e2");
    let link = relation(&drug, &problem, "treats");

    let predicted = vec![drug.clone(), problem.clone()];
    let reference = vec![drug.clone(), problem.clone()];
    let entities = build_entity_correctness_matrix(&predicted, &reference, false);
    let relations = build_relation_correctness_matrix(&[link.clone()], &[link], false);

    let filtered = AdjudicationOptions {
        filter_agreements: true,
        ..Default::default()
    };
    let record = AdjudicationBuilder::new(&annotators, &filtered)
        .build(3, TEXT, &entities, &relations)
        .unwrap();
    assert!(record.is_none());

    let unfiltered = AdjudicationOptions::default();
    let record = AdjudicationBuilder::new(&annotators, &unfiltered)
        .build(3, TEXT, &entities, &relations)
        .unwrap()
        .expect("unfiltered build always yields a record");

    assert_eq!(record.id, 3);
    assert_eq!(record.data.text, TEXT);
    let results = &record.predictions[0].result;

    for (_, label) in synthetic_labels(results) {
        assert_eq!(label, "Agreement");
    }
    let relation_tags: Vec<&Value> = results
        .iter()
        .filter(|r| r["type"] == "relation" && r["labels"][0] == "Agreement")
        .collect();
    assert_eq!(relation_tags.len(), 1);
}

#[test]
fn test_disagreements_are_tagged_by_annotator() {
    let annotators = annotators();
    let shared = entity(0, 7, "e1");
    let only_predicted = entity(21, 29, "e2");
    let only_reference = entity(30, 37, "e3");

    let entities = build_entity_correctness_matrix(
        &[shared.clone(), only_predicted.clone()],
        &[shared.clone(), only_reference.clone()],
        false,
    );
    let relations = build_relation_correctness_matrix(&[], &[], false);

    let options = AdjudicationOptions {
        filter_agreements: true,
        ..Default::default()
    };
    let record = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap()
        .unwrap();

    let results = &record.predictions[0].result;
    assert_eq!(
        synthetic_labels(results),
        vec![
            ("e2".to_string(), "bob".to_string()),
            ("e3".to_string(), "alice".to_string()),
        ]
    );

    // Synthetic record is followed by the original fragment, origin rewritten
    assert_eq!(results.len(), 4);
    assert_eq!(results[1]["from_name"], "label");
    assert_eq!(results[1]["origin"], "prediction");
    assert_eq!(results[1]["value"]["labels"][0], "Entity");
}

#[test]
fn test_synthetic_record_shape() {
    let annotators = annotators();
    let e = entity(8, 16, "e9");
    let entities = build_entity_correctness_matrix(&[e], &[], false);
    let relations = build_relation_correctness_matrix(&[], &[], false);

    let options = AdjudicationOptions::default();
    let record = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap()
        .unwrap();

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["data"]["text"], TEXT);
    assert_eq!(json["predictions"][0]["id"], 3);

    let synthetic = &json["predictions"][0]["result"][0];
    assert_eq!(
        synthetic,
        &json!({
            "id": "e9",
            "value": {"start": 8, "end": 16, "text": "relieved", "labels": ["bob"]},
            "from_name": "annotator",
            "to_name": "text",
            "type": "labels",
            "origin": "prediction",
        })
    );
}

#[test]
fn test_relation_records_follow_entities() {
    let annotators = annotators();
    let drug = entity(0, 7, "e1");
    let problem = entity(21, 29, "e2");
    let link = relation(&drug, &problem, "treats");

    let entities = build_entity_correctness_matrix(&[drug.clone(), problem.clone()], &[drug, problem], false);
    let relations = build_relation_correctness_matrix(&[link], &[], false);

    let options = AdjudicationOptions::default();
    let record = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap()
        .unwrap();

    let results = &record.predictions[0].result;
    let n = results.len();
    assert_eq!(
        results[n - 2],
        json!({
            "from_id": "e1",
            "to_id": "e2",
            "type": "relation",
            "direction": "right",
            "labels": ["bob"],
        })
    );
    // Original relation fragment keeps its original labels
    assert_eq!(results[n - 1]["labels"][0], "treats");
}

#[test]
fn test_relation_with_unknown_argument_aborts_document() {
    let annotators = annotators();
    let drug = entity(0, 7, "e1");
    let problem = entity(21, 29, "e2");
    let link = relation(&drug, &problem, "treats");

    // Only one argument was classified
    let entities = build_entity_correctness_matrix(&[drug], &[], false);
    let relations = build_relation_correctness_matrix(&[link], &[], false);

    let options = AdjudicationOptions::default();
    let err = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap_err();
    assert!(matches!(err, AdjudicationError::Linkage { file_id: 3, .. }));
}

#[test]
fn test_duplicate_relation_endpoints_rejected() {
    let annotators = annotators();
    let drug = entity(0, 7, "e1");
    let problem = entity(21, 29, "e2");

    let entities = build_entity_correctness_matrix(&[drug.clone(), problem.clone()], &[], false);
    let relations = build_relation_correctness_matrix(
        &[relation(&drug, &problem, "treats"), relation(&drug, &problem, "causes")],
        &[],
        false,
    );

    let options = AdjudicationOptions::default();
    let err = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap_err();
    assert!(matches!(err, AdjudicationError::DuplicateAnnotation { count: 2, .. }));
}

#[test]
fn test_reference_relation_follows_overlapping_agreement() {
    let annotators = annotators();
    let predicted = vec![entity(0, 7, "p1"), entity(21, 29, "p2")];
    let reference = vec![entity(1, 6, "r1"), entity(22, 28, "r2")];
    let reference_link = relation(&reference[0], &reference[1], "treats");

    let entities = build_entity_correctness_matrix(&predicted, &reference, true);
    let relations = build_relation_correctness_matrix(&[], &[reference_link], true);
    assert_eq!(entities.true_positives.len(), 2);
    assert!(entities.false_negatives.is_empty());

    let options = AdjudicationOptions {
        filter_agreements: true,
        ..Default::default()
    };
    let record = AdjudicationBuilder::new(&annotators, &options)
        .with_overlap(true)
        .build(3, TEXT, &entities, &relations)
        .unwrap()
        .unwrap();

    let results = &record.predictions[0].result;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["from_id"], "p1");
    assert_eq!(results[0]["to_id"], "p2");
    assert_eq!(results[0]["labels"][0], "alice");
    assert_eq!(results[1]["from_id"], "p1");
    assert_eq!(results[1]["labels"][0], "treats");

    // Under exact matching the reference regions have no counterpart
    let err = AdjudicationBuilder::new(&annotators, &options)
        .build(3, TEXT, &entities, &relations)
        .unwrap_err();
    assert!(matches!(err, AdjudicationError::Linkage { file_id: 3, .. }));
}
