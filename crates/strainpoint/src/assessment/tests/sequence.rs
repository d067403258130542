use super::common::*;
use crate::assessment::catalog::{Catalog, CatalogError, CriterionPrompt, DomainQuestionSet};
use crate::assessment::domain::{ImpactTier, QuestionId, QuestionKind, Stage};
use crate::assessment::sequence::{SequenceBuilder, GENERIC_DOMAIN};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ids(questions: &[crate::assessment::domain::Question<Point>]) -> Vec<String> {
    questions.iter().map(|q| q.id.0.clone()).collect()
}

#[test]
fn stage1_has_one_question_per_criterion() {
    let catalog = catalog();
    let builder = SequenceBuilder::new(&catalog);
    let mut questions = builder.stage1(&mut StdRng::seed_from_u64(11));

    assert_eq!(questions.len(), 4);
    assert!(questions.iter().all(|q| q.stage == Stage::Stage1));
    questions.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(
        ids(&questions),
        vec!["stage1_anchor", "stage1_bridge", "stage1_canopy", "stage1_drift"]
    );
    let anchor = &questions[0];
    assert_eq!(anchor.prompt, "anchor prompt 1");
    assert_eq!(anchor.kind, QuestionKind::Scalar);
}

#[test]
fn stage1_order_is_fixed_by_the_seed() {
    let catalog = catalog();
    let builder = SequenceBuilder::new(&catalog);

    let first = builder.stage1(&mut StdRng::seed_from_u64(99));
    let second = builder.stage1(&mut StdRng::seed_from_u64(99));
    assert_eq!(first, second);
}

#[test]
fn stage1_prefers_authored_question_ids() {
    let mut document = document();
    document.criteria[0].questions[0].id = Some("custom_anchor".to_string());
    let catalog = Catalog::from_document(document).expect("valid");
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage1(&mut StdRng::seed_from_u64(1));
    assert!(questions
        .iter()
        .any(|q| q.id == QuestionId::from("custom_anchor")));
}

#[test]
fn stage2_synthesizes_from_extra_catalog_prompts() {
    let catalog = catalog();
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage2(&[link(Point::Drift, 1)]);

    assert_eq!(ids(&questions), vec!["domain_drift_1", "domain_drift_2"]);
    let weights: Vec<f64> = questions.iter().map(|q| q.weight).collect();
    assert!((weights[0] - 1.0).abs() < 1e-9);
    assert!((weights[1] - 1.1).abs() < 1e-9);
    assert_eq!(questions[0].prompt, "drift prompt 2");
    assert!(questions
        .iter()
        .all(|q| q.domain.as_deref() == Some(GENERIC_DOMAIN) && q.stage == Stage::Stage2));
}

#[test]
fn stage2_uses_curated_domain_sets_when_present() {
    let catalog = curated_catalog();
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage2(&[link(Point::Bridge, 1), link(Point::Anchor, 2)]);

    assert_eq!(
        ids(&questions),
        vec!["bridge_deep_1", "bridge_deep_2", "domain_anchor_1", "domain_anchor_2"]
    );
    assert_eq!(questions[0].domain.as_deref(), Some("connection"));
    assert!((questions[1].weight - 3.0).abs() < 1e-9);
}

#[test]
fn stage2_only_covers_flagged_criteria() {
    let catalog = curated_catalog();
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage2(&[link(Point::Anchor, 1)]);
    assert!(questions.iter().all(|q| q.criterion == Point::Anchor));
}

#[test]
fn stage2_is_empty_for_single_prompt_criteria_without_curation() {
    let catalog = catalog();
    let builder = SequenceBuilder::new(&catalog);

    assert!(builder.stage2(&[link(Point::Canopy, 1)]).is_empty());
}

#[test]
fn links_missing_from_the_catalog_are_skipped() {
    let mut document = document();
    document.criteria.retain(|c| c.key != Point::Drift);
    let catalog = Catalog::from_document(document).expect("valid");
    let builder = SequenceBuilder::new(&catalog);

    assert!(builder.stage2(&[link(Point::Drift, 1)]).is_empty());
    assert!(builder.stage3(&[link(Point::Drift, 1)]).is_empty());
}

#[test]
fn stage3_synthesizes_two_named_scenarios() {
    let catalog = catalog();
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage3(&[link(Point::Anchor, 1)]);

    assert_eq!(ids(&questions), vec!["scenario_anchor_1", "scenario_anchor_2"]);
    assert!(questions.iter().all(|q| {
        q.kind == QuestionKind::Scenario
            && q.stage == Stage::Stage3
            && q.prompt.contains("anchor point")
            && q.example.is_some()
    }));
    assert!(questions[0].prompt.contains("tension"));
    assert!(questions[1].prompt.contains("restore alignment"));
}

#[test]
fn stage3_uses_curated_scenarios_and_domain() {
    let catalog = curated_catalog();
    let builder = SequenceBuilder::new(&catalog);

    let questions = builder.stage3(&[link(Point::Bridge, 1)]);

    assert_eq!(ids(&questions), vec!["bridge_scene_1"]);
    assert_eq!(questions[0].domain.as_deref(), Some("connection"));
    assert_eq!(questions[0].example.as_deref(), Some("an example"));
}

#[test]
fn empty_catalog_builds_empty_stage1() {
    let catalog = Catalog::<Point>::from_document(Default::default()).expect("valid");
    let builder = SequenceBuilder::new(&catalog);
    assert!(builder.stage1(&mut StdRng::seed_from_u64(3)).is_empty());
}

#[test]
fn catalog_rejects_duplicate_and_empty_criteria() {
    let mut duplicated = document();
    duplicated
        .criteria
        .push(criterion(Point::Anchor, ImpactTier::High, 1));
    assert!(matches!(
        Catalog::from_document(duplicated),
        Err(crate::assessment::CatalogError::DuplicateCriterion("anchor"))
    ));

    let mut empty = document();
    empty.criteria[1].questions.clear();
    assert!(matches!(
        Catalog::from_document(empty),
        Err(crate::assessment::CatalogError::NoQuestions("bridge"))
    ));

    let mut negative = document();
    negative.criteria[2].weight = -1.0;
    assert!(matches!(
        Catalog::from_document(negative),
        Err(crate::assessment::CatalogError::InvalidWeight { .. })
    ));
}

#[test]
fn catalog_parses_from_json() {
    let json = r#"{
        "criteria": [
            {
                "key": "anchor",
                "name": "Anchor",
                "impact_tier": "very-high",
                "questions": [{ "text": "first" }, { "text": "second" }]
            }
        ],
        "domain_questions": {
            "anchor": { "domain": "roots", "questions": [{ "text": "deep", "weight": 1.5 }] }
        }
    }"#;

    let catalog = Catalog::<Point>::from_json_str(json).expect("catalog parses");
    assert_eq!(catalog.len(), 1);
    let anchor = catalog.criterion(Point::Anchor).expect("anchor present");
    assert!((anchor.weight - 1.0).abs() < 1e-9);
    assert_eq!(
        catalog.domain_set(Point::Anchor).map(|set| set.domain.as_str()),
        Some("roots")
    );
    assert_eq!(
        catalog.missing_keys(),
        vec![Point::Bridge, Point::Canopy, Point::Drift]
    );
}

#[test]
fn catalog_rejects_question_ids_shared_across_stages() {
    let mut document = document();
    document.domain_questions.insert(
        Point::Drift,
        DomainQuestionSet {
            domain: "roots".to_string(),
            questions: vec![CriterionPrompt {
                id: Some("stage1_anchor".to_string()),
                text: "drift deep".to_string(),
                weight: None,
            }],
        },
    );

    match Catalog::from_document(document) {
        Err(CatalogError::DuplicateQuestionId { id, first, second }) => {
            assert_eq!(id, "stage1_anchor");
            assert_eq!((first, second), ("anchor", "drift"));
        }
        other => panic!("expected duplicate question id, got {other:?}"),
    }
}

#[test]
fn catalog_rejects_authored_ids_that_shadow_derived_ones() {
    let mut scenario_clash = curated_document();
    scenario_clash
        .scenario_questions
        .get_mut(&Point::Bridge)
        .expect("bridge scenarios")[0]
        .id = Some("domain_anchor_1".to_string());
    assert!(matches!(
        Catalog::from_document(scenario_clash),
        Err(CatalogError::DuplicateQuestionId { .. })
    ));

    let mut stage1_clash = document();
    stage1_clash.criteria[3].questions[0].id = Some("scenario_canopy_2".to_string());
    assert!(matches!(
        Catalog::from_document(stage1_clash),
        Err(CatalogError::DuplicateQuestionId { .. })
    ));
}

#[test]
fn empty_curated_domain_set_falls_back_to_synthesis() {
    let mut document = document();
    document.domain_questions.insert(
        Point::Drift,
        DomainQuestionSet {
            domain: "roots".to_string(),
            questions: Vec::new(),
        },
    );
    let catalog = Catalog::from_document(document).expect("valid");
    let builder = SequenceBuilder::new(&catalog);

    assert_eq!(
        ids(&builder.stage2(&[link(Point::Drift, 1)])),
        vec!["domain_drift_1", "domain_drift_2"]
    );
}
