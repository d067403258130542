use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::assessment::catalog::{
    AnalysisModule, Catalog, CatalogDocument, Criterion, CriterionPrompt, DomainInfo,
    DomainQuestionSet, ModuleConclusions, ScenarioPrompt,
};
use crate::assessment::controller::{AssessmentPolicy, StageController};
use crate::assessment::domain::{
    CriterionKey, CriterionResult, ImpactTier, Priority, Severity, Stage, WeakestLink,
};
use crate::assessment::service::AssessmentService;
use crate::assessment::session::AssessmentSession;
use crate::assessment::store::{SessionId, SessionStore, StoreError};
use crate::assessment::strategy::{StrategySet, StrategyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) enum Point {
    Anchor,
    Bridge,
    Canopy,
    Drift,
}

impl CriterionKey for Point {
    const ALL: &'static [Self] = &[Self::Anchor, Self::Bridge, Self::Canopy, Self::Drift];

    fn slug(self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Bridge => "bridge",
            Self::Canopy => "canopy",
            Self::Drift => "drift",
        }
    }
}

pub(super) fn prompt(text: &str) -> CriterionPrompt {
    CriterionPrompt {
        id: None,
        text: text.to_string(),
        weight: None,
    }
}

pub(super) fn criterion(key: Point, tier: ImpactTier, prompts: usize) -> Criterion<Point> {
    Criterion {
        key,
        name: format!("{} Point", key.slug()),
        description: None,
        impact_tier: tier,
        weight: 1.0,
        questions: (1..=prompts)
            .map(|n| prompt(&format!("{} prompt {n}", key.slug())))
            .collect(),
    }
}

/// Four criteria with tiers very-high, high, moderate, moderate and unit base weights.
/// Anchor, Bridge and Drift carry three prompts; Canopy carries one.
pub(super) fn document() -> CatalogDocument<Point> {
    CatalogDocument {
        criteria: vec![
            criterion(Point::Anchor, ImpactTier::VeryHigh, 3),
            criterion(Point::Bridge, ImpactTier::High, 3),
            criterion(Point::Canopy, ImpactTier::Moderate, 1),
            criterion(Point::Drift, ImpactTier::Moderate, 3),
        ],
        ..CatalogDocument::default()
    }
}

/// Same criteria plus curated content: Bridge has a domain set and scenarios.
pub(super) fn curated_document() -> CatalogDocument<Point> {
    let mut document = document();
    document.domain_questions.insert(
        Point::Bridge,
        DomainQuestionSet {
            domain: "connection".to_string(),
            questions: vec![
                CriterionPrompt {
                    id: Some("bridge_deep_1".to_string()),
                    text: "bridge deep 1".to_string(),
                    weight: Some(1.0),
                },
                CriterionPrompt {
                    id: Some("bridge_deep_2".to_string()),
                    text: "bridge deep 2".to_string(),
                    weight: Some(3.0),
                },
            ],
        },
    );
    document.scenario_questions.insert(
        Point::Bridge,
        vec![ScenarioPrompt {
            id: Some("bridge_scene_1".to_string()),
            text: "bridge scene".to_string(),
            example: Some("an example".to_string()),
            weight: None,
        }],
    );
    document.domains.insert(
        "connection".to_string(),
        DomainInfo {
            name: "Connection".to_string(),
            description: None,
        },
    );
    document.modules.push(AnalysisModule {
        id: "foundations".to_string(),
        title: "Foundations".to_string(),
        summary: "Anchor and Bridge together".to_string(),
        criteria: vec![Point::Anchor, Point::Bridge],
        conclusions: ModuleConclusions {
            strong: "steady".to_string(),
            watch: "keep an eye".to_string(),
            urgent: "repair first".to_string(),
        },
    });
    document
}

pub(super) fn catalog() -> Catalog<Point> {
    Catalog::from_document(document()).expect("fixture catalog is valid")
}

pub(super) fn curated_catalog() -> Catalog<Point> {
    Catalog::from_document(curated_document()).expect("curated catalog is valid")
}

pub(super) fn strategies() -> StrategyTable<Point> {
    StrategyTable::new(StrategySet {
        immediate: vec!["talk it through".to_string()],
        structural: vec!["schedule a check-in".to_string()],
        archetypal: Vec::new(),
    })
    .with(
        Point::Anchor,
        StrategySet {
            immediate: vec!["name the shared value".to_string()],
            structural: vec!["write it down together".to_string()],
            archetypal: Vec::new(),
        },
    )
}

/// Answer every stage-1 question from `scores` (8 when absent) and advance through the stage.
pub(super) fn complete_stage1(
    controller: &StageController<'_, Point>,
    session: &mut AssessmentSession<Point>,
    scores: &BTreeMap<Point, i64>,
) {
    while session.stage() == Stage::Stage1 {
        let key = session
            .current_question()
            .expect("stage 1 has a current question")
            .criterion;
        controller
            .record_answer(session, scores.get(&key).copied().unwrap_or(8))
            .expect("answer recorded");
        controller.advance(session).expect("advance succeeds");
    }
}

/// Answer everything left with `value` until the session is done.
pub(super) fn finish_with(
    controller: &StageController<'_, Point>,
    session: &mut AssessmentSession<Point>,
    value: i64,
) {
    while !session.is_done() {
        controller
            .record_answer(session, value)
            .expect("answer recorded");
        controller.advance(session).expect("advance succeeds");
    }
}

pub(super) fn link(key: Point, rank: usize) -> WeakestLink<Point> {
    WeakestLink {
        rank,
        result: CriterionResult {
            key,
            name: format!("{} Point", key.slug()),
            impact_tier: ImpactTier::Moderate,
            raw_score: 2.0,
            tier_weight: 0.7,
            base_weight: 1.0,
            weighted_score: 1.4,
            priority: Priority::Critical,
            severity: Severity::Critical,
            answered: true,
        },
    }
}

pub(super) fn scores(pairs: &[(Point, i64)]) -> BTreeMap<Point, i64> {
    pairs.iter().copied().collect()
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    payloads: Arc<Mutex<HashMap<SessionId, String>>>,
}

impl MemoryStore {
    pub(super) fn raw(&self, id: &SessionId) -> Option<String> {
        self.payloads.lock().expect("store mutex poisoned").get(id).cloned()
    }

    pub(super) fn overwrite(&self, id: &SessionId, payload: &str) {
        self.payloads
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), payload.to_string());
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, id: &SessionId, payload: String) -> Result<(), StoreError> {
        self.payloads
            .lock()
            .expect("store mutex poisoned")
            .insert(id.clone(), payload);
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(self.raw(id))
    }

    fn discard(&self, id: &SessionId) -> Result<(), StoreError> {
        self.payloads
            .lock()
            .expect("store mutex poisoned")
            .remove(id);
        Ok(())
    }
}

pub(super) fn service(store: Arc<MemoryStore>) -> AssessmentService<Point, MemoryStore> {
    AssessmentService::new(
        Arc::new(curated_catalog()),
        Arc::new(strategies()),
        store,
        AssessmentPolicy::default(),
    )
    .with_fixed_seed(Some(7))
}
