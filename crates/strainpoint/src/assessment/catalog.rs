use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use super::domain::{CriterionKey, ImpactTier, QuestionId, TierWeights};

fn default_weight() -> f64 {
    1.0
}

/// Prompt text as authored in a catalog file. Ids and weights are optional and
/// derived by the sequence builder when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct Criterion<K> {
    pub key: K,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub impact_tier: ImpactTier,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub questions: Vec<CriterionPrompt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainQuestionSet {
    pub domain: String,
    pub questions: Vec<CriterionPrompt>,
}

impl DomainQuestionSet {
    /// An empty curated set is treated as absent.
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPrompt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConclusions {
    pub strong: String,
    pub watch: String,
    pub urgent: String,
}

/// Reporting lens that groups several criteria under one headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct AnalysisModule<K> {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub criteria: Vec<K>,
    pub conclusions: ModuleConclusions,
}

/// Background themes attached to every report, plus notes keyed by criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct InsightTable<K> {
    #[serde(default)]
    pub themes: BTreeMap<String, String>,
    #[serde(default)]
    pub points: BTreeMap<K, String>,
}

impl<K> Default for InsightTable<K> {
    fn default() -> Self {
        Self {
            themes: BTreeMap::new(),
            points: BTreeMap::new(),
        }
    }
}

/// On-disk catalog shape before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "K: CriterionKey")]
pub struct CatalogDocument<K> {
    pub criteria: Vec<Criterion<K>>,
    #[serde(default)]
    pub domain_questions: BTreeMap<K, DomainQuestionSet>,
    #[serde(default)]
    pub scenario_questions: BTreeMap<K, Vec<ScenarioPrompt>>,
    #[serde(default)]
    pub domains: BTreeMap<String, DomainInfo>,
    #[serde(default)]
    pub tier_weights: TierWeights,
    #[serde(default)]
    pub modules: Vec<AnalysisModule<K>>,
    #[serde(default)]
    pub insights: InsightTable<K>,
}

impl<K> Default for CatalogDocument<K> {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
            domain_questions: BTreeMap::new(),
            scenario_questions: BTreeMap::new(),
            domains: BTreeMap::new(),
            tier_weights: TierWeights::default(),
            modules: Vec::new(),
            insights: InsightTable::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("criterion '{0}' is declared more than once")]
    DuplicateCriterion(&'static str),
    #[error("criterion '{0}' has no questions")]
    NoQuestions(&'static str),
    #[error("{context} has invalid weight {value}")]
    InvalidWeight { context: String, value: f64 },
    #[error("question id '{id}' is used by both '{first}' and '{second}'")]
    DuplicateQuestionId {
        id: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Scenarios synthesised for a criterion without curated ones.
pub(crate) const SYNTHESIZED_SCENARIOS: usize = 2;

pub(crate) fn domain_question_id(
    slug: &str,
    authored: Option<&str>,
    position: usize,
) -> QuestionId {
    authored
        .map(|id| QuestionId(id.to_string()))
        .unwrap_or_else(|| QuestionId(format!("stage2_{slug}_{position}")))
}

pub(crate) fn synthesized_domain_id(slug: &str, position: usize) -> QuestionId {
    QuestionId(format!("domain_{slug}_{position}"))
}

pub(crate) fn scenario_question_id(
    slug: &str,
    authored: Option<&str>,
    position: usize,
) -> QuestionId {
    authored
        .map(|id| QuestionId(id.to_string()))
        .unwrap_or_else(|| QuestionId(format!("scenario_{slug}_{position}")))
}

fn check_weight(context: impl FnOnce() -> String, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidWeight {
            context: context(),
            value,
        })
    }
}

/// Validated, immutable criterion catalog.
#[derive(Debug, Clone)]
pub struct Catalog<K> {
    criteria: Vec<Criterion<K>>,
    index: BTreeMap<K, usize>,
    domain_questions: BTreeMap<K, DomainQuestionSet>,
    scenario_questions: BTreeMap<K, Vec<ScenarioPrompt>>,
    domains: BTreeMap<String, DomainInfo>,
    tier_weights: TierWeights,
    modules: Vec<AnalysisModule<K>>,
    insights: InsightTable<K>,
}

impl<K: CriterionKey> Catalog<K> {
    pub fn from_document(document: CatalogDocument<K>) -> Result<Self, CatalogError> {
        let CatalogDocument {
            criteria,
            domain_questions,
            scenario_questions,
            domains,
            tier_weights,
            modules,
            insights,
        } = document;

        let mut index = BTreeMap::new();
        for (position, criterion) in criteria.iter().enumerate() {
            let slug = criterion.key.slug();
            if index.insert(criterion.key, position).is_some() {
                return Err(CatalogError::DuplicateCriterion(slug));
            }
            if criterion.questions.is_empty() {
                return Err(CatalogError::NoQuestions(slug));
            }
            check_weight(|| format!("criterion '{slug}'"), criterion.weight)?;
            for prompt in &criterion.questions {
                if let Some(weight) = prompt.weight {
                    check_weight(|| format!("question of '{slug}'"), weight)?;
                }
            }
        }

        for (key, set) in &domain_questions {
            for prompt in &set.questions {
                if let Some(weight) = prompt.weight {
                    check_weight(|| format!("domain question of '{}'", key.slug()), weight)?;
                }
            }
        }
        for (key, prompts) in &scenario_questions {
            for prompt in prompts {
                if let Some(weight) = prompt.weight {
                    check_weight(|| format!("scenario of '{}'", key.slug()), weight)?;
                }
            }
        }
        for tier in ImpactTier::ordered() {
            check_weight(|| format!("tier '{}'", tier.label()), tier_weights.weight(tier))?;
        }

        let catalog = Self {
            criteria,
            index,
            domain_questions,
            scenario_questions,
            domains,
            tier_weights,
            modules,
            insights,
        };
        catalog.check_question_ids()?;
        Ok(catalog)
    }

    /// Every id a stage can hand out must be distinct, since answers are keyed by id.
    fn check_question_ids(&self) -> Result<(), CatalogError> {
        let mut seen: BTreeMap<QuestionId, &'static str> = BTreeMap::new();
        for criterion in &self.criteria {
            let slug = criterion.key.slug();
            let ids = std::iter::once(self.stage1_question_id(criterion))
                .chain(self.stage2_question_ids(criterion))
                .chain(self.stage3_question_ids(criterion));
            for id in ids {
                if let Some(first) = seen.insert(id.clone(), slug) {
                    return Err(CatalogError::DuplicateQuestionId {
                        id: id.0,
                        first,
                        second: slug,
                    });
                }
            }
        }
        Ok(())
    }

    fn stage2_question_ids(&self, criterion: &Criterion<K>) -> Vec<QuestionId> {
        let slug = criterion.key.slug();
        match self.domain_set(criterion.key) {
            Some(set) if set.has_questions() => set
                .questions
                .iter()
                .enumerate()
                .map(|(i, prompt)| domain_question_id(slug, prompt.id.as_deref(), i + 1))
                .collect(),
            _ => (1..criterion.questions.len())
                .map(|n| synthesized_domain_id(slug, n))
                .collect(),
        }
    }

    fn stage3_question_ids(&self, criterion: &Criterion<K>) -> Vec<QuestionId> {
        let slug = criterion.key.slug();
        match self.scenarios(criterion.key) {
            Some(prompts) => prompts
                .iter()
                .enumerate()
                .map(|(i, prompt)| scenario_question_id(slug, prompt.id.as_deref(), i + 1))
                .collect(),
            None => (1..=SYNTHESIZED_SCENARIOS)
                .map(|n| scenario_question_id(slug, None, n))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument<K> = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_reader<Rd: Read>(reader: Rd) -> Result<Self, CatalogError> {
        let document: CatalogDocument<K> = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    /// Criteria in declaration order.
    pub fn criteria(&self) -> &[Criterion<K>] {
        &self.criteria
    }

    pub fn criterion(&self, key: K) -> Option<&Criterion<K>> {
        self.index.get(&key).map(|position| &self.criteria[*position])
    }

    pub fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn domain_set(&self, key: K) -> Option<&DomainQuestionSet> {
        self.domain_questions.get(&key)
    }

    pub fn scenarios(&self, key: K) -> Option<&[ScenarioPrompt]> {
        self.scenario_questions
            .get(&key)
            .map(Vec::as_slice)
            .filter(|prompts| !prompts.is_empty())
    }

    /// Display name of a domain, falling back to the domain id.
    pub fn domain_name<'a>(&'a self, domain: &'a str) -> &'a str {
        self.domains
            .get(domain)
            .map(|info| info.name.as_str())
            .unwrap_or(domain)
    }

    pub fn tier_weights(&self) -> &TierWeights {
        &self.tier_weights
    }

    pub fn modules(&self) -> &[AnalysisModule<K>] {
        &self.modules
    }

    pub fn insights(&self) -> &InsightTable<K> {
        &self.insights
    }

    /// Whether stage 2 can build any question for the criterion, curated or synthesised.
    pub fn has_stage2_questions(&self, criterion: &Criterion<K>) -> bool {
        !self.stage2_question_ids(criterion).is_empty()
    }

    /// Id of the stage-1 question for a criterion.
    pub fn stage1_question_id(&self, criterion: &Criterion<K>) -> QuestionId {
        criterion
            .questions
            .first()
            .and_then(|prompt| prompt.id.clone())
            .map(QuestionId)
            .unwrap_or_else(|| QuestionId(format!("stage1_{}", criterion.key.slug())))
    }

    /// Keys of `K::ALL` that the catalog does not declare.
    pub fn missing_keys(&self) -> Vec<K> {
        K::ALL
            .iter()
            .copied()
            .filter(|key| !self.contains(*key))
            .collect()
    }
}
