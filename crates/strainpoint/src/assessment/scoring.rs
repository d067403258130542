use serde::Serialize;
use std::collections::BTreeMap;

use super::catalog::Catalog;
use super::domain::{
    Answers, CriterionKey, CriterionResult, Question, QuestionId, ScoringThresholds, Stage,
    WeakestLink,
};

/// Minimum number of weak domains that counts as spillover.
const SPILLOVER_DOMAIN_COUNT: usize = 2;

/// Weighted stage-2 average for one (domain, criterion) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainScore<K> {
    pub domain: String,
    pub domain_name: String,
    pub criterion: K,
    pub score: f64,
    pub answered: usize,
    pub weak: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainAverage {
    pub domain: String,
    pub domain_name: String,
    pub average: f64,
    pub answered: usize,
}

/// Cross-domain check: strain in one area showing up across several domains.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Spillover {
    pub detected: bool,
    pub weak_domains: Vec<String>,
    pub domains: Vec<DomainAverage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResponse {
    pub question_id: QuestionId,
    pub prompt: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResponseGroup<K> {
    pub criterion: K,
    pub name: String,
    pub responses: Vec<ScenarioResponse>,
}

/// Turns recorded answers into per-criterion and per-domain scores.
pub struct ScoreAggregator<'a, K> {
    catalog: &'a Catalog<K>,
    thresholds: ScoringThresholds,
}

impl<'a, K: CriterionKey> ScoreAggregator<'a, K> {
    pub fn new(catalog: &'a Catalog<K>, thresholds: ScoringThresholds) -> Self {
        Self {
            catalog,
            thresholds,
        }
    }

    /// One result per catalog criterion, in declaration order.
    ///
    /// An unanswered stage-1 question counts as a raw score of 0, which pulls the
    /// criterion toward the weakest links. Stage 2 excludes unanswered questions.
    pub fn stage1(&self, answers: &Answers) -> Vec<CriterionResult<K>> {
        let tier_weights = self.catalog.tier_weights();
        self.catalog
            .criteria()
            .iter()
            .map(|criterion| {
                let id = self.catalog.stage1_question_id(criterion);
                let score = answers.get(&id);
                let raw_score = score.map(|score| score.as_f64()).unwrap_or(0.0);
                let tier_weight = tier_weights.weight(criterion.impact_tier);
                CriterionResult {
                    key: criterion.key,
                    name: criterion.name.clone(),
                    impact_tier: criterion.impact_tier,
                    raw_score,
                    tier_weight,
                    base_weight: criterion.weight,
                    weighted_score: raw_score * tier_weight * criterion.weight,
                    priority: self.thresholds.priority(raw_score),
                    severity: self.thresholds.severity(raw_score),
                    answered: score.is_some(),
                }
            })
            .collect()
    }

    /// Weighted averages over answered stage-2 questions, ordered by domain then criterion.
    /// Pairs without a single answer are omitted.
    pub fn stage2(&self, answers: &Answers, questions: &[Question<K>]) -> Vec<DomainScore<K>> {
        let mut totals: BTreeMap<(String, K), (f64, f64, f64, usize)> = BTreeMap::new();
        for (question, score) in answered(answers, questions, Stage::Stage2) {
            let domain = question.domain.clone().unwrap_or_default();
            let entry = totals
                .entry((domain, question.criterion))
                .or_insert((0.0, 0.0, 0.0, 0));
            entry.0 += score * question.weight;
            entry.1 += question.weight;
            entry.2 += score;
            entry.3 += 1;
        }

        totals
            .into_iter()
            .map(|((domain, criterion), (weighted, weight, plain, answered))| {
                let score = if weight > 0.0 {
                    weighted / weight
                } else {
                    plain / answered as f64
                };
                DomainScore {
                    domain_name: self.catalog.domain_name(&domain).to_string(),
                    domain,
                    criterion,
                    score,
                    answered,
                    weak: score < self.thresholds.moderate,
                }
            })
            .collect()
    }

    /// Unweighted mean per domain over every answered stage-2 question.
    pub fn spillover(&self, answers: &Answers, questions: &[Question<K>]) -> Spillover {
        let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for (question, score) in answered(answers, questions, Stage::Stage2) {
            let entry = totals
                .entry(question.domain.clone().unwrap_or_default())
                .or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }

        let domains: Vec<DomainAverage> = totals
            .into_iter()
            .map(|(domain, (sum, answered))| DomainAverage {
                domain_name: self.catalog.domain_name(&domain).to_string(),
                average: sum / answered as f64,
                domain,
                answered,
            })
            .collect();
        let weak_domains: Vec<String> = domains
            .iter()
            .filter(|entry| entry.average < self.thresholds.moderate)
            .map(|entry| entry.domain.clone())
            .collect();

        Spillover {
            detected: weak_domains.len() >= SPILLOVER_DOMAIN_COUNT,
            weak_domains,
            domains,
        }
    }

    /// Answered scenario prompts grouped per link, following link order.
    pub fn scenario_responses(
        &self,
        answers: &Answers,
        questions: &[Question<K>],
        links: &[WeakestLink<K>],
    ) -> Vec<ScenarioResponseGroup<K>> {
        links
            .iter()
            .filter_map(|link| {
                let responses: Vec<_> = questions
                    .iter()
                    .filter(|question| {
                        question.stage == Stage::Stage3 && question.criterion == link.key()
                    })
                    .filter_map(|question| {
                        answers.get(&question.id).map(|score| ScenarioResponse {
                            question_id: question.id.clone(),
                            prompt: question.prompt.clone(),
                            score: score.value(),
                        })
                    })
                    .collect();
                if responses.is_empty() {
                    None
                } else {
                    Some(ScenarioResponseGroup {
                        criterion: link.key(),
                        name: link.result.name.clone(),
                        responses,
                    })
                }
            })
            .collect()
    }
}

fn answered<'q, K>(
    answers: &'q Answers,
    questions: &'q [Question<K>],
    stage: Stage,
) -> impl Iterator<Item = (&'q Question<K>, f64)> + 'q {
    questions
        .iter()
        .filter(move |question| question.stage == stage)
        .filter_map(move |question| {
            answers
                .get(&question.id)
                .map(|score| (question, score.as_f64()))
        })
}
