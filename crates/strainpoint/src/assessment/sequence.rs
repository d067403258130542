use rand::seq::SliceRandom;
use rand::Rng;

use super::catalog::{
    domain_question_id, scenario_question_id, synthesized_domain_id, Catalog, Criterion,
};
use super::domain::{CriterionKey, Question, QuestionKind, Stage, WeakestLink};

/// Domain tag for questions synthesised without curated content.
pub const GENERIC_DOMAIN: &str = "generic";

/// Builds the question list for each stage from the catalog and prior results.
pub struct SequenceBuilder<'a, K> {
    catalog: &'a Catalog<K>,
}

impl<'a, K: CriterionKey> SequenceBuilder<'a, K> {
    pub fn new(catalog: &'a Catalog<K>) -> Self {
        Self { catalog }
    }

    /// One question per criterion, shuffled with the supplied source.
    pub fn stage1<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question<K>> {
        let mut questions: Vec<_> = self
            .catalog
            .criteria()
            .iter()
            .filter_map(|criterion| {
                let prompt = criterion.questions.first()?;
                Some(Question {
                    id: self.catalog.stage1_question_id(criterion),
                    prompt: prompt.text.clone(),
                    stage: Stage::Stage1,
                    domain: None,
                    criterion: criterion.key,
                    weight: prompt.weight.unwrap_or(1.0),
                    kind: QuestionKind::Scalar,
                    example: None,
                })
            })
            .collect();
        questions.shuffle(rng);
        questions
    }

    /// Deep-dive questions for the weakest links, in rank order.
    pub fn stage2(&self, links: &[WeakestLink<K>]) -> Vec<Question<K>> {
        let mut questions = Vec::new();
        for link in links {
            let Some(criterion) = self.catalog.criterion(link.key()) else {
                continue;
            };
            match self.catalog.domain_set(criterion.key) {
                Some(set) if set.has_questions() => {
                    let slug = criterion.key.slug();
                    questions.extend(set.questions.iter().enumerate().map(|(i, prompt)| {
                        Question {
                            id: domain_question_id(slug, prompt.id.as_deref(), i + 1),
                            prompt: prompt.text.clone(),
                            stage: Stage::Stage2,
                            domain: Some(set.domain.clone()),
                            criterion: criterion.key,
                            weight: prompt.weight.unwrap_or(1.0),
                            kind: QuestionKind::Scalar,
                            example: None,
                        }
                    }));
                }
                _ => questions.extend(synthesize_domain_questions(criterion)),
            }
        }
        tracing::debug!(questions = questions.len(), "stage 2 sequence built");
        questions
    }

    /// Scenario prompts for the most critical links.
    pub fn stage3(&self, links: &[WeakestLink<K>]) -> Vec<Question<K>> {
        let mut questions = Vec::new();
        for link in links {
            let Some(criterion) = self.catalog.criterion(link.key()) else {
                continue;
            };
            let domain = self
                .catalog
                .domain_set(criterion.key)
                .map(|set| set.domain.clone())
                .unwrap_or_else(|| GENERIC_DOMAIN.to_string());
            let slug = criterion.key.slug();

            match self.catalog.scenarios(criterion.key) {
                Some(prompts) => {
                    questions.extend(prompts.iter().enumerate().map(|(i, prompt)| Question {
                        id: scenario_question_id(slug, prompt.id.as_deref(), i + 1),
                        prompt: prompt.text.clone(),
                        stage: Stage::Stage3,
                        domain: Some(domain.clone()),
                        criterion: criterion.key,
                        weight: prompt.weight.unwrap_or(1.0),
                        kind: QuestionKind::Scenario,
                        example: prompt.example.clone(),
                    }));
                }
                None => questions.extend(synthesize_scenarios(criterion, &domain)),
            }
        }
        tracing::debug!(questions = questions.len(), "stage 3 sequence built");
        questions
    }
}

/// Every catalog prompt past the first becomes a generic deep-dive question.
fn synthesize_domain_questions<K: CriterionKey>(
    criterion: &Criterion<K>,
) -> impl Iterator<Item = Question<K>> + '_ {
    let slug = criterion.key.slug();
    criterion
        .questions
        .iter()
        .skip(1)
        .enumerate()
        .map(move |(i, prompt)| Question {
            id: synthesized_domain_id(slug, i + 1),
            prompt: prompt.text.clone(),
            stage: Stage::Stage2,
            domain: Some(GENERIC_DOMAIN.to_string()),
            criterion: criterion.key,
            weight: 1.0 + i as f64 * 0.1,
            kind: QuestionKind::Scalar,
            example: None,
        })
}

fn synthesize_scenarios<K: CriterionKey>(
    criterion: &Criterion<K>,
    domain: &str,
) -> [Question<K>; 2] {
    let slug = criterion.key.slug();
    let topic = criterion.name.to_lowercase();
    let scenario = |n: usize, prompt: String, example: String| Question {
        id: scenario_question_id(slug, None, n),
        prompt,
        stage: Stage::Stage3,
        domain: Some(domain.to_string()),
        criterion: criterion.key,
        weight: 1.0,
        kind: QuestionKind::Scenario,
        example: Some(example),
    };

    [
        scenario(
            1,
            format!(
                "Picture a recent moment when {topic} became a point of tension between you. \
                 How well did the two of you handle it?"
            ),
            format!(
                "For example: a disagreement about {topic} that came up during an ordinary week."
            ),
        ),
        scenario(
            2,
            format!(
                "Suppose one of you raises a concern about {topic} and the other brushes it off. \
                 How confident are you that you could restore alignment afterwards?"
            ),
            "For example: what would either of you do in the following hour or day to repair it?"
                .to_string(),
        ),
    ]
}
