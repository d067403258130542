use rand::rngs::StdRng;
use rand::SeedableRng;

use super::catalog::Catalog;
use super::domain::{
    Answers, CriterionKey, Question, QuestionId, Score, ScoringThresholds, Stage, WeakestLink,
};
use super::scoring::ScoreAggregator;
use super::selector::{select, WeakestLinkSelector, DEFAULT_LINK_LIMIT};
use super::sequence::SequenceBuilder;
use super::session::{Advance, AssessmentSession};
use super::store::SessionSnapshot;

/// Tunables shared by the controller and the classification engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssessmentPolicy {
    pub weak_link_limit: usize,
    pub critical_link_limit: usize,
    pub thresholds: ScoringThresholds,
}

impl Default for AssessmentPolicy {
    fn default() -> Self {
        Self {
            weak_link_limit: DEFAULT_LINK_LIMIT,
            critical_link_limit: DEFAULT_LINK_LIMIT,
            thresholds: ScoringThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("question '{question}' needs an answer before moving on")]
    AnswerRequired { question: QuestionId },
    #[error("already at the first question of this stage")]
    AtStart,
    #[error("assessment is already complete")]
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    #[error("snapshot cursor {cursor} is outside the rebuilt {stage:?} sequence of {len}")]
    CursorOutOfRange {
        stage: Stage,
        cursor: usize,
        len: usize,
    },
    #[error("snapshot claims {0:?} but the recorded answers never reach it")]
    UnreachableStage(Stage),
}

/// Drives a session through `Stage1 → Stage2 → Stage3 → Done`.
pub struct StageController<'a, K> {
    catalog: &'a Catalog<K>,
    policy: AssessmentPolicy,
}

impl<'a, K: CriterionKey> StageController<'a, K> {
    pub fn new(catalog: &'a Catalog<K>, policy: AssessmentPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn policy(&self) -> &AssessmentPolicy {
        &self.policy
    }

    /// Fresh session whose stage-1 order is fixed by `seed`.
    pub fn start(&self, seed: u64) -> AssessmentSession<K> {
        let mut session = AssessmentSession {
            seed,
            stage: Stage::Stage1,
            sequence: self.stage1_sequence(seed),
            cursor: 0,
            answers: Answers::default(),
            weakest_links: Vec::new(),
        };
        if session.sequence.is_empty() {
            self.complete_stage(&mut session);
        }
        session
    }

    /// Record an answer for the current question. Values are clamped to 0..=10.
    pub fn record_answer(
        &self,
        session: &mut AssessmentSession<K>,
        value: i64,
    ) -> Result<QuestionId, SessionError> {
        let id = session
            .current_question()
            .map(|question| question.id.clone())
            .ok_or(SessionError::Finished)?;
        session.answers.record(id.clone(), Score::new(value));
        tracing::debug!(question = %id, value, "answer recorded");
        Ok(id)
    }

    pub fn advance(&self, session: &mut AssessmentSession<K>) -> Result<Advance, SessionError> {
        let question = session.current_question().ok_or(SessionError::Finished)?;
        if !session.answers.contains(&question.id) {
            return Err(SessionError::AnswerRequired {
                question: question.id.clone(),
            });
        }

        if session.cursor + 1 < session.sequence.len() {
            session.cursor += 1;
            return Ok(Advance::Next);
        }

        let completed = session.stage;
        self.complete_stage(session);
        Ok(Advance::StageCompleted {
            completed,
            entered: session.stage,
        })
    }

    /// Step back within the current stage. Answers are kept.
    pub fn back(&self, session: &mut AssessmentSession<K>) -> Result<(), SessionError> {
        if session.is_done() {
            return Err(SessionError::Finished);
        }
        if session.cursor == 0 {
            return Err(SessionError::AtStart);
        }
        session.cursor -= 1;
        Ok(())
    }

    /// Rebuild a session from a snapshot. Sequences and weakest links are always
    /// recomputed from the seed and the answers.
    pub fn restore(
        &self,
        snapshot: SessionSnapshot<K>,
    ) -> Result<AssessmentSession<K>, RestoreError> {
        let SessionSnapshot {
            seed,
            stage,
            cursor,
            answers,
            ..
        } = snapshot;

        let results = self.aggregator().stage1(&answers);
        let weakest_links = match stage {
            Stage::Stage1 => Vec::new(),
            _ => self.selector().deep_dive_candidates(&results),
        };
        let sequence = match stage {
            Stage::Stage1 => self.stage1_sequence(seed),
            Stage::Stage2 => self.builder().stage2(&weakest_links),
            Stage::Stage3 => self.builder().stage3(&self.critical_links(&weakest_links)),
            Stage::Done => Vec::new(),
        };

        if stage != Stage::Done {
            if stage != Stage::Stage1 && sequence.is_empty() {
                return Err(RestoreError::UnreachableStage(stage));
            }
            if cursor >= sequence.len() {
                return Err(RestoreError::CursorOutOfRange {
                    stage,
                    cursor,
                    len: sequence.len(),
                });
            }
        }

        Ok(AssessmentSession {
            seed,
            stage,
            sequence,
            cursor: if stage == Stage::Done { 0 } else { cursor },
            answers,
            weakest_links,
        })
    }

    /// Links promoted into the scenario stage.
    pub fn critical_links(&self, weakest_links: &[WeakestLink<K>]) -> Vec<WeakestLink<K>> {
        select(
            weakest_links.iter().map(|link| link.result.clone()),
            self.policy.critical_link_limit,
        )
    }

    fn complete_stage(&self, session: &mut AssessmentSession<K>) {
        loop {
            let (next, sequence) = match session.stage {
                Stage::Stage1 => {
                    let results = self.aggregator().stage1(&session.answers);
                    session.weakest_links = self.selector().deep_dive_candidates(&results);
                    if session.weakest_links.is_empty() {
                        (Stage::Done, Vec::new())
                    } else {
                        (Stage::Stage2, self.builder().stage2(&session.weakest_links))
                    }
                }
                Stage::Stage2 => {
                    let critical = self.critical_links(&session.weakest_links);
                    let sequence = self.builder().stage3(&critical);
                    if sequence.is_empty() {
                        (Stage::Done, sequence)
                    } else {
                        (Stage::Stage3, sequence)
                    }
                }
                Stage::Stage3 | Stage::Done => (Stage::Done, Vec::new()),
            };

            tracing::info!(
                from = ?session.stage,
                to = ?next,
                questions = sequence.len(),
                "stage transition"
            );
            session.stage = next;
            session.sequence = sequence;
            session.cursor = 0;

            if session.stage == Stage::Done || !session.sequence.is_empty() {
                return;
            }
        }
    }

    fn stage1_sequence(&self, seed: u64) -> Vec<Question<K>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.builder().stage1(&mut rng)
    }

    fn aggregator(&self) -> ScoreAggregator<'a, K> {
        ScoreAggregator::new(self.catalog, self.policy.thresholds)
    }

    fn selector(&self) -> WeakestLinkSelector {
        WeakestLinkSelector::new(self.policy.thresholds, self.policy.weak_link_limit)
    }

    fn builder(&self) -> SequenceBuilder<'a, K> {
        SequenceBuilder::new(self.catalog)
    }
}
