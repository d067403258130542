use chrono::{DateTime, Utc};

use super::domain::{Answers, CriterionKey, Question, Stage, WeakestLink};
use super::store::SessionSnapshot;

/// Explicit state of one respondent's run. Only [`StageController`] moves it forward.
///
/// [`StageController`]: super::controller::StageController
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSession<K> {
    pub(super) seed: u64,
    pub(super) stage: Stage,
    pub(super) sequence: Vec<Question<K>>,
    pub(super) cursor: usize,
    pub(super) answers: Answers,
    pub(super) weakest_links: Vec<WeakestLink<K>>,
}

impl<K: CriterionKey> AssessmentSession<K> {
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn sequence(&self) -> &[Question<K>] {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn weakest_links(&self) -> &[WeakestLink<K>] {
        &self.weakest_links
    }

    pub fn current_question(&self) -> Option<&Question<K>> {
        self.sequence.get(self.cursor)
    }

    pub fn is_done(&self) -> bool {
        self.stage.is_done()
    }

    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> SessionSnapshot<K> {
        SessionSnapshot {
            seed: self.seed,
            stage: self.stage,
            cursor: self.cursor,
            answers: self.answers.clone(),
            weakest_links: self.weakest_links.iter().map(WeakestLink::key).collect(),
            saved_at,
        }
    }
}

/// Result of a successful advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the next question of the same stage.
    Next,
    /// The stage finished; `entered` is the stage now active, possibly `Done`.
    StageCompleted { completed: Stage, entered: Stage },
}
