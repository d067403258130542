use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::catalog::Catalog;
use super::controller::{AssessmentPolicy, RestoreError, SessionError, StageController};
use super::domain::{CriterionKey, Question, Stage};
use super::report::{ClassificationEngine, Report};
use super::session::{Advance, AssessmentSession};
use super::store::{
    decode_snapshot, encode_snapshot, SessionId, SessionStore, SnapshotError, StoreError,
};
use super::strategy::StrategyTable;

/// Client-facing projection of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView<K> {
    pub session_id: SessionId,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question<K>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_answer: Option<u8>,
    pub weakest_links: Vec<K>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_stage: Option<Stage>,
}

/// Session lifecycle on top of a store: load, apply one step, save.
pub struct AssessmentService<K, S> {
    catalog: Arc<Catalog<K>>,
    strategies: Arc<StrategyTable<K>>,
    store: Arc<S>,
    policy: AssessmentPolicy,
    fixed_seed: Option<u64>,
    sequence: AtomicU64,
}

impl<K, S> AssessmentService<K, S>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    pub fn new(
        catalog: Arc<Catalog<K>>,
        strategies: Arc<StrategyTable<K>>,
        store: Arc<S>,
        policy: AssessmentPolicy,
    ) -> Self {
        Self {
            catalog,
            strategies,
            store,
            policy,
            fixed_seed: None,
            sequence: AtomicU64::new(1),
        }
    }

    /// Every new session uses `seed` for its stage-1 order.
    pub fn with_fixed_seed(mut self, seed: Option<u64>) -> Self {
        self.fixed_seed = seed;
        self
    }

    pub fn catalog(&self) -> &Catalog<K> {
        &self.catalog
    }

    pub fn policy(&self) -> &AssessmentPolicy {
        &self.policy
    }

    pub fn start(&self) -> Result<SessionView<K>, ServiceError> {
        // the counter restarts with the process; skip ids a persistent store still holds
        let id = loop {
            let id = self.next_session_id();
            if self.store.load(&id)?.is_none() {
                break id;
            }
        };
        self.start_with_id(id)
    }

    pub fn start_with_id(&self, id: SessionId) -> Result<SessionView<K>, ServiceError> {
        let session = self.fresh_session(&id)?;
        info!(session = %id, seed = session.seed(), "assessment started");
        Ok(self.view_of(&id, &session, None))
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView<K>, ServiceError> {
        let session = self.load(id)?;
        Ok(self.view_of(id, &session, None))
    }

    pub fn answer(&self, id: &SessionId, value: i64) -> Result<SessionView<K>, ServiceError> {
        let mut session = self.load(id)?;
        self.controller().record_answer(&mut session, value)?;
        self.persist(id, &session)?;
        Ok(self.view_of(id, &session, None))
    }

    pub fn advance(&self, id: &SessionId) -> Result<SessionView<K>, ServiceError> {
        let mut session = self.load(id)?;
        let outcome = self.controller().advance(&mut session)?;
        self.persist(id, &session)?;

        let completed = match outcome {
            Advance::Next => None,
            Advance::StageCompleted { completed, entered } => {
                info!(session = %id, ?completed, ?entered, "stage completed");
                Some(completed)
            }
        };
        Ok(self.view_of(id, &session, completed))
    }

    pub fn back(&self, id: &SessionId) -> Result<SessionView<K>, ServiceError> {
        let mut session = self.load(id)?;
        self.controller().back(&mut session)?;
        self.persist(id, &session)?;
        Ok(self.view_of(id, &session, None))
    }

    /// Final report for a finished session.
    pub fn report(
        &self,
        id: &SessionId,
        generated_at: DateTime<Utc>,
    ) -> Result<Report<K>, ServiceError> {
        let session = self.load(id)?;
        if !session.is_done() {
            return Err(ServiceError::Incomplete(id.clone()));
        }
        Ok(self.engine().finalize(&session, generated_at))
    }

    pub fn reset(&self, id: &SessionId) -> Result<(), ServiceError> {
        if !id.is_valid() {
            return Err(StoreError::InvalidId(id.0.clone()).into());
        }
        self.store.discard(id)?;
        info!(session = %id, "assessment discarded");
        Ok(())
    }

    /// Continue a stored session, or begin one under `id` when nothing is stored.
    /// Returns whether an existing session was resumed.
    pub fn resume_or_start(&self, id: SessionId) -> Result<(SessionView<K>, bool), ServiceError> {
        if self.store.load(&id)?.is_some() {
            let view = self.view(&id)?;
            Ok((view, true))
        } else {
            Ok((self.start_with_id(id)?, false))
        }
    }

    /// Load a session, replacing an unreadable snapshot with a fresh one.
    pub fn load(&self, id: &SessionId) -> Result<AssessmentSession<K>, ServiceError> {
        let payload = self
            .store
            .load(id)?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))?;

        let restored = decode_snapshot::<K>(&payload)
            .map_err(RecoveryCause::Snapshot)
            .and_then(|snapshot| {
                self.controller()
                    .restore(snapshot)
                    .map_err(RecoveryCause::Restore)
            });

        match restored {
            Ok(session) => Ok(session),
            Err(cause) => {
                warn!(session = %id, error = %cause, "discarding unreadable session snapshot");
                self.store.discard(id)?;
                self.fresh_session(id)
            }
        }
    }

    fn fresh_session(&self, id: &SessionId) -> Result<AssessmentSession<K>, ServiceError> {
        let seed = self.fixed_seed.unwrap_or_else(|| rand::rng().random());
        let session = self.controller().start(seed);
        self.persist(id, &session)?;
        Ok(session)
    }

    fn persist(&self, id: &SessionId, session: &AssessmentSession<K>) -> Result<(), ServiceError> {
        let payload = encode_snapshot(&session.snapshot(Utc::now()))?;
        self.store.save(id, payload)?;
        Ok(())
    }

    fn view_of(
        &self,
        id: &SessionId,
        session: &AssessmentSession<K>,
        completed_stage: Option<Stage>,
    ) -> SessionView<K> {
        let question = session.current_question().cloned();
        let current_answer = question
            .as_ref()
            .and_then(|question| session.answers().get(&question.id))
            .map(|score| score.value());
        SessionView {
            session_id: id.clone(),
            stage: session.stage(),
            stage_label: session.stage().label(),
            position: if session.is_done() {
                0
            } else {
                session.cursor() + 1
            },
            total: session.sequence().len(),
            answered: session.answers().len(),
            question,
            current_answer,
            weakest_links: session.weakest_links().iter().map(|link| link.key()).collect(),
            completed_stage,
        }
    }

    fn next_session_id(&self) -> SessionId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        SessionId(format!("session-{id:06}"))
    }

    fn controller(&self) -> StageController<'_, K> {
        StageController::new(&self.catalog, self.policy)
    }

    fn engine(&self) -> ClassificationEngine<'_, K> {
        ClassificationEngine::new(&self.catalog, &self.strategies, self.policy)
    }
}

#[derive(Debug, thiserror::Error)]
enum RecoveryCause {
    #[error(transparent)]
    Snapshot(SnapshotError),
    #[error(transparent)]
    Restore(RestoreError),
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("session '{0}' not found")]
    NotFound(SessionId),
    #[error("session '{0}' has not finished")]
    Incomplete(SessionId),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
