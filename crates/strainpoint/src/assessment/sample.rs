use rand::Rng;

use super::controller::{SessionError, StageController};
use super::domain::{CriterionKey, Score};
use super::session::AssessmentSession;

/// Run a session to completion with uniformly random answers.
pub fn sample_session<K, R>(
    controller: &StageController<'_, K>,
    seed: u64,
    rng: &mut R,
) -> Result<AssessmentSession<K>, SessionError>
where
    K: CriterionKey,
    R: Rng + ?Sized,
{
    let mut session = controller.start(seed);
    while !session.is_done() {
        let value = rng.random_range(Score::MIN..=Score::MAX);
        controller.record_answer(&mut session, i64::from(value))?;
        controller.advance(&mut session)?;
    }
    Ok(session)
}
