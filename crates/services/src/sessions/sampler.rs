use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use exam_core::model::Question;

use crate::error::ExamError;

/// Draw a random, duplicate-free subset of the pool.
///
/// Fisher-Yates shuffle of a copy, then take the first `requested` elements:
/// uniform selection without replacement in linear time. `requested` is
/// clamped to `[1, pool.len()]`.
///
/// # Errors
///
/// Returns `ExamError::EmptyPool` when the pool has no questions; the caller
/// surfaces that rather than running an empty session.
pub fn draw(pool: &[Question], requested: usize) -> Result<Vec<Question>, ExamError> {
    draw_with(pool, requested, &mut rng())
}

/// Same as [`draw`] with an explicit RNG, for deterministic tests.
///
/// # Errors
///
/// Returns `ExamError::EmptyPool` when the pool has no questions.
pub fn draw_with<R: Rng + ?Sized>(
    pool: &[Question],
    requested: usize,
    rng: &mut R,
) -> Result<Vec<Question>, ExamError> {
    if pool.is_empty() {
        return Err(ExamError::EmptyPool);
    }

    let take = requested.clamp(1, pool.len());
    let mut drawn = pool.to_vec();
    drawn.shuffle(rng);
    drawn.truncate(take);
    Ok(drawn)
}
