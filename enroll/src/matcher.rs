use serde::{Deserialize, Serialize};
use voxgate_voiceprint::Embedding;

use crate::error::EnrollError;

/// Score reported when there is nothing to compare against.
pub const NO_MATCH_SCORE: f32 = -1.0;

/// Outcome of an identification attempt.
///
/// `user_id` is set only when `matched` is true. `score` is the best
/// similarity found even when it fails the threshold, or
/// [`NO_MATCH_SCORE`] when nobody is enrolled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identification {
    pub user_id: Option<String>,
    pub score: f32,
    pub matched: bool,

    /// The best-scoring user regardless of the threshold.
    /// Useful for diagnostics; never serialized.
    #[serde(skip)]
    pub candidate: Option<String>,
}

impl Identification {
    /// The result for an empty store.
    pub fn no_match() -> Self {
        Self {
            user_id: None,
            score: NO_MATCH_SCORE,
            matched: false,
            candidate: None,
        }
    }
}

/// Checks that `threshold` lies in the cosine range `[-1, 1]`.
pub fn check_threshold(threshold: f32) -> Result<(), EnrollError> {
    if (-1.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(EnrollError::InvalidThreshold(threshold))
    }
}

/// Finds the record most similar to `query`.
///
/// Records are ranked by their raw inner product with `query`. The first
/// record seeds the maximum and later records replace it only with a
/// strictly higher product, so ties go to the earliest record. The winner's
/// product is clamped to `[-1, 1]` to form the reported score, and a score
/// equal to `threshold` counts as a match.
///
/// Fails with [`EnrollError::DimensionMismatch`] if a record's dimension
/// differs from the query's.
pub fn best_match<'a, I>(
    query: &Embedding,
    records: I,
    threshold: f32,
) -> Result<Identification, EnrollError>
where
    I: IntoIterator<Item = (&'a str, &'a Embedding)>,
{
    check_threshold(threshold)?;

    let mut best: Option<(&str, f32)> = None;
    for (user_id, embedding) in records {
        let dot = query
            .dot(embedding)
            .ok_or_else(|| EnrollError::DimensionMismatch {
                user_id: user_id.to_string(),
                expected: query.dim(),
                got: embedding.dim(),
            })?;
        match best {
            Some((_, top)) if dot <= top => {}
            _ => best = Some((user_id, dot)),
        }
    }

    let Some((user_id, dot)) = best else {
        return Ok(Identification::no_match());
    };
    let score = dot.clamp(-1.0, 1.0);
    let matched = score >= threshold;
    Ok(Identification {
        user_id: matched.then(|| user_id.to_string()),
        score,
        matched,
        candidate: Some(user_id.to_string()),
    })
}
