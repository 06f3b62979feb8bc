//! Shortlisting: flags the matches of a JD that reach the threshold.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::matches;
use crate::matching::round3;
use crate::models::MatchRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistedCandidate {
    pub candidate_id: i64,
    pub cv_filename: Option<String>,
    pub match_score: f64,
}

impl From<MatchRow> for ShortlistedCandidate {
    fn from(row: MatchRow) -> Self {
        Self {
            candidate_id: row.candidate_id,
            cv_filename: row.cv_filename,
            match_score: round3(row.match_score),
        }
    }
}

/// Re-evaluates every match of `jd_id` against `threshold` (clearing stale flags)
/// and returns the shortlist, best first.
pub async fn shortlist_candidates_for_jd(
    pool: &SqlitePool,
    jd_id: i64,
    threshold: f64,
) -> Result<Vec<ShortlistedCandidate>, sqlx::Error> {
    let flagged = matches::apply_shortlist_threshold(pool, jd_id, threshold).await?;
    info!("JD {jd_id}: {flagged} candidate(s) at or above threshold {threshold:.2}");
    stored_shortlist(pool, jd_id).await
}

/// The shortlist as currently flagged in the database.
pub async fn stored_shortlist(
    pool: &SqlitePool,
    jd_id: i64,
) -> Result<Vec<ShortlistedCandidate>, sqlx::Error> {
    Ok(matches::shortlisted_for_jd(pool, jd_id)
        .await?
        .into_iter()
        .map(ShortlistedCandidate::from)
        .collect())
}
