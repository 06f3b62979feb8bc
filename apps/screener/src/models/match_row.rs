use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::matching::MatchDetails;

/// A stored match joined with the candidate's CV filename.
/// `cv_filename` is `None` when the candidate row no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub match_id: i64,
    pub jd_id: i64,
    pub candidate_id: i64,
    pub cv_filename: Option<String>,
    pub match_score: f64,
    pub shortlist_status: bool,
    pub match_details_json: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRow {
    pub fn details(&self) -> Result<Option<MatchDetails>, serde_json::Error> {
        self.match_details_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}
