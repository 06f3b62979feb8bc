use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::extraction::CandidateProfile;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub candidate_id: i64,
    pub cv_filename: String,
    pub cv_text: Option<String>,
    pub extracted_data_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CandidateRow {
    /// Parsed profile, `None` when the CV has not been extracted yet.
    pub fn profile(&self) -> Result<Option<CandidateProfile>, serde_json::Error> {
        self.extracted_data_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }

    /// Name for correspondence; "Candidate" when extraction found none.
    pub fn display_name(&self) -> String {
        self.profile()
            .ok()
            .flatten()
            .and_then(|profile| profile.name)
            .unwrap_or_else(|| "Candidate".to_string())
    }
}
