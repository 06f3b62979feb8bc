use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::extraction::JobSummary;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub jd_id: i64,
    pub title: String,
    pub original_description: Option<String>,
    pub summary_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl JobRow {
    /// Parsed summary, `None` when the JD has not been summarized yet.
    pub fn summary(&self) -> Result<Option<JobSummary>, serde_json::Error> {
        self.summary_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
    }
}
