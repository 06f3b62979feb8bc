use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::candidates;
use crate::errors::AppError;
use crate::extraction::CandidateProfile;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CandidateDetail {
    pub candidate_id: i64,
    pub cv_filename: String,
    pub cv_text: Option<String>,
    pub profile: Option<CandidateProfile>,
    pub created_at: DateTime<Utc>,
}

/// GET /api/v1/candidates/:candidate_id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<i64>,
) -> Result<Json<CandidateDetail>, AppError> {
    let row = candidates::get_candidate(&state.db, candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;
    let profile = row
        .profile()
        .map_err(|e| AppError::CorruptRecord(format!("profile of candidate {candidate_id}: {e}")))?;

    Ok(Json(CandidateDetail {
        candidate_id: row.candidate_id,
        cv_filename: row.cv_filename,
        cv_text: row.cv_text,
        profile,
        created_at: row.created_at,
    }))
}
