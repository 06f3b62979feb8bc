use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{jobs, matches};
use crate::errors::AppError;
use crate::extraction::JobSummary;
use crate::matching::{round3, MatchDetails};
use crate::models::JobRow;
use crate::scheduler::{generate_interview_requests, InterviewEmail};
use crate::shortlist::{stored_shortlist, ShortlistedCandidate};
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobListItem {
    pub jd_id: i64,
    pub title: String,
    pub has_summary: bool,
}

#[derive(Serialize)]
pub struct JobDetail {
    pub jd_id: i64,
    pub title: String,
    pub original_description: Option<String>,
    pub summary: Option<JobSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct MatchView {
    pub candidate_id: i64,
    pub cv_filename: Option<String>,
    pub match_score: f64,
    pub shortlist_status: bool,
    pub details: Option<MatchDetails>,
    pub updated_at: DateTime<Utc>,
}

async fn require_job(state: &AppState, jd_id: i64) -> Result<JobRow, AppError> {
    jobs::get_job(&state.db, jd_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job description {jd_id} not found")))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobListItem>>, AppError> {
    let items = jobs::list_jobs(&state.db)
        .await?
        .into_iter()
        .map(|job| JobListItem {
            has_summary: job.summary_json.is_some(),
            jd_id: job.jd_id,
            title: job.title,
        })
        .collect();
    Ok(Json(items))
}

/// GET /api/v1/jobs/:jd_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(jd_id): Path<i64>,
) -> Result<Json<JobDetail>, AppError> {
    let job = require_job(&state, jd_id).await?;
    let summary = job
        .summary()
        .map_err(|e| AppError::CorruptRecord(format!("summary of JD {jd_id}: {e}")))?;
    Ok(Json(JobDetail {
        jd_id: job.jd_id,
        title: job.title,
        original_description: job.original_description,
        summary,
        created_at: job.created_at,
    }))
}

/// GET /api/v1/jobs/:jd_id/matches
pub async fn handle_job_matches(
    State(state): State<AppState>,
    Path(jd_id): Path<i64>,
) -> Result<Json<Vec<MatchView>>, AppError> {
    require_job(&state, jd_id).await?;
    let rows = matches::matches_for_jd(&state.db, jd_id).await?;

    let mut views = Vec::with_capacity(rows.len());
    for row in rows {
        let details = row.details().map_err(|e| {
            AppError::CorruptRecord(format!("match {} details: {e}", row.match_id))
        })?;
        views.push(MatchView {
            candidate_id: row.candidate_id,
            cv_filename: row.cv_filename,
            match_score: round3(row.match_score),
            shortlist_status: row.shortlist_status,
            details,
            updated_at: row.updated_at,
        });
    }
    Ok(Json(views))
}

/// GET /api/v1/jobs/:jd_id/shortlist
pub async fn handle_job_shortlist(
    State(state): State<AppState>,
    Path(jd_id): Path<i64>,
) -> Result<Json<Vec<ShortlistedCandidate>>, AppError> {
    require_job(&state, jd_id).await?;
    Ok(Json(stored_shortlist(&state.db, jd_id).await?))
}

/// POST /api/v1/jobs/:jd_id/interview-emails
pub async fn handle_interview_emails(
    State(state): State<AppState>,
    Path(jd_id): Path<i64>,
) -> Result<Json<Vec<InterviewEmail>>, AppError> {
    require_job(&state, jd_id).await?;
    let shortlist = stored_shortlist(&state.db, jd_id).await?;
    let emails =
        generate_interview_requests(&state.db, jd_id, &shortlist, &state.config.branding()).await?;
    Ok(Json(emails))
}
