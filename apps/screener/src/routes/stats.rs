use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::inspect::{inspect, missing_shortlisted_candidates, InspectReport};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub report: InspectReport,
    pub missing_shortlisted_candidates: Vec<i64>,
}

/// GET /api/v1/stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let report = inspect(&state.db, state.config.shortlisting_threshold).await?;
    let missing = missing_shortlisted_candidates(&state.db).await?;
    Ok(Json(StatsResponse {
        report,
        missing_shortlisted_candidates: missing,
    }))
}
