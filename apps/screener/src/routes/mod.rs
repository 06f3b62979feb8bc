pub mod candidates;
pub mod health;
pub mod jobs;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job descriptions
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/:jd_id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:jd_id/matches", get(jobs::handle_job_matches))
        .route("/api/v1/jobs/:jd_id/shortlist", get(jobs::handle_job_shortlist))
        .route(
            "/api/v1/jobs/:jd_id/interview-emails",
            post(jobs::handle_interview_emails),
        )
        // Candidates
        .route(
            "/api/v1/candidates/:candidate_id",
            get(candidates::handle_get_candidate),
        )
        .route("/api/v1/stats", get(stats::handle_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db::{candidates, jobs, matches, test_pool};
    use crate::extraction::{CandidateProfile, JobSummary};
    use crate::matching::RuleBasedScorer;

    const CONFIG: &str = r#"
model: test
database_path: ":memory:"
shortlisting_threshold: 0.5
cv_directory: cvs
jd_csv_path: jobs.csv
company_name: Acme
hiring_team: Acme Talent
"#;

    async fn seeded_state() -> (AppState, i64, i64) {
        let pool = test_pool().await;
        let jd = jobs::upsert_job(&pool, "Data Engineer", "Python and SQL").await.unwrap();
        let summary = JobSummary {
            required_skills: vec!["python".into()],
            ..Default::default()
        };
        jobs::update_job_summary(&pool, jd, &summary).await.unwrap();

        let jane = candidates::upsert_candidate(&pool, "jane.pdf", "cv text").await.unwrap();
        let profile = CandidateProfile {
            name: Some("Jane Doe".into()),
            skills: vec!["python".into()],
            ..Default::default()
        };
        candidates::update_candidate_profile(&pool, jane, &profile).await.unwrap();

        let outcome = RuleBasedScorer::default().compute(&summary, &profile);
        matches::upsert_match(&pool, jd, jane, outcome.score, &outcome.details)
            .await
            .unwrap();
        matches::apply_shortlist_threshold(&pool, jd, 0.5).await.unwrap();

        let state = AppState {
            db: pool,
            config: Arc::new(Config::from_yaml_str(CONFIG).unwrap()),
        };
        (state, jd, jane)
    }

    async fn call(state: AppState, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _, _) = seeded_state().await;
        let (status, body) = call(state, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_and_get_job() {
        let (state, jd, _) = seeded_state().await;
        let (status, body) = call(state.clone(), Method::GET, "/api/v1/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Data Engineer");
        assert_eq!(body[0]["has_summary"], true);

        let (status, body) = call(state, Method::GET, &format!("/api/v1/jobs/{jd}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["required_skills"][0], "python");
    }

    #[tokio::test]
    async fn test_unknown_job_is_404_with_error_body() {
        let (state, _, _) = seeded_state().await;
        let (status, body) = call(state, Method::GET, "/api/v1/jobs/999/matches").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_matches_and_shortlist() {
        let (state, jd, jane) = seeded_state().await;
        let (status, body) =
            call(state.clone(), Method::GET, &format!("/api/v1/jobs/{jd}/matches")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["candidate_id"], jane);
        assert_eq!(body[0]["shortlist_status"], true);
        assert_eq!(body[0]["details"]["skills_score"], 1.0);

        let (_, body) = call(state, Method::GET, &format!("/api/v1/jobs/{jd}/shortlist")).await;
        assert_eq!(body[0]["cv_filename"], "jane.pdf");
    }

    #[tokio::test]
    async fn test_interview_emails() {
        let (state, jd, _) = seeded_state().await;
        let (status, body) = call(
            state,
            Method::POST,
            &format!("/api/v1/jobs/{jd}/interview-emails"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body[0]["email_subject"],
            "Interview Request: Data Engineer at Acme"
        );
        assert!(body[0]["email_body"]
            .as_str()
            .unwrap()
            .starts_with("Dear Jane Doe,"));
    }

    #[tokio::test]
    async fn test_candidate_detail_and_404() {
        let (state, _, jane) = seeded_state().await;
        let (status, body) =
            call(state.clone(), Method::GET, &format!("/api/v1/candidates/{jane}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["profile"]["name"], "Jane Doe");

        let (status, _) = call(state, Method::GET, "/api/v1/candidates/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats() {
        let (state, _, _) = seeded_state().await;
        let (status, body) = call(state, Method::GET, "/api/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["counts"]["matches"], 1);
        assert_eq!(body["counts"]["shortlisted_matches"], 1);
        assert_eq!(body["threshold"], 0.5);
        assert_eq!(body["missing_shortlisted_candidates"], serde_json::json!([]));
    }
}
