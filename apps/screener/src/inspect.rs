//! Database inspection: record counts, samples, and consistency checks.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::extraction::{CandidateProfile, JobSummary};
use crate::matching::MatchDetails;

const TOP_MATCHES: i64 = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCounts {
    pub job_descriptions: i64,
    pub summarized_job_descriptions: i64,
    pub candidates: i64,
    pub extracted_candidates: i64,
    pub matches: i64,
    pub matches_above_threshold: i64,
    pub shortlisted_matches: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSample {
    pub jd_id: i64,
    pub title: String,
    pub summary: Option<JobSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSample {
    pub candidate_id: i64,
    pub cv_filename: String,
    pub profile: Option<CandidateProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopMatch {
    pub jd_id: i64,
    pub job_title: String,
    pub candidate_id: i64,
    pub cv_filename: String,
    pub match_score: f64,
    pub details: Option<MatchDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub threshold: f64,
    pub counts: TableCounts,
    pub sample_job: Option<JobSample>,
    pub sample_candidate: Option<CandidateSample>,
    pub top_matches: Vec<TopMatch>,
}

#[derive(FromRow)]
struct SampleRow {
    id: i64,
    label: String,
    json: Option<String>,
}

#[derive(FromRow)]
struct TopMatchRow {
    jd_id: i64,
    job_title: String,
    candidate_id: i64,
    cv_filename: String,
    match_score: f64,
    match_details_json: Option<String>,
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(sql).fetch_one(pool).await
}

/// Counts, one sample of each record type and the best matches overall.
/// Stored JSON that no longer parses is reported as `None`.
pub async fn inspect(pool: &SqlitePool, threshold: f64) -> Result<InspectReport, sqlx::Error> {
    let matches_above_threshold: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM matches WHERE match_score >= ?")
            .bind(threshold)
            .fetch_one(pool)
            .await?;

    let counts = TableCounts {
        job_descriptions: count(pool, "SELECT COUNT(*) FROM job_descriptions").await?,
        summarized_job_descriptions: count(
            pool,
            "SELECT COUNT(*) FROM job_descriptions WHERE summary_json IS NOT NULL",
        )
        .await?,
        candidates: count(pool, "SELECT COUNT(*) FROM candidates").await?,
        extracted_candidates: count(
            pool,
            "SELECT COUNT(*) FROM candidates WHERE extracted_data_json IS NOT NULL",
        )
        .await?,
        matches: count(pool, "SELECT COUNT(*) FROM matches").await?,
        matches_above_threshold,
        shortlisted_matches: count(pool, "SELECT COUNT(*) FROM matches WHERE shortlist_status = 1")
            .await?,
    };

    let sample_job = sqlx::query_as::<_, SampleRow>(
        r#"
        SELECT jd_id AS id, title AS label, summary_json AS json
        FROM job_descriptions
        WHERE summary_json IS NOT NULL
        ORDER BY jd_id
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .map(|row| JobSample {
        jd_id: row.id,
        title: row.label,
        summary: row.json.and_then(|json| serde_json::from_str(&json).ok()),
    });

    let sample_candidate = sqlx::query_as::<_, SampleRow>(
        r#"
        SELECT candidate_id AS id, cv_filename AS label, extracted_data_json AS json
        FROM candidates
        WHERE extracted_data_json IS NOT NULL
        ORDER BY candidate_id
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?
    .map(|row| CandidateSample {
        candidate_id: row.id,
        cv_filename: row.label,
        profile: row.json.and_then(|json| serde_json::from_str(&json).ok()),
    });

    let top_matches = sqlx::query_as::<_, TopMatchRow>(
        r#"
        SELECT m.jd_id, j.title AS job_title, m.candidate_id, c.cv_filename,
               m.match_score, m.match_details_json
        FROM matches m
        JOIN job_descriptions j ON m.jd_id = j.jd_id
        JOIN candidates c ON m.candidate_id = c.candidate_id
        ORDER BY m.match_score DESC
        LIMIT ?
        "#,
    )
    .bind(TOP_MATCHES)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| TopMatch {
        jd_id: row.jd_id,
        job_title: row.job_title,
        candidate_id: row.candidate_id,
        cv_filename: row.cv_filename,
        match_score: row.match_score,
        details: row
            .match_details_json
            .and_then(|json| serde_json::from_str(&json).ok()),
    })
    .collect();

    Ok(InspectReport {
        threshold,
        counts,
        sample_job,
        sample_candidate,
        top_matches,
    })
}

/// Candidate ids flagged as shortlisted in `matches` that have no `candidates` row.
pub async fn missing_shortlisted_candidates(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT DISTINCT m.candidate_id
        FROM matches m
        LEFT JOIN candidates c ON m.candidate_id = c.candidate_id
        WHERE m.shortlist_status = 1 AND c.candidate_id IS NULL
        ORDER BY m.candidate_id
        "#,
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{candidates, jobs, matches, test_pool};
    use crate::matching::MatchWeights;

    fn details() -> MatchDetails {
        MatchDetails {
            skills_score: 1.0,
            experience_score: 1.0,
            education_score: 1.0,
            requirements_score: 1.0,
            weights_used: MatchWeights::default(),
        }
    }

    #[tokio::test]
    async fn test_inspect_empty_database() {
        let pool = test_pool().await;
        let report = inspect(&pool, 0.75).await.unwrap();
        assert_eq!(report.counts, TableCounts::default());
        assert!(report.sample_job.is_none());
        assert!(report.top_matches.is_empty());
    }

    #[tokio::test]
    async fn test_inspect_counts_and_samples() {
        let pool = test_pool().await;
        let jd = jobs::upsert_job(&pool, "Engineer", "desc").await.unwrap();
        jobs::upsert_job(&pool, "Analyst", "desc").await.unwrap();
        jobs::update_job_summary(&pool, jd, &JobSummary::default()).await.unwrap();

        let a = candidates::upsert_candidate(&pool, "a.pdf", "cv").await.unwrap();
        let b = candidates::upsert_candidate(&pool, "b.pdf", "cv").await.unwrap();
        candidates::update_candidate_profile(&pool, b, &CandidateProfile::default())
            .await
            .unwrap();

        matches::upsert_match(&pool, jd, a, 0.9, &details()).await.unwrap();
        matches::upsert_match(&pool, jd, b, 0.4, &details()).await.unwrap();
        matches::apply_shortlist_threshold(&pool, jd, 0.8).await.unwrap();

        let report = inspect(&pool, 0.75).await.unwrap();
        assert_eq!(
            report.counts,
            TableCounts {
                job_descriptions: 2,
                summarized_job_descriptions: 1,
                candidates: 2,
                extracted_candidates: 1,
                matches: 2,
                matches_above_threshold: 1,
                shortlisted_matches: 1,
            }
        );
        assert_eq!(report.sample_job.unwrap().title, "Engineer");
        assert_eq!(report.sample_candidate.unwrap().cv_filename, "b.pdf");
        assert_eq!(report.top_matches[0].cv_filename, "a.pdf");
        assert_eq!(report.top_matches[0].details, Some(details()));
    }

    #[tokio::test]
    async fn test_missing_shortlisted_candidates() {
        let pool = test_pool().await;
        let jd = jobs::upsert_job(&pool, "Engineer", "desc").await.unwrap();
        let kept = candidates::upsert_candidate(&pool, "kept.pdf", "cv").await.unwrap();
        let gone = candidates::upsert_candidate(&pool, "gone.pdf", "cv").await.unwrap();
        matches::upsert_match(&pool, jd, kept, 0.9, &details()).await.unwrap();
        matches::upsert_match(&pool, jd, gone, 0.9, &details()).await.unwrap();
        matches::apply_shortlist_threshold(&pool, jd, 0.5).await.unwrap();

        assert!(missing_shortlisted_candidates(&pool).await.unwrap().is_empty());

        // Simulate a database edited outside the application.
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&pool).await.unwrap();
        sqlx::query("DELETE FROM candidates WHERE candidate_id = ?")
            .bind(gone)
            .execute(&pool)
            .await
            .unwrap();

        assert_eq!(missing_shortlisted_candidates(&pool).await.unwrap(), vec![gone]);
    }
}
