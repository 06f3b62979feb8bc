use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::extraction::JobSummary;
use crate::models::JobRow;

/// Inserts a posting, or returns the id of the identical one already stored.
pub async fn upsert_job(
    pool: &SqlitePool,
    title: &str,
    description: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO job_descriptions (title, original_description, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (title, original_description) DO NOTHING
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_scalar(
        "SELECT jd_id FROM job_descriptions WHERE title = ? AND original_description = ?",
    )
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_job_summary(
    pool: &SqlitePool,
    jd_id: i64,
    summary: &JobSummary,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE job_descriptions SET summary_json = ? WHERE jd_id = ?")
        .bind(Json(summary))
        .bind(jd_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_job(pool: &SqlitePool, jd_id: i64) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM job_descriptions WHERE jd_id = ?")
        .bind(jd_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_jobs(pool: &SqlitePool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM job_descriptions ORDER BY jd_id")
        .fetch_all(pool)
        .await
}

/// Jobs still lacking a summary, or every job when `force` is set.
pub async fn jobs_needing_summary(
    pool: &SqlitePool,
    force: bool,
) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM job_descriptions WHERE ? OR summary_json IS NULL ORDER BY jd_id",
    )
    .bind(force)
    .fetch_all(pool)
    .await
}

pub async fn summarized_jobs(pool: &SqlitePool) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        "SELECT * FROM job_descriptions WHERE summary_json IS NOT NULL ORDER BY jd_id",
    )
    .fetch_all(pool)
    .await
}
