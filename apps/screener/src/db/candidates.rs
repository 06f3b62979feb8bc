use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::extraction::CandidateProfile;
use crate::models::CandidateRow;

/// Inserts a CV by filename, or returns the id of the row already stored for it.
pub async fn upsert_candidate(
    pool: &SqlitePool,
    cv_filename: &str,
    cv_text: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO candidates (cv_filename, cv_text, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (cv_filename) DO NOTHING
        "#,
    )
    .bind(cv_filename)
    .bind(cv_text)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    sqlx::query_scalar("SELECT candidate_id FROM candidates WHERE cv_filename = ?")
        .bind(cv_filename)
        .fetch_one(pool)
        .await
}

pub async fn update_candidate_profile(
    pool: &SqlitePool,
    candidate_id: i64,
    profile: &CandidateProfile,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE candidates SET extracted_data_json = ? WHERE candidate_id = ?")
            .bind(Json(profile))
            .bind(candidate_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_candidate(
    pool: &SqlitePool,
    candidate_id: i64,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE candidate_id = ?")
        .bind(candidate_id)
        .fetch_optional(pool)
        .await
}

/// Candidates still lacking extracted data, or all of them when `force` is set.
pub async fn candidates_needing_extraction(
    pool: &SqlitePool,
    force: bool,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE ? OR extracted_data_json IS NULL ORDER BY candidate_id",
    )
    .bind(force)
    .fetch_all(pool)
    .await
}

pub async fn extracted_candidates(pool: &SqlitePool) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE extracted_data_json IS NOT NULL ORDER BY candidate_id",
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_upsert_candidate_by_filename() {
        let pool = test_pool().await;
        let id = upsert_candidate(&pool, "jane.pdf", "Jane's CV").await.unwrap();
        let again = upsert_candidate(&pool, "jane.pdf", "changed text").await.unwrap();
        assert_eq!(id, again);

        let row = get_candidate(&pool, id).await.unwrap().unwrap();
        assert_eq!(row.cv_text.as_deref(), Some("Jane's CV"));
        assert_eq!(row.profile().unwrap(), None);
    }

    #[tokio::test]
    async fn test_profile_update_moves_candidate_out_of_pending() {
        let pool = test_pool().await;
        let jane = upsert_candidate(&pool, "jane.pdf", "text").await.unwrap();
        let john = upsert_candidate(&pool, "john.pdf", "text").await.unwrap();

        let profile = CandidateProfile {
            name: Some("Jane".into()),
            ..Default::default()
        };
        update_candidate_profile(&pool, jane, &profile).await.unwrap();

        let pending = candidates_needing_extraction(&pool, false).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].candidate_id, john);

        let done = extracted_candidates(&pool).await.unwrap();
        assert_eq!(done[0].profile().unwrap(), Some(profile));
        assert_eq!(candidates_needing_extraction(&pool, true).await.unwrap().len(), 2);
    }
}
