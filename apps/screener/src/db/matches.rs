use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::matching::MatchDetails;
use crate::models::MatchRow;

const MATCH_COLUMNS: &str = r#"
    m.match_id, m.jd_id, m.candidate_id, c.cv_filename, m.match_score,
    m.shortlist_status, m.match_details_json, m.updated_at
"#;

/// Stores the score for a pair, replacing any earlier score. The shortlist flag is kept.
pub async fn upsert_match(
    pool: &SqlitePool,
    jd_id: i64,
    candidate_id: i64,
    score: f64,
    details: &MatchDetails,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO matches (jd_id, candidate_id, match_score, match_details_json, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (jd_id, candidate_id) DO UPDATE SET
            match_score = excluded.match_score,
            match_details_json = excluded.match_details_json,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(jd_id)
    .bind(candidate_id)
    .bind(score)
    .bind(Json(details))
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// All matches for a JD, best first.
pub async fn matches_for_jd(pool: &SqlitePool, jd_id: i64) -> Result<Vec<MatchRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches m
        LEFT JOIN candidates c ON m.candidate_id = c.candidate_id
        WHERE m.jd_id = ?
        ORDER BY m.match_score DESC, m.candidate_id
        "#
    );
    sqlx::query_as::<_, MatchRow>(&sql)
        .bind(jd_id)
        .fetch_all(pool)
        .await
}

/// Matches currently flagged as shortlisted for a JD, best first.
/// Flags whose candidate row is gone are still returned.
pub async fn shortlisted_for_jd(
    pool: &SqlitePool,
    jd_id: i64,
) -> Result<Vec<MatchRow>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {MATCH_COLUMNS}
        FROM matches m
        LEFT JOIN candidates c ON m.candidate_id = c.candidate_id
        WHERE m.jd_id = ? AND m.shortlist_status = 1
        ORDER BY m.match_score DESC, m.candidate_id
        "#
    );
    sqlx::query_as::<_, MatchRow>(&sql)
        .bind(jd_id)
        .fetch_all(pool)
        .await
}

/// Sets the flag on every match of the JD: shortlisted iff score >= threshold.
/// Returns the number of rows now flagged.
pub async fn apply_shortlist_threshold(
    pool: &SqlitePool,
    jd_id: i64,
    threshold: f64,
) -> Result<u64, sqlx::Error> {
    sqlx::query("UPDATE matches SET shortlist_status = (match_score >= ?) WHERE jd_id = ?")
        .bind(threshold)
        .bind(jd_id)
        .execute(pool)
        .await?;

    let flagged: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM matches WHERE jd_id = ? AND shortlist_status = 1",
    )
    .bind(jd_id)
    .fetch_one(pool)
    .await?;
    Ok(flagged as u64)
}
