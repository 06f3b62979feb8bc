//! SQLite persistence: pool setup, schema, and per-table queries.

pub mod candidates;
pub mod jobs;
pub mod matches;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Opens (creating if needed) the database at `path` and applies the schema.
pub async fn create_pool(path: &Path) -> Result<SqlitePool> {
    info!("Opening SQLite database at {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to database: {}", path.display()))?;

    migrate(&pool).await?;
    info!("SQLite pool established");
    Ok(pool)
}

/// Creates the tables if they do not exist.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS job_descriptions (
            jd_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            original_description TEXT,
            summary_json TEXT,
            created_at TEXT NOT NULL,
            UNIQUE (title, original_description)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create job_descriptions table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidates (
            candidate_id INTEGER PRIMARY KEY AUTOINCREMENT,
            cv_filename TEXT UNIQUE NOT NULL,
            cv_text TEXT,
            extracted_data_json TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create candidates table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            match_id INTEGER PRIMARY KEY AUTOINCREMENT,
            jd_id INTEGER NOT NULL REFERENCES job_descriptions (jd_id),
            candidate_id INTEGER NOT NULL REFERENCES candidates (candidate_id),
            match_score REAL NOT NULL,
            shortlist_status BOOLEAN NOT NULL DEFAULT 0,
            match_details_json TEXT,
            updated_at TEXT NOT NULL,
            UNIQUE (jd_id, candidate_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create matches table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_matches_jd_score ON matches (jd_id, match_score DESC)",
    )
    .execute(pool)
    .await?;

    info!("Database migrations completed");
    Ok(())
}

/// In-memory database with the schema applied. One connection, so every
/// query sees the same database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}
