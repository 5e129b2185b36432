use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the schema if it is missing. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // One row per template; the full template lives in payload_json
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS templates (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            source_name TEXT NOT NULL,
            content_hash TEXT,
            method TEXT NOT NULL,
            confidence REAL NOT NULL,
            days INTEGER NOT NULL,
            exercises INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            payload_json TEXT NOT NULL,
            warnings_json TEXT NOT NULL DEFAULT '[]'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_templates_created_at ON templates(created_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_templates_content_hash ON templates(content_hash)")
        .execute(pool)
        .await?;

    Ok(())
}
