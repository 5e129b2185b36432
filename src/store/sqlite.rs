//! SQLite-backed [`TemplateStore`].

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::models::{ExtractionMethod, ProcessingResult, StructuredTemplate};
use crate::{db, migrate};

use super::{StoredTemplate, TemplateStore, TemplateSummary};

pub struct SqliteTemplateStore {
    pool: SqlitePool,
}

impl SqliteTemplateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn parse_method(row: &SqliteRow) -> Result<ExtractionMethod> {
    let method: String = row.get("method");
    ExtractionMethod::parse(&method).ok_or_else(|| anyhow!("unknown extraction method: {}", method))
}

#[async_trait]
impl TemplateStore for SqliteTemplateStore {
    async fn save_with_hash(
        &self,
        template: &StructuredTemplate,
        result: &ProcessingResult,
        content_hash: Option<&str>,
    ) -> Result<String> {
        let payload = serde_json::to_string(template)?;
        let warnings = serde_json::to_string(&result.warnings)?;

        sqlx::query(
            r#"
            INSERT INTO templates (id, name, source_name, content_hash, method, confidence,
                                   days, exercises, created_at, payload_json, warnings_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                source_name = excluded.source_name,
                content_hash = excluded.content_hash,
                method = excluded.method,
                confidence = excluded.confidence,
                days = excluded.days,
                exercises = excluded.exercises,
                payload_json = excluded.payload_json,
                warnings_json = excluded.warnings_json
            "#,
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(&template.source_name)
        .bind(content_hash)
        .bind(result.method.as_str())
        .bind(result.confidence)
        .bind(result.extracted_days as i64)
        .bind(result.extracted_exercises as i64)
        .bind(&template.created_at)
        .bind(&payload)
        .bind(&warnings)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save template {}", template.id))?;

        Ok(template.id.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredTemplate>> {
        let row = sqlx::query(
            "SELECT id, content_hash, method, confidence, created_at, payload_json, warnings_json FROM templates WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let payload: String = row.get("payload_json");
        let warnings_json: String = row.get("warnings_json");
        let template: StructuredTemplate = serde_json::from_str(&payload)
            .with_context(|| format!("Corrupt payload for template {}", id))?;
        let warnings: Vec<String> = serde_json::from_str(&warnings_json)
            .with_context(|| format!("Corrupt warnings for template {}", id))?;

        Ok(Some(StoredTemplate {
            id: row.get("id"),
            method: parse_method(&row)?,
            confidence: row.get("confidence"),
            warnings,
            content_hash: row.get("content_hash"),
            created_at: row.get("created_at"),
            template,
        }))
    }

    async fn list(&self, limit: usize) -> Result<Vec<TemplateSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, source_name, method, confidence, days, exercises, created_at
            FROM templates
            ORDER BY created_at DESC, id ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let days: i64 = row.get("days");
                let exercises: i64 = row.get("exercises");
                Ok(TemplateSummary {
                    id: row.get("id"),
                    name: row.get("name"),
                    source_name: row.get("source_name"),
                    method: parse_method(row)?,
                    confidence: row.get("confidence"),
                    days: days.max(0) as usize,
                    exercises: exercises.max(0) as usize,
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<String>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM templates WHERE content_hash = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}
