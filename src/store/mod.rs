//! Template persistence.
//!
//! The [`TemplateStore`] trait is the only thing the importer and CLI know
//! about storage. The pipeline itself never touches a store.
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`SqliteTemplateStore`] | the `wki` binary; one row per template with a JSON payload |
//! | [`InMemoryTemplateStore`] | tests and dry runs |

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{ExtractionMethod, ProcessingResult, StructuredTemplate};

pub use memory::InMemoryTemplateStore;
pub use sqlite::SqliteTemplateStore;

/// A template as read back from a store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredTemplate {
    pub id: String,
    pub method: ExtractionMethod,
    pub confidence: f64,
    pub warnings: Vec<String>,
    pub content_hash: Option<String>,
    pub created_at: String,
    pub template: StructuredTemplate,
}

/// One line of `wki list`.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub source_name: String,
    pub method: ExtractionMethod,
    pub confidence: f64,
    pub days: usize,
    pub exercises: usize,
    pub created_at: String,
}

impl TemplateSummary {
    fn from_result(template: &StructuredTemplate, result: &ProcessingResult) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            source_name: template.source_name.clone(),
            method: result.method,
            confidence: result.confidence,
            days: result.extracted_days,
            exercises: result.extracted_exercises,
            created_at: template.created_at.clone(),
        }
    }
}

/// Storage backend for finished templates.
///
/// Saving the same template id twice replaces the earlier row.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Store a template together with the result it came from, returning its id.
    async fn save(&self, template: &StructuredTemplate, result: &ProcessingResult) -> Result<String> {
        self.save_with_hash(template, result, None).await
    }

    /// Like [`save`](TemplateStore::save), remembering the source content hash
    /// so later imports of identical bytes can be skipped.
    async fn save_with_hash(
        &self,
        template: &StructuredTemplate,
        result: &ProcessingResult,
        content_hash: Option<&str>,
    ) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<StoredTemplate>>;

    /// Most recent templates first.
    async fn list(&self, limit: usize) -> Result<Vec<TemplateSummary>>;

    /// Id of a template previously saved from content with this hash.
    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<String>>;
}
