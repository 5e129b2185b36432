//! In-memory [`TemplateStore`] for tests and dry runs.
//!
//! Uses a `HashMap` behind `std::sync::RwLock`.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{ProcessingResult, StructuredTemplate};

use super::{StoredTemplate, TemplateStore, TemplateSummary};

struct Entry {
    stored: StoredTemplate,
    summary: TemplateSummary,
}

pub struct InMemoryTemplateStore {
    templates: RwLock<HashMap<String, Entry>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("template store lock poisoned")
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn save_with_hash(
        &self,
        template: &StructuredTemplate,
        result: &ProcessingResult,
        content_hash: Option<&str>,
    ) -> Result<String> {
        let entry = Entry {
            stored: StoredTemplate {
                id: template.id.clone(),
                method: result.method,
                confidence: result.confidence,
                warnings: result.warnings.clone(),
                content_hash: content_hash.map(str::to_string),
                created_at: template.created_at.clone(),
                template: template.clone(),
            },
            summary: TemplateSummary::from_result(template, result),
        };
        let mut templates = self.templates.write().map_err(poisoned)?;
        templates.insert(template.id.clone(), entry);
        Ok(template.id.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<StoredTemplate>> {
        let templates = self.templates.read().map_err(poisoned)?;
        Ok(templates.get(id).map(|e| e.stored.clone()))
    }

    async fn list(&self, limit: usize) -> Result<Vec<TemplateSummary>> {
        let templates = self.templates.read().map_err(poisoned)?;
        let mut summaries: Vec<TemplateSummary> =
            templates.values().map(|e| e.summary.clone()).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        summaries.truncate(limit);
        Ok(summaries)
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<String>> {
        let templates = self.templates.read().map_err(poisoned)?;
        Ok(templates
            .values()
            .find(|e| e.stored.content_hash.as_deref() == Some(content_hash))
            .map(|e| e.stored.id.clone()))
    }
}
