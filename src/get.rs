//! Template retrieval and listing for the CLI.
//!
//! `wki get <id>` prints one stored template; `wki list` prints the most
//! recent ones. Both read through [`TemplateStore`].

use anyhow::{bail, Result};

use crate::config::Config;
use crate::store::{SqliteTemplateStore, StoredTemplate, TemplateStore, TemplateSummary};

/// Fetch one template, failing if it does not exist.
pub async fn get_template(store: &dyn TemplateStore, id: &str) -> Result<StoredTemplate> {
    match store.get(id).await? {
        Some(t) => Ok(t),
        None => bail!("template not found: {}", id),
    }
}

/// CLI entry point: print a stored template.
pub async fn run_get(config: &Config, id: &str, json: bool) -> Result<()> {
    let store = SqliteTemplateStore::open(config).await?;
    let result = get_template(&store, id).await;
    store.close().await;
    let stored = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
        return Ok(());
    }
    print!("{}", render_template(&stored));
    Ok(())
}

/// CLI entry point: list the most recent templates.
pub async fn run_list(config: &Config, limit: usize) -> Result<()> {
    let store = SqliteTemplateStore::open(config).await?;
    let result = store.list(limit).await;
    store.close().await;
    let summaries = result?;

    if summaries.is_empty() {
        println!("No templates stored.");
        return Ok(());
    }
    for summary in &summaries {
        println!("{}", render_summary(summary));
    }
    Ok(())
}

pub fn render_template(stored: &StoredTemplate) -> String {
    let t = &stored.template;
    let mut out = String::new();
    out.push_str("--- Template ---\n");
    out.push_str(&format!("id:          {}\n", stored.id));
    out.push_str(&format!("name:        {}\n", t.name));
    out.push_str(&format!("source:      {}\n", t.source_name));
    out.push_str(&format!("method:      {}\n", stored.method.as_str()));
    out.push_str(&format!("confidence:  {:.2}\n", stored.confidence));
    out.push_str(&format!("equipment:   {}\n", t.equipment.join(", ")));
    out.push_str(&format!("created_at:  {}\n", stored.created_at));
    if !stored.warnings.is_empty() {
        out.push_str("warnings:\n");
        for w in &stored.warnings {
            out.push_str(&format!("  - {}\n", w));
        }
    }
    out.push('\n');

    for day in &t.days {
        out.push_str(&format!("--- {} ---\n", day.name));
        if let Some(ref notes) = day.notes {
            out.push_str(&format!("{}\n", notes));
        }
        for ex in &day.exercises {
            out.push_str(&format!(
                "{:>2}. {}  {} x {}  rest {}s",
                ex.order, ex.name, ex.sets, ex.reps, ex.rest_seconds
            ));
            if let Some(ref notes) = ex.notes {
                out.push_str(&format!("  ({})", notes));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn render_summary(s: &TemplateSummary) -> String {
    format!(
        "{}  {:<8}  {:.2}  {}d/{}e  {}  ({})",
        s.id,
        s.method.as_str(),
        s.confidence,
        s.days,
        s.exercises,
        s.name,
        s.source_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::models::SourceDocument;
    use crate::pipeline::process;
    use crate::store::InMemoryTemplateStore;

    #[tokio::test]
    async fn test_get_and_render() {
        let text = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\nDay 2\nSquat - 4 sets x 5 reps - Rest 120 seconds";
        let result = process(
            &SourceDocument::new("two_day.txt", text.as_bytes().to_vec()),
            &PipelineSettings::default(),
        );
        let store = InMemoryTemplateStore::new();
        let id = store.save(&result.template, &result).await.unwrap();

        let stored = get_template(&store, &id).await.unwrap();
        let rendered = render_template(&stored);
        assert!(rendered.contains("method:      pattern"));
        assert!(rendered.contains("--- Day 1 ---\n 1. Bench Press  3 x 8-10  rest 90s\n"));
        assert!(rendered.contains("--- Day 2 ---\n 1. Squat  4 x 5  rest 120s\n"));

        let summaries = store.list(10).await.unwrap();
        let line = render_summary(&summaries[0]);
        assert!(line.contains("pattern"));
        assert!(line.contains("2d/2e"));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = InMemoryTemplateStore::new();
        let err = get_template(&store, "nope").await.unwrap_err();
        assert!(err.to_string().contains("template not found"));
    }
}
