//! Optional narrative summaries of pipeline results.
//!
//! A [`NarrativeEnhancer`] turns a finished [`ProcessingResult`] into a short
//! human-readable description of the program. It only reads the result:
//! the template, confidence and method are never changed, and the pipeline
//! does not depend on it.
//!
//! - **[`DisabledNarrator`]**: returns an error; used when `narrative.provider = "disabled"`.
//! - **[`OpenAiNarrator`]**: calls an OpenAI-compatible chat-completions endpoint.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::time::Duration;

use crate::config::NarrativeConfig;
use crate::models::ProcessingResult;

/// Exercises listed per day in the prompt.
const PROMPT_EXERCISES_PER_DAY: usize = 8;

#[async_trait]
pub trait NarrativeEnhancer: Send + Sync {
    /// Identifier shown in logs.
    fn name(&self) -> &str;

    async fn summarize(&self, result: &ProcessingResult) -> Result<String>;
}

// ============ Disabled ============

pub struct DisabledNarrator;

#[async_trait]
impl NarrativeEnhancer for DisabledNarrator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn summarize(&self, _result: &ProcessingResult) -> Result<String> {
        bail!("Narrative provider is disabled")
    }
}

// ============ OpenAI ============

/// Chat-completions client. Requires `OPENAI_API_KEY`.
pub struct OpenAiNarrator {
    model: String,
    endpoint: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAiNarrator {
    pub fn new(config: &NarrativeConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("narrative.model required for OpenAI provider"))?;

        // Verify API key is available
        if std::env::var("OPENAI_API_KEY").is_err() {
            bail!("OPENAI_API_KEY environment variable not set");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            endpoint: config.endpoint.clone(),
            max_retries: config.max_retries,
            client,
        })
    }
}

#[async_trait]
impl NarrativeEnhancer for OpenAiNarrator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, result: &ProcessingResult) -> Result<String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You describe strength training programs in two or three plain sentences for the athlete who will follow them."
                },
                { "role": "user", "content": build_prompt(result) }
            ],
            "temperature": 0.3,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, delay_secs = delay.as_secs(), "retrying narrative request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_chat_response(&json);
                    }

                    // Rate limited or server error: retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow::anyhow!(
                            "Narrative API error {}: {}",
                            status,
                            body_text
                        ));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Narrative API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Narrative failed after retries")))
    }
}

/// Compact, deterministic description of the result for the model.
pub fn build_prompt(result: &ProcessingResult) -> String {
    let template = &result.template;
    let mut prompt = format!(
        "Program \"{}\" ({} day(s), extraction method {}, confidence {:.2}).\n",
        template.name,
        result.extracted_days,
        result.method.as_str(),
        result.confidence
    );
    if !template.equipment.is_empty() {
        let _ = writeln!(prompt, "Equipment: {}.", template.equipment.join(", "));
    }
    for day in &template.days {
        let _ = writeln!(prompt, "{}:", day.name);
        for ex in day.exercises.iter().take(PROMPT_EXERCISES_PER_DAY) {
            let _ = writeln!(
                prompt,
                "- {} {}x{} rest {}s",
                ex.name, ex.sets, ex.reps, ex.rest_seconds
            );
        }
        if day.exercises.len() > PROMPT_EXERCISES_PER_DAY {
            let _ = writeln!(
                prompt,
                "- and {} more",
                day.exercises.len() - PROMPT_EXERCISES_PER_DAY
            );
        }
    }
    prompt
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    let content = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid chat response: missing choices[0].message.content"))?;
    Ok(content.trim().to_string())
}

/// Create the configured [`NarrativeEnhancer`].
///
/// | Config Value | Enhancer |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledNarrator`] |
/// | `"openai"` | [`OpenAiNarrator`] |
pub fn create_enhancer(config: &NarrativeConfig) -> Result<Box<dyn NarrativeEnhancer>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledNarrator)),
        "openai" => Ok(Box::new(OpenAiNarrator::new(config)?)),
        other => bail!("Unknown narrative provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineSettings;
    use crate::models::SourceDocument;
    use crate::pipeline::process;

    fn sample_result() -> ProcessingResult {
        let text = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\nDay 2\nSquat - 4 sets x 5 reps - Rest 120 seconds";
        process(
            &SourceDocument::new("two_day.txt", text.as_bytes().to_vec()),
            &PipelineSettings::default(),
        )
    }

    #[test]
    fn test_prompt_lists_days_and_exercises() {
        let prompt = build_prompt(&sample_result());
        assert!(prompt.starts_with("Program \"two day\" (2 day(s), extraction method pattern"));
        assert!(prompt.contains("Day 1:\n- Bench Press 3x8-10 rest 90s"));
        assert!(prompt.contains("Day 2:\n- Squat 4x5 rest 120s"));
        assert!(prompt.contains("Equipment: barbell, bench."));
    }

    #[test]
    fn test_parse_chat_response() {
        let json = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "  A two day plan.  " } }]
        });
        assert_eq!(parse_chat_response(&json).unwrap(), "A two day plan.");
        assert!(parse_chat_response(&serde_json::json!({ "choices": [] })).is_err());
    }

    #[test]
    fn test_create_disabled() {
        let enhancer = create_enhancer(&NarrativeConfig::default()).unwrap();
        assert_eq!(enhancer.name(), "disabled");
    }

    #[test]
    fn test_unknown_provider() {
        let config = NarrativeConfig {
            provider: "carrier-pigeon".to_string(),
            ..NarrativeConfig::default()
        };
        assert!(create_enhancer(&config).is_err());
    }

    #[tokio::test]
    async fn test_disabled_leaves_result_untouched() {
        let result = sample_result();
        let before = serde_json::to_value(&result.template).unwrap();
        assert!(DisabledNarrator.summarize(&result).await.is_err());
        assert_eq!(serde_json::to_value(&result.template).unwrap(), before);
    }
}
