use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/wki.sqlite"),
        }
    }
}

/// Thresholds for the extraction pipeline.
///
/// The defaults are the calibrated values; overriding them changes how
/// readily the pipeline falls back and how confidence is reported.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    /// Minimum cleaned characters for an extraction tier to count as usable.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    /// Minimum length for a day section that carries no exercise cue.
    #[serde(default = "default_min_section_chars")]
    pub min_section_chars: usize,
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,
    #[serde(default = "default_max_dictionary_hits")]
    pub max_dictionary_hits: usize,
    #[serde(default = "default_max_potential_exercises")]
    pub max_potential_exercises: usize,
    #[serde(default = "default_fallback_confidence_cap")]
    pub fallback_confidence_cap: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_text_chars(),
            min_section_chars: default_min_section_chars(),
            default_rest_seconds: default_rest_seconds(),
            max_dictionary_hits: default_max_dictionary_hits(),
            max_potential_exercises: default_max_potential_exercises(),
            fallback_confidence_cap: default_fallback_confidence_cap(),
        }
    }
}

fn default_min_text_chars() -> usize {
    50
}
fn default_min_section_chars() -> usize {
    100
}
fn default_rest_seconds() -> u32 {
    90
}
fn default_max_dictionary_hits() -> usize {
    15
}
fn default_max_potential_exercises() -> usize {
    10
}
fn default_fallback_confidence_cap() -> f64 {
    0.9
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
            max_concurrency: default_max_concurrency(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.pdf".to_string(),
        "**/*.docx".to_string(),
        "**/*.txt".to_string(),
        "**/*.md".to_string(),
    ]
}
fn default_max_concurrency() -> usize {
    4
}
fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct NarrativeConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            endpoint: default_endpoint(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    30
}

impl NarrativeConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// Built-in defaults, used by commands that can run without a config file.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate pipeline
    if config.pipeline.min_text_chars == 0 {
        anyhow::bail!("pipeline.min_text_chars must be > 0");
    }
    if config.pipeline.default_rest_seconds == 0 {
        anyhow::bail!("pipeline.default_rest_seconds must be > 0");
    }
    if !(0.0..=1.0).contains(&config.pipeline.fallback_confidence_cap) {
        anyhow::bail!("pipeline.fallback_confidence_cap must be in [0.0, 1.0]");
    }

    // Validate import
    if config.import.max_concurrency == 0 {
        anyhow::bail!("import.max_concurrency must be >= 1");
    }
    if config.import.include_globs.is_empty() {
        anyhow::bail!("import.include_globs must not be empty");
    }

    // Validate narrative
    if config.narrative.is_enabled() && config.narrative.model.is_none() {
        anyhow::bail!(
            "narrative.model must be specified when provider is '{}'",
            config.narrative.provider
        );
    }

    match config.narrative.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown narrative provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(())
}
