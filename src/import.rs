//! Batch import of documents into a template store.
//!
//! Walks a file or directory, runs the pipeline on every matching document
//! concurrently (bounded by `import.max_concurrency`), and saves each
//! template. Documents whose bytes were already imported are skipped unless
//! `--full` is given.
//!
//! ```text
//! scan_inputs ─▶ JoinSet ─┬─ read ─▶ sha256 ─▶ [claimed? seen?] ─▶ pipeline ─▶ save
//!                         ├─ ...
//!                         └─ ...           (at most max_concurrency at once)
//! ```

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::{Config, ImportConfig, PipelineSettings};
use crate::models::{ProcessingResult, SourceDocument};
use crate::narrative;
use crate::pipeline;
use crate::progress::{ImportProgressEvent, ImportProgressReporter, ProgressMode};
use crate::store::{InMemoryTemplateStore, SqliteTemplateStore, TemplateStore};

/// A document selected for import.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Path relative to the import root, used in progress and reports.
    pub relative: String,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct Scan {
    pub files: Vec<InputFile>,
    /// Matching files skipped for exceeding `max_file_bytes`.
    pub oversized: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Run the pipeline but save nothing.
    pub dry_run: bool,
    /// Re-import documents whose content was seen before.
    pub full: bool,
    /// Keep every [`ProcessingResult`] in the report.
    pub keep_results: bool,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub files: usize,
    pub processed: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub oversized: usize,
    pub by_method: BTreeMap<String, usize>,
    confidence_sum: f64,
    /// Populated when [`ImportOptions::keep_results`] is set, sorted by file.
    pub results: Vec<(String, ProcessingResult)>,
}

impl ImportReport {
    pub fn mean_confidence(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.confidence_sum / self.processed as f64
        }
    }
}

enum FileOutcome {
    Processed {
        result: Box<ProcessingResult>,
        stored: bool,
    },
    Duplicate {
        existing: String,
    },
}

/// Select the documents under `path` that match the import globs.
pub fn scan_inputs(path: &Path, config: &ImportConfig) -> Result<Scan> {
    if !path.exists() {
        bail!("Import path does not exist: {}", path.display());
    }

    let mut scan = Scan::default();

    // An explicitly named file is imported whatever its extension
    if path.is_file() {
        let size = std::fs::metadata(path)?.len();
        let relative = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        if size > config.max_file_bytes {
            scan.oversized.push(path.to_path_buf());
        } else {
            scan.files.push(InputFile {
                path: path.to_path_buf(),
                relative,
                size,
            });
        }
        return Ok(scan);
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let walker = WalkDir::new(path).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_path = entry.path();
        let relative = file_path.strip_prefix(path).unwrap_or(file_path);
        let rel_str = relative.to_string_lossy().to_string();

        // Apply exclude patterns
        if exclude_set.is_match(&rel_str) {
            continue;
        }

        // Apply include patterns
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let size = entry.metadata()?.len();
        if size > config.max_file_bytes {
            tracing::warn!(file = %rel_str, size, "skipping oversized file");
            scan.oversized.push(file_path.to_path_buf());
            continue;
        }

        scan.files.push(InputFile {
            path: file_path.to_path_buf(),
            relative: rel_str,
            size,
        });
    }

    // Sort for deterministic ordering
    scan.files.sort_by(|a, b| a.relative.cmp(&b.relative));

    Ok(scan)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

/// Hex SHA-256 of a document's bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Import everything under `path` into `store`.
pub async fn import_path(
    path: &Path,
    config: &Config,
    options: ImportOptions,
    store: Arc<dyn TemplateStore>,
    reporter: &dyn ImportProgressReporter,
) -> Result<ImportReport> {
    reporter.report(ImportProgressEvent::Discovering {
        root: path.display().to_string(),
    });
    let scan = scan_inputs(path, &config.import)?;

    let mut report = ImportReport {
        files: scan.files.len(),
        oversized: scan.oversized.len(),
        ..ImportReport::default()
    };
    let total = scan.files.len() as u64;

    let semaphore = Arc::new(Semaphore::new(config.import.max_concurrency));
    let claimed: Arc<Mutex<HashMap<String, String>>> = Arc::default();
    let mut tasks = JoinSet::new();
    for file in scan.files {
        let semaphore = Arc::clone(&semaphore);
        let store = Arc::clone(&store);
        let claimed = Arc::clone(&claimed);
        let settings = config.pipeline.clone();
        tasks.spawn(async move {
            let name = file.relative.clone();
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    import_one(&file, &settings, store.as_ref(), &claimed, options).await
                }
                Err(e) => Err(e.into()),
            };
            (name, outcome)
        });
    }

    let mut done = 0u64;
    while let Some(joined) = tasks.join_next().await {
        let (name, outcome) = joined.context("import task panicked")?;
        done += 1;
        let method = match outcome {
            Ok(FileOutcome::Processed { result, stored }) => {
                report.processed += 1;
                if stored {
                    report.stored += 1;
                }
                report.confidence_sum += result.confidence;
                *report
                    .by_method
                    .entry(result.method.as_str().to_string())
                    .or_insert(0) += 1;
                let method = result.method.as_str().to_string();
                if options.keep_results {
                    report.results.push((name.clone(), *result));
                }
                method
            }
            Ok(FileOutcome::Duplicate { existing }) => {
                tracing::info!(file = %name, existing = %existing, "already imported");
                report.duplicates += 1;
                "duplicate".to_string()
            }
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "import failed");
                eprintln!("Warning: {}: {:#}", name, e);
                report.failed += 1;
                "failed".to_string()
            }
        };
        reporter.report(ImportProgressEvent::Processing {
            n: done,
            total,
            file: name,
            method,
        });
    }

    report.results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(report)
}

/// First file of this batch to claim `hash`, if another one already did.
fn claim_hash(
    claimed: &Mutex<HashMap<String, String>>,
    hash: &str,
    file: &str,
) -> Result<Option<String>> {
    let mut claimed = claimed
        .lock()
        .map_err(|_| anyhow::anyhow!("import hash registry poisoned"))?;
    match claimed.get(hash) {
        Some(first) => Ok(Some(first.clone())),
        None => {
            claimed.insert(hash.to_string(), file.to_string());
            Ok(None)
        }
    }
}

async fn import_one(
    file: &InputFile,
    settings: &PipelineSettings,
    store: &dyn TemplateStore,
    claimed: &Mutex<HashMap<String, String>>,
    options: ImportOptions,
) -> Result<FileOutcome> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .with_context(|| format!("Failed to read {}", file.path.display()))?;
    let hash = content_hash(&bytes);

    if !options.full && !options.dry_run {
        // Identical files in one batch would both miss the store lookup
        if let Some(existing) = claim_hash(claimed, &hash, &file.relative)? {
            return Ok(FileOutcome::Duplicate { existing });
        }
        if let Some(existing) = store.find_by_hash(&hash).await? {
            return Ok(FileOutcome::Duplicate { existing });
        }
    }

    let name = file
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.relative.clone());
    let doc = SourceDocument::new(name, bytes);
    let settings = settings.clone();
    let result = tokio::task::spawn_blocking(move || pipeline::process(&doc, &settings))
        .await
        .with_context(|| format!("Pipeline task failed for {}", file.relative))?;

    let stored = if options.dry_run {
        false
    } else {
        store
            .save_with_hash(&result.template, &result, Some(&hash))
            .await?;
        true
    };

    Ok(FileOutcome::Processed {
        result: Box::new(result),
        stored,
    })
}

/// CLI entry point for `wki import`.
pub async fn run_import(
    config: &Config,
    path: &Path,
    dry_run: bool,
    full: bool,
    summarize: bool,
    progress: ProgressMode,
) -> Result<()> {
    let enhancer = if summarize {
        Some(narrative::create_enhancer(&config.narrative)?)
    } else {
        None
    };

    let sqlite = if dry_run {
        None
    } else {
        Some(Arc::new(SqliteTemplateStore::open(config).await?))
    };
    let store: Arc<dyn TemplateStore> = match &sqlite {
        Some(s) => s.clone() as Arc<dyn TemplateStore>,
        None => Arc::new(InMemoryTemplateStore::new()) as Arc<dyn TemplateStore>,
    };

    let options = ImportOptions {
        dry_run,
        full,
        keep_results: summarize,
    };
    let reporter = progress.reporter();
    let report = import_path(path, config, options, store, reporter.as_ref()).await?;

    if let Some(enhancer) = enhancer {
        for (file, result) in &report.results {
            match enhancer.summarize(result).await {
                Ok(summary) => println!("{}: {}", file, summary),
                Err(e) => eprintln!("Warning: summary for {} failed: {:#}", file, e),
            }
        }
    }

    if dry_run {
        println!("import {} (dry-run)", path.display());
    } else {
        println!("import {}", path.display());
    }
    println!("  files: {}", report.files);
    println!("  processed: {}", report.processed);
    println!("  stored: {}", report.stored);
    if report.duplicates > 0 {
        println!("  already imported: {}", report.duplicates);
    }
    if report.oversized > 0 {
        println!("  skipped (too large): {}", report.oversized);
    }
    if report.failed > 0 {
        println!("  failed: {}", report.failed);
    }
    for (method, count) in &report.by_method {
        println!("  {}: {}", method, count);
    }
    println!("  mean confidence: {:.2}", report.mean_confidence());
    println!("ok");

    if let Some(s) = sqlite {
        s.close().await;
    }
    Ok(())
}
