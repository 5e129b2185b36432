//! End-to-end extraction pipeline.
//!
//! ```text
//! bytes ─▶ extract ─▶ clean ─▶ classify ─▶ segment ─▶ parse lines
//!                                                        │
//!                                      0 exercises ─▶ vocabulary ─▶ manual
//!                                                        │
//!                                               build + score ─▶ ProcessingResult
//! ```
//!
//! [`process`] is synchronous and never returns an error: every soft failure
//! becomes a warning and a trace entry, and total failure becomes a
//! `manual` result with a placeholder day. [`process_file`] is the async
//! entry that reads the bytes and runs the pipeline on a blocking thread.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::classify::classify;
use crate::clean::clean;
use crate::config::PipelineSettings;
use crate::extract::extract;
use crate::line::parse_section;
use crate::models::{
    DebugInfo, ExtractionMethod, ProcessingResult, SourceDocument, TextSource, WorkoutDay,
};
use crate::strategy::{Outcome, Trace};
use crate::template;
use crate::vocabulary::extract_by_vocabulary;

pub const FALLBACK_WARNING: &str = "Used fallback extraction method";
pub const MANUAL_WARNING: &str = "No exercises could be extracted - manual entry required";
pub const MANUAL_DAY_NAME: &str = "Manual Entry Required";

const MANUAL_DAY_NOTE: &str =
    "The document could not be read automatically. Add each training day and its exercises by hand.";
const VOCABULARY_DAY_NOTE: &str =
    "Exercises were found without day structure; check sets, reps and rest before use.";
const UNTITLED: &str = "Untitled Program";

/// Run the full pipeline over one document.
pub fn process(doc: &SourceDocument, settings: &PipelineSettings) -> ProcessingResult {
    let started = Instant::now();
    let mut trace = Trace::new();

    let extracted = extract(doc, settings, &mut trace);
    let mut warnings = extracted.warnings.clone();
    let text = clean(&extracted.content);
    let format = classify(&text);
    tracing::debug!(document = %doc.name, format = format.as_str(), "classified");

    let sections = crate::segment::segment(&text, settings, &mut trace);
    let mut days: Vec<WorkoutDay> = sections
        .iter()
        .filter_map(|section| {
            let exercises = parse_section(&section.body, settings.default_rest_seconds);
            if exercises.is_empty() {
                None
            } else {
                Some(WorkoutDay {
                    name: section.label.clone(),
                    exercises,
                    notes: None,
                })
            }
        })
        .collect();

    let mut method = if extracted.source == TextSource::FilenameSkeleton {
        ExtractionMethod::Fallback
    } else {
        ExtractionMethod::Pattern
    };

    if days.is_empty() {
        let found = extract_by_vocabulary(&text, settings);
        if found.is_empty() {
            trace.record(
                "vocabulary",
                "vocabulary_scan",
                Outcome::Rejected,
                Some("no exercise vocabulary found".to_string()),
            );
            method = ExtractionMethod::Manual;
        } else {
            trace.record(
                "vocabulary",
                "vocabulary_scan",
                Outcome::Accepted,
                Some(format!("{} exercise(s)", found.len())),
            );
            method = ExtractionMethod::Fallback;
            days.push(WorkoutDay {
                name: "Day 1".to_string(),
                exercises: found,
                notes: Some(VOCABULARY_DAY_NOTE.to_string()),
            });
        }
    }

    let name = template_name(&doc.name);
    let (template, confidence, extracted_days) = match method {
        ExtractionMethod::Manual => {
            warnings.push(MANUAL_WARNING.to_string());
            let placeholder = vec![WorkoutDay {
                name: MANUAL_DAY_NAME.to_string(),
                exercises: Vec::new(),
                notes: Some(MANUAL_DAY_NOTE.to_string()),
            }];
            let breakdown = template::cap(template::score(&[], &text), 0.0);
            (template::build(&name, &doc.name, &placeholder), breakdown, 0)
        }
        ExtractionMethod::Fallback => {
            warnings.push(FALLBACK_WARNING.to_string());
            let breakdown = template::cap(
                template::score(&days, &text),
                settings.fallback_confidence_cap,
            );
            (template::build(&name, &doc.name, &days), breakdown, days.len())
        }
        ExtractionMethod::Pattern => {
            let breakdown = template::score(&days, &text);
            (template::build(&name, &doc.name, &days), breakdown, days.len())
        }
    };
    let extracted_exercises: usize = days.iter().map(|d| d.exercises.len()).sum();

    tracing::info!(
        document = %doc.name,
        method = method.as_str(),
        confidence = confidence.total,
        days = extracted_days,
        exercises = extracted_exercises,
        "document processed"
    );

    ProcessingResult {
        success: method != ExtractionMethod::Manual,
        template,
        confidence: confidence.total,
        extracted_days,
        extracted_exercises,
        processing_time_ms: started.elapsed().as_millis() as u64,
        method,
        warnings,
        debug: DebugInfo {
            raw_text: extracted.content,
            detected_format: format,
            text_source: extracted.source,
            strategy_trace: trace.into_steps(),
            confidence,
        },
    }
}

/// Read `path` and run the pipeline on a blocking thread.
pub async fn process_file(path: &Path, settings: &PipelineSettings) -> Result<ProcessingResult> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let doc = SourceDocument::new(name, bytes);
    let settings = settings.clone();
    tokio::task::spawn_blocking(move || process(&doc, &settings))
        .await
        .with_context(|| format!("Pipeline task failed for {}", path.display()))
}

/// Human-readable template name from a file name: `bench_press_12wk.pdf` → `bench press 12wk`.
fn template_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name
    }
}
