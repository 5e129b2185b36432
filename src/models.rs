//! Core data models used throughout the extraction pipeline.
//!
//! These types represent the documents, intermediate text spans, parsed
//! exercises, and final results that flow from raw bytes to a stored
//! workout template.

use serde::{Deserialize, Serialize};

use crate::strategy::TraceStep;

/// Raw input file: a name plus its bytes. Never mutated once read.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Which extraction tier produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    PdfTextObjects,
    OoxmlDocument,
    RawBytes,
    FilenameSkeleton,
    /// Every tier failed; content is empty.
    None,
}

/// Text recovered from a document by the extractor.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub content: String,
    pub source: TextSource,
    pub warnings: Vec<String>,
}

impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Organizational scheme guessed from the text. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatTag {
    NumberedDays,
    WeekAndDay,
    Weekdays,
    PushPullLegs,
    UpperLower,
    FullBody,
    KnownProgram,
    Table,
    Generic,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::NumberedDays => "numbered_days",
            FormatTag::WeekAndDay => "week_and_day",
            FormatTag::Weekdays => "weekdays",
            FormatTag::PushPullLegs => "push_pull_legs",
            FormatTag::UpperLower => "upper_lower",
            FormatTag::FullBody => "full_body",
            FormatTag::KnownProgram => "known_program",
            FormatTag::Table => "table",
            FormatTag::Generic => "generic",
        }
    }
}

/// A contiguous span of text believed to describe one training day.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySection {
    /// 1-based position in the document.
    pub index: usize,
    pub label: String,
    pub body: String,
}

/// One parsed exercise prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub name: String,
    pub sets: u32,
    /// Rep prescription, possibly a range such as `8-10`.
    pub reps: String,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A named collection of exercises for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub name: String,
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// How the schedule was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Pattern,
    Fallback,
    Manual,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Pattern => "pattern",
            ExtractionMethod::Fallback => "fallback",
            ExtractionMethod::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pattern" => Some(ExtractionMethod::Pattern),
            "fallback" => Some(ExtractionMethod::Fallback),
            "manual" => Some(ExtractionMethod::Manual),
            _ => None,
        }
    }
}

/// Exercise as it appears in a finished template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub id: String,
    pub order: usize,
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub rest_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Day as it appears in a finished template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDay {
    pub id: String,
    pub day_index: usize,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The structured schedule handed to the template store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredTemplate {
    pub id: String,
    pub name: String,
    pub source_name: String,
    pub days: Vec<TemplateDay>,
    pub equipment: Vec<String>,
    pub created_at: String, // ISO8601
}

/// Additive confidence signals, kept separate so callers can apply their own policy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub base: f64,
    pub days: f64,
    pub exercises: f64,
    pub sets_and_reps: f64,
    pub rest: f64,
    pub day_pattern: f64,
    /// Ceiling applied by the pipeline for the chosen method, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub raw_text: String,
    pub detected_format: FormatTag,
    pub text_source: TextSource,
    pub strategy_trace: Vec<TraceStep>,
    pub confidence: ConfidenceBreakdown,
}

/// Final pipeline output. Always produced, whatever the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    pub template: StructuredTemplate,
    pub confidence: f64,
    pub extracted_days: usize,
    pub extracted_exercises: usize,
    pub processing_time_ms: u64,
    pub method: ExtractionMethod,
    pub warnings: Vec<String>,
    pub debug: DebugInfo,
}
