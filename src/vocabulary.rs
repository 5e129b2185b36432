//! Last-resort exercise detection by vocabulary.
//!
//! Used only when pattern parsing found nothing anywhere in the document.
//! Tier one looks for known exercise names from [`EXERCISE_DICTIONARY`];
//! tier two, if tier one is empty, lists plausible words not in the
//! [`STOPLIST`] so a human can verify them. Garbage text skips both tiers;
//! the pipeline passes cleaned text, so in practice only the length rule of
//! [`is_garbage`] applies here.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::clean::is_garbage;
use crate::config::PipelineSettings;
use crate::models::ExerciseEntry;
use crate::tables::{EXERCISE_DICTIONARY, STOPLIST};

pub const DICTIONARY_NOTE: &str = "Detected from exercise dictionary";
pub const POTENTIAL_NOTE: &str = "Potential exercise - verify";

const DEFAULT_SETS: u32 = 3;
const DEFAULT_REPS: &str = "8-10";

/// One whole-word, case-insensitive matcher per dictionary entry.
static DICTIONARY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    EXERCISE_DICTIONARY
        .iter()
        .filter_map(|name| {
            let body = name
                .split(|c: char| c == ' ' || c == '-')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"[\s-]+");
            // plural forms ("squats", "push-ups") count as hits
            Regex::new(&format!(r"(?i)\b{}(?:e?s)?\b", body))
                .ok()
                .map(|re| (*name, re))
        })
        .collect()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z]{4,20}\b").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| STOPLIST.iter().copied().collect());

/// Find exercises in `text` without relying on line structure.
pub fn extract_by_vocabulary(text: &str, settings: &PipelineSettings) -> Vec<ExerciseEntry> {
    if is_garbage(text) {
        tracing::debug!("vocabulary scan skipped: garbage text");
        return Vec::new();
    }
    let hits = dictionary_hits(text, settings);
    if !hits.is_empty() {
        tracing::debug!(hits = hits.len(), "dictionary hits");
        return hits;
    }
    let potential = potential_exercises(text, settings);
    tracing::debug!(words = potential.len(), "potential exercise words");
    potential
}

/// Whether any known exercise name appears in `text`.
pub fn has_dictionary_hit(text: &str) -> bool {
    DICTIONARY_PATTERNS.iter().any(|(_, re)| re.is_match(text))
}

/// Known exercise names, in order of first appearance.
///
/// Overlapping matches keep the longest name, so "front squat" does not also
/// report "squat".
fn dictionary_hits(text: &str, settings: &PipelineSettings) -> Vec<ExerciseEntry> {
    let mut matches: Vec<(usize, usize, &'static str)> = DICTIONARY_PATTERNS
        .iter()
        .flat_map(|(name, re)| re.find_iter(text).map(move |m| (m.start(), m.end(), *name)))
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0).then((b.1 - b.0).cmp(&(a.1 - a.0))));

    let mut seen = HashSet::new();
    let mut covered_until = 0usize;
    let mut out = Vec::new();
    for (start, end, name) in matches {
        if start < covered_until {
            continue;
        }
        covered_until = end;
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        out.push(default_entry(name, DICTIONARY_NOTE, settings));
        if out.len() >= settings.max_dictionary_hits {
            break;
        }
    }
    out
}

/// Plausible words for a human to confirm.
fn potential_exercises(text: &str, settings: &PipelineSettings) -> Vec<ExerciseEntry> {
    let mut seen = HashSet::new();
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| !STOPWORDS.contains(w.to_lowercase().as_str()))
        .filter(|w| seen.insert(w.to_lowercase()))
        .take(settings.max_potential_exercises)
        .map(|w| default_entry(&capitalize(w), POTENTIAL_NOTE, settings))
        .collect()
}

fn default_entry(name: &str, note: &str, settings: &PipelineSettings) -> ExerciseEntry {
    ExerciseEntry {
        name: name.to_string(),
        sets: DEFAULT_SETS,
        reps: DEFAULT_REPS.to_string(),
        rest_seconds: settings.default_rest_seconds,
        notes: Some(note.to_string()),
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
