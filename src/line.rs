//! Exercise line parsing.
//!
//! Each line is tried against an ordered family of grammars; the first one
//! that matches *and* yields a valid exercise name wins.
//!
//! | Grammar | Example |
//! |---------|---------|
//! | `dash` | `Bench Press - 3 sets x 8-10 reps - Rest 90 seconds` |
//! | `compact` | `Squat 5x5 180s`, `Bench Press 3x10 @ 135lbs` |
//! | `pipe_table` | `Deadlift | 1 | 5 | 180` |
//! | `numbered` | `2. Barbell Row 4 sets of 8` |
//!
//! Names pass through [`is_valid_exercise_name`] because upstream text can
//! still contain metadata that would otherwise parse as an exercise.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::clean::LONG_TOKEN_CHARS;
use crate::models::ExerciseEntry;
use crate::strategy::{first_match, Strategy, StrategyError};

const MIN_NAME_CHARS: usize = 3;
const MAX_NAME_CHARS: usize = 50;

/// All-caps-with-digits names longer than this are metadata keys.
const MAX_CAPS_DIGIT_NAME_CHARS: usize = 10;

/// Bare rest values below this are minutes.
const BARE_REST_MINUTES_BELOW: u32 = 10;

static DASH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*(?:[-*•·]\s*)?(?P<name>[a-z][a-z0-9 '&/().,-]*?)\s*[-–—:]\s*",
        r"(?P<sets>\d+)\s*sets?\s*(?:x|×|of)?\s*(?P<reps>\d+(?:\s*[-–]\s*\d+)?)\s*(?:reps?)?",
        r"(?:\s*[-–—,;]?\s*rest\s*:?\s*(?P<rest>\d+)\s*(?P<unit>[a-z]+)?)?",
    ))
    .unwrap()
});

static COMPACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*(?:[-*•·]\s*)?(?P<name>[a-z][a-z0-9 '&/().-]*?)\s*[:\-–]?\s+",
        r"(?P<sets>\d+)\s*[x×]\s*(?P<reps>\d+(?:\s*[-–]\s*\d+)?)",
        // rest: bare or with a time unit
        r"(?:\s*,?\s*(?:rest\s*:?\s*)?(?P<rest>\d+)\s*(?P<unit>seconds?|secs?|s|minutes?|mins?|m)?(?:[\s,]|$))?",
        // load: `@ ...` or a weight, never rest
        r"(?:\s*,?\s*(?:@.*|\d+(?:\.\d+)?\s*(?:lbs?|kgs?|pounds?|kilos?|%)))?\s*$",
    ))
    .unwrap()
});

static PIPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*\|?\s*(?P<name>[^|]+?)\s*\|\s*(?P<sets>\d+)\s*\|\s*(?P<reps>\d+(?:\s*[-–]\s*\d+)?)\s*",
        r"(?:\|\s*(?P<rest>\d+)\s*(?P<unit>[a-z]+)?\s*)?\|?\s*$",
    ))
    .unwrap()
});

static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*\d+\s*[.)]\s*(?P<name>[a-z][a-z0-9 '&/().-]*?)\s*[-–:,]?\s*",
        r"(?P<sets>\d+)\s*sets?\s*(?:of|x|×)\s*(?P<reps>\d+(?:\s*[-–]\s*\d+)?)",
        r"(?:.*?\brest\s*:?\s*(?P<rest>\d+)\s*(?P<unit>[a-z]+)?)?",
    ))
    .unwrap()
});

static TWO_LETTERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2}").unwrap());

static METADATA_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)https?:|ftp:|www\.|\.(?:com|org|net|io|pdf)\b|@|",
        r"endobj|endstream|startxref|xref|\bobj\b|\bstream\b|\btrailer\b|",
        r"flatedecode|creationdate|moddate|producer|mediabox",
    ))
    .unwrap()
});

static NON_LETTER_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z\s]{3,}").unwrap());

static REPS_DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[-–]\s*").unwrap());

/// Parse one line into an exercise, or `None` when no grammar accepts it.
pub fn parse_line(line: &str, default_rest: u32) -> Option<ExerciseEntry> {
    let dash = Grammar {
        name: "dash",
        re: &DASH_RE,
        default_rest,
    };
    let compact = Grammar {
        name: "compact",
        re: &COMPACT_RE,
        default_rest,
    };
    let pipe = Grammar {
        name: "pipe_table",
        re: &PIPE_RE,
        default_rest,
    };
    let numbered = Grammar {
        name: "numbered",
        re: &NUMBERED_RE,
        default_rest,
    };
    let chain: [&dyn Strategy<str, ExerciseEntry>; 4] = [&dash, &compact, &pipe, &numbered];
    first_match(&chain, line)
}

/// Parse every line of a section, in order.
pub fn parse_section(body: &str, default_rest: u32) -> Vec<ExerciseEntry> {
    body.lines()
        .filter_map(|line| parse_line(line, default_rest))
        .collect()
}

struct Grammar {
    name: &'static str,
    re: &'static Lazy<Regex>,
    default_rest: u32,
}

impl Strategy<str, ExerciseEntry> for Grammar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, line: &str) -> Result<ExerciseEntry, StrategyError> {
        let caps = self
            .re
            .captures(line)
            .ok_or_else(|| StrategyError::NotApplicable("no match".to_string()))?;
        entry_from_captures(&caps, self.default_rest)
    }
}

fn entry_from_captures(caps: &Captures, default_rest: u32) -> Result<ExerciseEntry, StrategyError> {
    let name = normalize_name(caps.name("name").map(|m| m.as_str()).unwrap_or_default());
    if !is_valid_exercise_name(&name) {
        return Err(StrategyError::Failed(format!("invalid name '{}'", name)));
    }
    let sets: u32 = caps
        .name("sets")
        .and_then(|m| m.as_str().parse().ok())
        .filter(|s| *s > 0)
        .ok_or_else(|| StrategyError::Failed("set count must be positive".to_string()))?;
    let reps = caps
        .name("reps")
        .map(|m| REPS_DASH_RE.replace_all(m.as_str().trim(), "-").into_owned())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| StrategyError::Failed("missing reps".to_string()))?;
    let rest_seconds = parse_rest(
        caps.name("rest").map(|m| m.as_str()),
        caps.name("unit").map(|m| m.as_str()),
        default_rest,
    );
    Ok(ExerciseEntry {
        name,
        sets,
        reps,
        rest_seconds,
        notes: None,
    })
}

fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| matches!(c, '-' | '–' | ':' | ',' | '.' | '|'))
        .trim()
        .to_string()
}

/// Rest in seconds.
///
/// An explicit unit wins (`2 min` → 120, `45s` → 45). A bare number below
/// 10 is minutes, anything else bare is seconds. Missing, zero or
/// unparseable values give `default_rest`.
pub fn parse_rest(value: Option<&str>, unit: Option<&str>, default_rest: u32) -> u32 {
    let Some(n) = value.and_then(|v| v.trim().parse::<u32>().ok()).filter(|n| *n > 0) else {
        return default_rest;
    };
    let unit = unit.map(|u| u.to_ascii_lowercase());
    match unit.as_deref() {
        Some(u) if u.starts_with('m') => n.saturating_mul(60),
        Some(u) if u.starts_with('s') => n,
        _ if n < BARE_REST_MINUTES_BELOW => n * 60,
        _ => n,
    }
}

/// Whether `name` looks like a real exercise rather than leftover noise.
pub fn is_valid_exercise_name(name: &str) -> bool {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return false;
    }
    if !TWO_LETTERS_RE.is_match(trimmed) {
        return false;
    }
    if METADATA_SHAPE_RE.is_match(trimmed) {
        return false;
    }
    let caps_and_digits = trimmed
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if caps_and_digits && trimmed.chars().any(|c| c.is_ascii_digit()) && len > MAX_CAPS_DIGIT_NAME_CHARS
    {
        return false;
    }
    if NON_LETTER_RUN_RE.is_match(trimmed) {
        return false;
    }
    !trimmed
        .split_whitespace()
        .any(|token| token.chars().count() >= LONG_TOKEN_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<ExerciseEntry> {
        parse_line(line, 90)
    }

    fn entry(name: &str, sets: u32, reps: &str, rest: u32) -> ExerciseEntry {
        ExerciseEntry {
            name: name.to_string(),
            sets,
            reps: reps.to_string(),
            rest_seconds: rest,
            notes: None,
        }
    }

    #[test]
    fn test_dash_grammar() {
        assert_eq!(
            parse("Bench Press - 3 sets x 8-10 reps - Rest 90 seconds"),
            Some(entry("Bench Press", 3, "8-10", 90))
        );
        assert_eq!(
            parse("Squat - 4 sets x 5 reps - Rest 120 seconds"),
            Some(entry("Squat", 4, "5", 120))
        );
    }

    #[test]
    fn test_dash_grammar_variants() {
        assert_eq!(
            parse("• Close-Grip Bench Press: 3 sets of 6 - 8 reps, rest 2 min"),
            Some(entry("Close-Grip Bench Press", 3, "6-8", 120))
        );
        assert_eq!(
            parse("Lat Pulldown – 3 sets × 12"),
            Some(entry("Lat Pulldown", 3, "12", 90))
        );
    }

    #[test]
    fn test_compact_grammar() {
        assert_eq!(parse("Squat 5x5 180s"), Some(entry("Squat", 5, "5", 180)));
        assert_eq!(parse("Overhead Press 3x8-10"), Some(entry("Overhead Press", 3, "8-10", 90)));
        assert_eq!(parse("- Dips 3 x 12 2"), Some(entry("Dips", 3, "12", 120)));
    }

    #[test]
    fn test_compact_load_is_not_rest() {
        assert_eq!(
            parse("Bench Press 3x10 @ 135lbs"),
            Some(entry("Bench Press", 3, "10", 90))
        );
        assert_eq!(parse("Squat 5x5 @ 100kg"), Some(entry("Squat", 5, "5", 90)));
        assert_eq!(parse("Squat 3x5 @ 80%"), Some(entry("Squat", 3, "5", 90)));
        assert_eq!(parse("Barbell Row 4x8 60 kg"), Some(entry("Barbell Row", 4, "8", 90)));
        assert_eq!(parse("Deadlift 3x5 135lbs"), Some(entry("Deadlift", 3, "5", 90)));
        assert_eq!(parse("Squat 5x5, 180s"), Some(entry("Squat", 5, "5", 180)));
        assert_eq!(
            parse("Front Squat 4x6 2 min @ RPE 8"),
            Some(entry("Front Squat", 4, "6", 120))
        );
    }

    #[test]
    fn test_pipe_grammar() {
        assert_eq!(parse("| Deadlift | 1 | 5 | 180 |"), Some(entry("Deadlift", 1, "5", 180)));
        assert_eq!(parse("Leg Curl | 3 | 10-12"), Some(entry("Leg Curl", 3, "10-12", 90)));
    }

    #[test]
    fn test_numbered_grammar() {
        assert_eq!(
            parse("2. Barbell Row 4 sets of 8"),
            Some(entry("Barbell Row", 4, "8", 90))
        );
        assert_eq!(
            parse("3) Face Pull 3 sets x 15, rest 60"),
            Some(entry("Face Pull", 3, "15", 60))
        );
    }

    #[test]
    fn test_rejects_non_exercise_lines() {
        assert_eq!(parse("Day 1"), None);
        assert_eq!(parse("Rest as needed between sets"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("Squat - 0 sets x 5 reps"), None);
    }

    #[test]
    fn test_rejects_metadata_names() {
        assert_eq!(parse("https://example.com/workouts - 3 sets x 10 reps"), None);
        assert_eq!(parse("ENDOBJ123456 3x10"), None);
    }

    #[test]
    fn test_name_filter() {
        assert!(is_valid_exercise_name("Bench Press"));
        assert!(is_valid_exercise_name("Farmer's Walk"));
        assert!(!is_valid_exercise_name("https://example.com/workouts"));
        assert!(!is_valid_exercise_name("ENDOBJ123456"));
        assert!(!is_valid_exercise_name(&"abcdefghij".repeat(4)));
        assert!(!is_valid_exercise_name("ab"));
        assert!(!is_valid_exercise_name(&"Bench ".repeat(10)));
        assert!(!is_valid_exercise_name("x1 2 3"));
        assert!(!is_valid_exercise_name("Row ###"));
        assert!(!is_valid_exercise_name("coach@example"));
        assert!(is_valid_exercise_name("DB ROW"));
    }

    #[test]
    fn test_parse_rest() {
        assert_eq!(parse_rest(Some("2"), None, 90), 120);
        assert_eq!(parse_rest(Some("9"), None, 90), 540);
        assert_eq!(parse_rest(Some("10"), None, 90), 10);
        assert_eq!(parse_rest(Some("90"), Some("sec"), 90), 90);
        assert_eq!(parse_rest(Some("3"), Some("minutes"), 90), 180);
        assert_eq!(parse_rest(Some("30"), Some("s"), 90), 30);
        assert_eq!(parse_rest(Some("0"), None, 90), 90);
        assert_eq!(parse_rest(Some("abc"), None, 90), 90);
        assert_eq!(parse_rest(None, None, 75), 75);
    }

    #[test]
    fn test_parse_section_keeps_order() {
        let body = "Day 1\nSquat 5x5\nnotes: go heavy\nBench Press - 3 sets x 8 reps";
        let entries = parse_section(body, 90);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Bench Press"]);
    }
}
