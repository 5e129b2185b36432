//! Day segmentation.
//!
//! Splits cleaned text into per-day [`DaySection`]s. Strategies run in
//! priority order and the first acceptable split wins:
//!
//! 1. `day_number`: lines starting with `Day 3`, `Day #3`, `Day three`
//! 2. `weekday`: lines starting with a weekday name
//! 3. `workout_type`: heading lines such as `Push Day`, `Upper Body:`, `Workout A`
//! 4. `week_day`: lines starting with `Week 2 Day 1`
//! 5. `cued_paragraphs`: blank-line paragraphs that mention sets/reps or `NxR`
//!
//! A split is acceptable when it has more than one section and every section
//! is either longer than `min_section_chars` or carries a quantitative cue.
//! Text before the first marker is preamble and is dropped. If nothing is
//! acceptable, the whole text becomes a single section.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PipelineSettings;
use crate::models::DaySection;
use crate::strategy::{first_success, Outcome, Strategy, StrategyError, Trace};

const STAGE: &str = "segment";

/// Lines scanned for a label at the top of each section.
const LABEL_SCAN_LINES: usize = 3;

/// Longest line still treated as a heading.
const MAX_LABEL_CHARS: usize = 60;

static DAY_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*day\s*#?\s*(?:\d+|one|two|three|four|five|six|seven)\b").unwrap()
});

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b").unwrap()
});

static WORKOUT_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*(?:push|pull|legs?|upper(?:\s+body)?|lower(?:\s+body)?|full[\s-]*body|workout)",
        r"(?:\s+(?:day|workout|session))?(?:\s+(?:[ab]|\d))?\s*(?:$|:|\s[-–]\s|\()",
    ))
    .unwrap()
});

static WEEK_DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*week\s*\d+\s*[,:/\-–]?\s*day\s*\d+").unwrap());

/// Quantitative exercise cue: `sets`, `reps`, or `3 x 8`.
static CUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsets?\b|\breps?\b|\d+\s*[x×]\s*\d+").unwrap());

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:day\s*#?\s*\d+|day\s+(?:one|two|three|four|five|six|seven)|week\s*\d+",
        r"|monday|tuesday|wednesday|thursday|friday|saturday|sunday",
        r"|push|pull|legs?|upper|lower|full\s*body|workout\s+[a-z0-9]",
        r"|chest|back|shoulders?|arms?|biceps|triceps|glutes|core|abs|cardio|conditioning)\b",
    ))
    .unwrap()
});

/// True when `text` mentions sets, reps, or an `NxR` prescription.
pub fn has_exercise_cue(text: &str) -> bool {
    CUE_RE.is_match(text)
}

/// Split `text` into day sections.
pub fn segment(text: &str, settings: &PipelineSettings, trace: &mut Trace) -> Vec<DaySection> {
    let min_chars = settings.min_section_chars;
    let day_number = MarkerSplit {
        name: "day_number",
        marker: &DAY_NUMBER_RE,
        headings_only: false,
        min_chars,
    };
    let weekday = MarkerSplit {
        name: "weekday",
        marker: &WEEKDAY_RE,
        headings_only: false,
        min_chars,
    };
    let workout_type = MarkerSplit {
        name: "workout_type",
        marker: &WORKOUT_TYPE_RE,
        headings_only: true,
        min_chars,
    };
    let week_day = MarkerSplit {
        name: "week_day",
        marker: &WEEK_DAY_RE,
        headings_only: false,
        min_chars,
    };
    let paragraphs = CuedParagraphs { min_chars };
    let chain: [&dyn Strategy<str, Vec<String>>; 5] =
        [&day_number, &weekday, &workout_type, &week_day, &paragraphs];

    let bodies = match first_success(STAGE, &chain, text, trace) {
        Some((_, bodies)) => bodies,
        None => {
            trace.record(STAGE, "single_section", Outcome::Accepted, None);
            vec![text.trim().to_string()]
        }
    };

    let sections: Vec<DaySection> = bodies
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let index = i + 1;
            DaySection {
                index,
                label: derive_label(&body, index),
                body,
            }
        })
        .collect();
    tracing::debug!(sections = sections.len(), "segmented");
    sections
}

/// More than one section, and every section is long or carries a cue.
fn check_acceptable(sections: &[String], min_chars: usize) -> Result<(), StrategyError> {
    if sections.len() < 2 {
        return Err(StrategyError::Insufficient(format!(
            "{} section(s), need at least 2",
            sections.len()
        )));
    }
    if let Some(short) = sections
        .iter()
        .position(|s| s.chars().count() <= min_chars && !has_exercise_cue(s))
    {
        return Err(StrategyError::Insufficient(format!(
            "section {} is shorter than {} chars and has no exercise cue",
            short + 1,
            min_chars
        )));
    }
    Ok(())
}

/// Split wherever a line matches `marker`.
struct MarkerSplit {
    name: &'static str,
    marker: &'static Lazy<Regex>,
    /// Ignore marker lines that themselves look like exercise prescriptions.
    headings_only: bool,
    min_chars: usize,
}

impl Strategy<str, Vec<String>> for MarkerSplit {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, text: &str) -> Result<Vec<String>, StrategyError> {
        let mut sections: Vec<Vec<&str>> = Vec::new();
        for line in text.lines() {
            let is_marker =
                self.marker.is_match(line) && !(self.headings_only && has_exercise_cue(line));
            if is_marker {
                sections.push(vec![line]);
            } else if let Some(current) = sections.last_mut() {
                current.push(line);
            }
        }
        if sections.is_empty() {
            return Err(StrategyError::NotApplicable("no marker lines".to_string()));
        }
        let sections: Vec<String> = sections
            .into_iter()
            .map(|lines| lines.join("\n").trim().to_string())
            .collect();
        check_acceptable(&sections, self.min_chars)?;
        Ok(sections)
    }
}

/// Blank-line paragraphs that carry exercise cues.
struct CuedParagraphs {
    min_chars: usize,
}

impl Strategy<str, Vec<String>> for CuedParagraphs {
    fn name(&self) -> &'static str {
        "cued_paragraphs"
    }

    fn attempt(&self, text: &str) -> Result<Vec<String>, StrategyError> {
        let sections: Vec<String> = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty() && has_exercise_cue(p))
            .map(str::to_string)
            .collect();
        check_acceptable(&sections, self.min_chars)?;
        Ok(sections)
    }
}

/// Label from the first heading-like line near the top, else `Day {index}`.
fn derive_label(body: &str, index: usize) -> String {
    body.lines()
        .take(LABEL_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && line.chars().count() <= MAX_LABEL_CHARS
                && !has_exercise_cue(line)
                && LABEL_RE.is_match(line)
        })
        .map(|line| {
            line.trim_end_matches(|c: char| c == ':' || c == '-' || c == '–' || c.is_whitespace())
                .to_string()
        })
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| format!("Day {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> (Vec<DaySection>, Trace) {
        let mut trace = Trace::new();
        let sections = segment(text, &PipelineSettings::default(), &mut trace);
        (sections, trace)
    }

    fn winner(trace: &Trace) -> String {
        trace
            .steps()
            .iter()
            .find(|s| s.outcome == Outcome::Accepted)
            .map(|s| s.strategy.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_two_short_cued_days() {
        let text = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\nDay 2\nSquat - 4 sets x 5 reps - Rest 120 seconds";
        let (sections, trace) = run(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label, "Day 1");
        assert_eq!(sections[1].label, "Day 2");
        assert!(sections[1].body.contains("Squat"));
        assert_eq!(winner(&trace), "day_number");
    }

    #[test]
    fn test_preamble_is_dropped() {
        let text = "My Program\nby Coach\nDay 1\nSquat 5x5\nDay 2\nBench 5x5";
        let (sections, _) = run(text);
        assert_eq!(sections.len(), 2);
        assert!(!sections[0].body.contains("Coach"));
    }

    #[test]
    fn test_short_uncued_sections_are_rejected() {
        // "Day 1 of your journey" style prose should not split
        let text = "Day 1 of your journey starts here\nDay 2 keeps going";
        let (sections, trace) = run(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(winner(&trace), "single_section");
        assert_eq!(sections[0].label, "Day 1 of your journey starts here");
    }

    #[test]
    fn test_weekdays() {
        let text = "Monday\nSquat 5x5\nDeadlift 1x5\nThursday:\nBench 5x5\nRow 5x5";
        let (sections, trace) = run(text);
        assert_eq!(winner(&trace), "weekday");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].label, "Thursday");
    }

    #[test]
    fn test_workout_type_ignores_exercise_lines() {
        let text = "Push Day\nBench Press 4x8\nPull-ups 3x10\nPull Day:\nBarbell Row 4x8\nLegs\nLeg Press 3x12";
        let (sections, trace) = run(text);
        assert_eq!(winner(&trace), "workout_type");
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].label, "Push Day");
        assert!(sections[0].body.contains("Pull-ups"));
        assert_eq!(sections[1].label, "Pull Day");
        assert_eq!(sections[2].label, "Legs");
    }

    #[test]
    fn test_week_day_markers() {
        let text = "Week 1 Day 1\nSquat 5x5\nWeek 1 Day 2\nBench 5x5";
        let (sections, trace) = run(text);
        assert_eq!(winner(&trace), "week_day");
        assert_eq!(sections[0].label, "Week 1 Day 1");
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn test_cued_paragraphs() {
        let text = "Intro words here.\n\nSquat 5x5\nBench 5x5\n\nSome thoughts.\n\nDeadlift 1x5\nRow 3 sets of 8";
        let (sections, trace) = run(text);
        assert_eq!(winner(&trace), "cued_paragraphs");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].label, "Day 1");
        assert_eq!(sections[1].label, "Day 2");
    }

    #[test]
    fn test_single_section_fallback_label() {
        let (sections, _) = run("Squat 5x5\nBench 5x5");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].label, "Day 1");
        assert_eq!(sections[0].index, 1);
    }
}
