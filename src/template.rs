//! Template assembly and confidence scoring.
//!
//! [`build`] turns parsed days into a [`StructuredTemplate`] with stable
//! positional ids and inferred equipment. [`score`] computes the additive
//! confidence signals from the days and the raw text they came from:
//!
//! | Signal | Contribution |
//! |--------|--------------|
//! | base | 0.5 |
//! | days | `min(days * 0.1, 0.3)` |
//! | exercises | `min(exercises * 0.02, 0.2)` |
//! | `sets` and `reps` both mentioned | 0.1 |
//! | rest or seconds mentioned | 0.1 |
//! | a `Day N` marker present | 0.1 |
//!
//! The total is clamped to `[0, 1]`. Method-specific ceilings are applied by
//! the pipeline, not here.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::models::{
    ConfidenceBreakdown, StructuredTemplate, TemplateDay, TemplateExercise, WorkoutDay,
};
use crate::tables::{DEFAULT_EQUIPMENT, EQUIPMENT_KEYWORDS};

const BASE: f64 = 0.5;
const PER_DAY: f64 = 0.1;
const MAX_DAYS: f64 = 0.3;
const PER_EXERCISE: f64 = 0.02;
const MAX_EXERCISES: f64 = 0.2;
const KEYWORD_BONUS: f64 = 0.1;

static SETS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsets?\b").unwrap());
static REPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\breps?\b").unwrap());
static REST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\brest\b|\bsec(?:ond)?s?\b|\d+\s*s\b").unwrap());
static DAY_PATTERN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bday\s*#?\s*\d+").unwrap());

/// Assemble a template from parsed days.
pub fn build(name: &str, source_name: &str, days: &[WorkoutDay]) -> StructuredTemplate {
    let id = Uuid::new_v4().to_string();
    let template_days = days
        .iter()
        .enumerate()
        .map(|(d, day)| {
            let day_id = format!("{}:d{}", id, d + 1);
            let exercises = day
                .exercises
                .iter()
                .enumerate()
                .map(|(e, ex)| TemplateExercise {
                    id: format!("{}:e{}", day_id, e + 1),
                    order: e + 1,
                    name: ex.name.clone(),
                    sets: ex.sets,
                    reps: ex.reps.clone(),
                    rest_seconds: ex.rest_seconds,
                    notes: ex.notes.clone(),
                })
                .collect();
            TemplateDay {
                id: day_id,
                day_index: d + 1,
                name: day.name.clone(),
                exercises,
                notes: day.notes.clone(),
            }
        })
        .collect();

    StructuredTemplate {
        id,
        name: name.to_string(),
        source_name: source_name.to_string(),
        days: template_days,
        equipment: infer_equipment(days),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Equipment tags implied by exercise names, in table order.
pub fn infer_equipment(days: &[WorkoutDay]) -> Vec<String> {
    let names: Vec<String> = days
        .iter()
        .flat_map(|d| d.exercises.iter())
        .map(|e| format!("{} ", e.name.to_lowercase()))
        .collect();

    let tags: Vec<String> = EQUIPMENT_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            names
                .iter()
                .any(|name| keywords.iter().any(|kw| name.contains(kw)))
        })
        .map(|(tag, _)| tag.to_string())
        .collect();

    if tags.is_empty() {
        vec![DEFAULT_EQUIPMENT.to_string()]
    } else {
        tags
    }
}

/// Additive confidence signals for `days` parsed out of `raw_text`.
pub fn score(days: &[WorkoutDay], raw_text: &str) -> ConfidenceBreakdown {
    let day_count = days.len();
    let exercise_count: usize = days.iter().map(|d| d.exercises.len()).sum();

    let mut breakdown = ConfidenceBreakdown {
        base: BASE,
        days: (day_count as f64 * PER_DAY).min(MAX_DAYS),
        exercises: (exercise_count as f64 * PER_EXERCISE).min(MAX_EXERCISES),
        sets_and_reps: bonus(SETS_RE.is_match(raw_text) && REPS_RE.is_match(raw_text)),
        rest: bonus(REST_RE.is_match(raw_text)),
        day_pattern: bonus(DAY_PATTERN_RE.is_match(raw_text)),
        cap: None,
        total: 0.0,
    };
    breakdown.total = (breakdown.base
        + breakdown.days
        + breakdown.exercises
        + breakdown.sets_and_reps
        + breakdown.rest
        + breakdown.day_pattern)
        .clamp(0.0, 1.0);
    breakdown
}

/// Apply a method-specific ceiling, remembering it in the breakdown.
pub fn cap(mut breakdown: ConfidenceBreakdown, ceiling: f64) -> ConfidenceBreakdown {
    breakdown.cap = Some(ceiling);
    breakdown.total = breakdown.total.min(ceiling).clamp(0.0, 1.0);
    breakdown
}

fn bonus(present: bool) -> f64 {
    if present {
        KEYWORD_BONUS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseEntry;

    fn entry(name: &str) -> ExerciseEntry {
        ExerciseEntry {
            name: name.to_string(),
            sets: 3,
            reps: "8".to_string(),
            rest_seconds: 90,
            notes: None,
        }
    }

    fn day(name: &str, exercises: &[&str]) -> WorkoutDay {
        WorkoutDay {
            name: name.to_string(),
            exercises: exercises.iter().map(|n| entry(n)).collect(),
            notes: None,
        }
    }

    #[test]
    fn test_build_assigns_positional_ids() {
        let days = vec![
            day("Day 1", &["Bench Press", "Barbell Row"]),
            day("Day 2", &["Squat"]),
        ];
        let t = build("My Plan", "plan.pdf", &days);
        assert!(Uuid::parse_str(&t.id).is_ok());
        assert_eq!(t.days.len(), 2);
        assert_eq!(t.days[0].id, format!("{}:d1", t.id));
        assert_eq!(t.days[0].exercises[1].id, format!("{}:d1:e2", t.id));
        assert_eq!(t.days[0].exercises[1].order, 2);
        assert_eq!(t.days[1].day_index, 2);
        assert_eq!(t.days[1].exercises[0].name, "Squat");
        assert_eq!(t.source_name, "plan.pdf");
        assert!(chrono::DateTime::parse_from_rfc3339(&t.created_at).is_ok());
    }

    #[test]
    fn test_equipment_inference() {
        let days = vec![day(
            "Day 1",
            &["Incline Bench Press", "Lat Pulldown", "Pull-Up", "Hammer Curl"],
        )];
        assert_eq!(
            infer_equipment(&days),
            vec!["barbell", "dumbbell", "bench", "pull_up_bar", "cable"]
        );
    }

    #[test]
    fn test_equipment_defaults_to_general() {
        let days = vec![day("Day 1", &["Plank", "Crunch"])];
        assert_eq!(infer_equipment(&days), vec!["general"]);
        assert_eq!(infer_equipment(&[]), vec!["general"]);
    }

    #[test]
    fn test_score_components() {
        let days = vec![day("Day 1", &["Bench Press"]), day("Day 2", &["Squat"])];
        let raw = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds";
        let b = score(&days, raw);
        assert_eq!(b.base, 0.5);
        assert!((b.days - 0.2).abs() < 1e-9);
        assert!((b.exercises - 0.04).abs() < 1e-9);
        assert_eq!(b.sets_and_reps, 0.1);
        assert_eq!(b.rest, 0.1);
        assert_eq!(b.day_pattern, 0.1);
        assert!((b.total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_without_keywords() {
        let days = vec![day("Day 1", &["Squat"])];
        let b = score(&days, "squat heavy");
        assert!((b.total - 0.62).abs() < 1e-9);
        assert_eq!(b.cap, None);
    }

    #[test]
    fn test_score_is_clamped() {
        let many: Vec<&str> = vec!["Squat"; 40];
        let days: Vec<WorkoutDay> = (0..10).map(|i| day(&format!("Day {}", i), &many)).collect();
        let b = score(&days, "Day 1 sets reps rest");
        assert_eq!(b.days, 0.3);
        assert_eq!(b.exercises, 0.2);
        assert_eq!(b.total, 1.0);
    }

    #[test]
    fn test_score_monotone_in_counts() {
        let raw = "Day 1 notes";
        let mut prev = 0.0;
        for n in 0..8 {
            let days: Vec<WorkoutDay> = (0..n).map(|_| day("Day", &["Squat", "Deadlift"])).collect();
            let total = score(&days, raw).total;
            assert!(total >= prev);
            prev = total;
        }
    }

    #[test]
    fn test_cap_records_ceiling() {
        let days = vec![day("Day 1", &["Squat"]); 3];
        let capped = cap(score(&days, "Day 1 sets reps rest"), 0.9);
        assert_eq!(capped.cap, Some(0.9));
        assert!((capped.total - 0.9).abs() < 1e-9);
    }
}
