//! Static heuristic tables.
//!
//! Everything the pipeline "knows" about training programs lives here as
//! plain data: the exercise dictionary, equipment keywords, the stoplist for
//! the last-resort token scan, classifier keyword groups, and the canned
//! program skeletons used when only a file name is available. Control flow
//! lives in the modules that consume these tables.

use crate::models::FormatTag;

/// Canonical exercise names recognized by the vocabulary fallback.
///
/// Matching is case-insensitive and whole-word; spaces match any run of
/// whitespace or a hyphen.
pub const EXERCISE_DICTIONARY: &[&str] = &[
    "Bench Press",
    "Incline Bench Press",
    "Decline Bench Press",
    "Close-Grip Bench Press",
    "Dumbbell Bench Press",
    "Dumbbell Press",
    "Overhead Press",
    "Military Press",
    "Shoulder Press",
    "Push Press",
    "Squat",
    "Back Squat",
    "Front Squat",
    "Goblet Squat",
    "Split Squat",
    "Bulgarian Split Squat",
    "Deadlift",
    "Romanian Deadlift",
    "Sumo Deadlift",
    "Stiff-Leg Deadlift",
    "Barbell Row",
    "Bent Over Row",
    "Pendlay Row",
    "Dumbbell Row",
    "Seated Cable Row",
    "Cable Row",
    "Pull-Up",
    "Chin-Up",
    "Lat Pulldown",
    "Push-Up",
    "Dip",
    "Lunge",
    "Walking Lunge",
    "Leg Press",
    "Leg Extension",
    "Leg Curl",
    "Hamstring Curl",
    "Calf Raise",
    "Hip Thrust",
    "Glute Bridge",
    "Bicep Curl",
    "Barbell Curl",
    "Hammer Curl",
    "Preacher Curl",
    "Tricep Extension",
    "Tricep Pushdown",
    "Skull Crusher",
    "Lateral Raise",
    "Front Raise",
    "Rear Delt Fly",
    "Face Pull",
    "Chest Fly",
    "Cable Crossover",
    "Shrug",
    "Plank",
    "Crunch",
    "Hanging Leg Raise",
    "Russian Twist",
    "Power Clean",
    "Clean and Jerk",
    "Snatch",
    "Kettlebell Swing",
    "Farmer's Walk",
    "Good Morning",
    "Hyperextension",
];

/// Equipment tags and the exercise-name keywords that imply them.
pub const EQUIPMENT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "barbell",
        &[
            "barbell",
            "bench press",
            "squat",
            "deadlift",
            "overhead press",
            "military press",
            "push press",
            "pendlay",
            "bent over row",
            "power clean",
            "clean and jerk",
            "snatch",
            "good morning",
            "hip thrust",
        ],
    ),
    (
        "dumbbell",
        &[
            "dumbbell",
            "db ",
            "goblet",
            "hammer curl",
            "lateral raise",
            "front raise",
            "fly",
            "farmer",
        ],
    ),
    (
        "bench",
        &["bench", "incline", "decline", "preacher", "skull crusher"],
    ),
    (
        "pull_up_bar",
        &[
            "pull-up",
            "pull up",
            "pullup",
            "chin-up",
            "chin up",
            "chinup",
            "hanging",
        ],
    ),
    (
        "cable",
        &[
            "cable",
            "pulldown",
            "pushdown",
            "face pull",
            "crossover",
            "seated row",
        ],
    ),
];

/// Tag used when no equipment keyword matches.
pub const DEFAULT_EQUIPMENT: &str = "general";

/// Words the token scan must never report as exercises.
pub const STOPLIST: &[&str] = &[
    // common English
    "about", "above", "after", "again", "against", "also", "always", "because", "been",
    "before", "being", "below", "between", "both", "but", "came", "come", "could", "does",
    "doing", "done", "down", "during", "each", "even", "every", "from", "further", "have",
    "having", "here", "into", "just", "like", "make", "many", "more", "most", "much", "must",
    "never", "next", "only", "other", "over", "same", "should", "some", "such", "than",
    "that", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "under", "until", "very", "want", "well", "were", "what", "when", "where", "which",
    "while", "will", "with", "within", "without", "would", "your", "yours", "yourself",
    "page", "pages", "copyright", "reserved", "rights", "version", "document", "untitled",
    // fitness filler
    "sets", "reps", "rest", "seconds", "second", "minutes", "minute", "week", "weeks",
    "day", "days", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
    "sunday", "workout", "workouts", "training", "program", "programme", "routine",
    "exercise", "exercises", "warm", "warmup", "cooldown", "cool", "notes", "note",
    "weight", "weights", "heavy", "light", "moderate", "intensity", "volume", "total",
    "phase", "block", "cycle", "deload", "progression", "increase", "decrease", "load",
    "repeat", "perform", "complete", "focus", "optional", "superset", "circuit", "round",
    "rounds", "tempo", "failure", "effort", "body", "upper", "lower", "full", "split",
    "push", "pull", "legs", "strength", "hypertrophy", "endurance", "beginner",
    "intermediate", "advanced", "level", "goal", "goals", "schedule", "plan",
];

/// Ordered classifier groups; the first pattern that matches names the format.
pub const FORMAT_GROUPS: &[(FormatTag, &str)] = &[
    (
        FormatTag::WeekAndDay,
        r"(?im)^\s*week\s*\d+\s*[,:/\-–]?\s*day\s*\d+",
    ),
    (FormatTag::NumberedDays, r"(?im)^\s*day\s*#?\s*\d+\b"),
    (
        FormatTag::Weekdays,
        r"(?im)^\s*(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    ),
    (
        FormatTag::PushPullLegs,
        r"(?i)\bpush\b[\s\S]*\bpull\b[\s\S]*\blegs?\b",
    ),
    (
        FormatTag::UpperLower,
        r"(?i)\bupper(?:\s+body)?\b[\s\S]*\blower(?:\s+body)?\b",
    ),
    (FormatTag::FullBody, r"(?i)\bfull[\s-]*body\b"),
    (
        FormatTag::KnownProgram,
        r"(?i)\b(?:stronglifts|starting\s+strength|5\s*/\s*3\s*/\s*1|wendler|gzcl|texas\s+method|madcow|nsuns|greyskull)\b",
    ),
    (FormatTag::Table, r"(?m)^[^|\n]+\|\s*\d+\s*\|"),
];

/// One prescription inside a [`ProgramSkeleton`] day: name, sets, reps, rest seconds.
pub type SkeletonExercise = (&'static str, u32, &'static str, u32);

/// Canned multi-day program synthesized from a file name.
#[derive(Debug)]
pub struct ProgramSkeleton {
    pub key: &'static str,
    /// Lower-case file-name fragments that select this skeleton.
    pub keywords: &'static [&'static str],
    pub days: &'static [(&'static str, &'static [SkeletonExercise])],
}

/// Skeletons in priority order. The last entry is the generic split.
pub const PROGRAM_SKELETONS: &[ProgramSkeleton] = &[
    ProgramSkeleton {
        key: "bench",
        keywords: &["bench"],
        days: &[
            (
                "Heavy Bench",
                &[
                    ("Bench Press", 5, "5", 180),
                    ("Close-Grip Bench Press", 3, "6-8", 120),
                    ("Barbell Row", 4, "8", 120),
                    ("Tricep Pushdown", 3, "10-12", 60),
                ],
            ),
            (
                "Lower Body",
                &[
                    ("Squat", 4, "6", 180),
                    ("Romanian Deadlift", 3, "8", 120),
                    ("Leg Press", 3, "10", 90),
                    ("Calf Raise", 3, "12-15", 60),
                ],
            ),
            (
                "Volume Bench",
                &[
                    ("Incline Bench Press", 4, "8-10", 120),
                    ("Dumbbell Bench Press", 3, "10-12", 90),
                    ("Overhead Press", 3, "8", 120),
                    ("Lat Pulldown", 3, "10-12", 90),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "stronglifts",
        keywords: &["5x5", "stronglifts", "strong_lifts", "strong-lifts"],
        days: &[
            (
                "Workout A",
                &[
                    ("Squat", 5, "5", 180),
                    ("Bench Press", 5, "5", 180),
                    ("Barbell Row", 5, "5", 180),
                ],
            ),
            (
                "Workout B",
                &[
                    ("Squat", 5, "5", 180),
                    ("Overhead Press", 5, "5", 180),
                    ("Deadlift", 1, "5", 180),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "starting_strength",
        keywords: &["starting strength", "starting_strength", "startingstrength", "starting-strength"],
        days: &[
            (
                "Workout A",
                &[
                    ("Squat", 3, "5", 180),
                    ("Bench Press", 3, "5", 180),
                    ("Deadlift", 1, "5", 180),
                ],
            ),
            (
                "Workout B",
                &[
                    ("Squat", 3, "5", 180),
                    ("Overhead Press", 3, "5", 180),
                    ("Power Clean", 5, "3", 150),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "531",
        keywords: &["531", "5-3-1", "5_3_1", "wendler"],
        days: &[
            (
                "Press Day",
                &[
                    ("Overhead Press", 3, "5", 180),
                    ("Chin-Up", 5, "10", 90),
                    ("Dip", 5, "15", 90),
                ],
            ),
            (
                "Deadlift Day",
                &[
                    ("Deadlift", 3, "5", 180),
                    ("Good Morning", 5, "12", 90),
                    ("Hanging Leg Raise", 5, "15", 60),
                ],
            ),
            (
                "Bench Day",
                &[
                    ("Bench Press", 3, "5", 180),
                    ("Dumbbell Row", 5, "10", 90),
                    ("Tricep Extension", 5, "12", 60),
                ],
            ),
            (
                "Squat Day",
                &[
                    ("Squat", 3, "5", 180),
                    ("Leg Press", 5, "15", 90),
                    ("Leg Curl", 5, "10", 60),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "ppl",
        keywords: &["ppl", "push pull legs", "push_pull_legs", "push-pull-legs", "pushpulllegs"],
        days: &[
            (
                "Push",
                &[
                    ("Bench Press", 4, "6-8", 150),
                    ("Overhead Press", 3, "8-10", 120),
                    ("Lateral Raise", 3, "12-15", 60),
                    ("Tricep Pushdown", 3, "10-12", 60),
                ],
            ),
            (
                "Pull",
                &[
                    ("Deadlift", 3, "5", 180),
                    ("Pull-Up", 3, "8-10", 120),
                    ("Barbell Row", 3, "8-10", 120),
                    ("Bicep Curl", 3, "10-12", 60),
                ],
            ),
            (
                "Legs",
                &[
                    ("Squat", 4, "6-8", 180),
                    ("Romanian Deadlift", 3, "8-10", 120),
                    ("Leg Press", 3, "10-12", 90),
                    ("Calf Raise", 4, "12-15", 60),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "gzcl",
        keywords: &["gzcl", "gzclp"],
        days: &[
            (
                "Day A1",
                &[
                    ("Squat", 5, "3", 180),
                    ("Bench Press", 3, "10", 120),
                    ("Lat Pulldown", 3, "15", 60),
                ],
            ),
            (
                "Day B1",
                &[
                    ("Overhead Press", 5, "3", 180),
                    ("Deadlift", 3, "10", 120),
                    ("Dumbbell Row", 3, "15", 60),
                ],
            ),
        ],
    },
    ProgramSkeleton {
        key: "upper_lower",
        keywords: &[
            "workout",
            "program",
            "programme",
            "training",
            "routine",
            "split",
            "gym",
            "plan",
            "lift",
            "strength",
            "hypertrophy",
            "upper",
            "lower",
        ],
        days: &[
            (
                "Upper Body",
                &[
                    ("Bench Press", 4, "6-8", 120),
                    ("Barbell Row", 4, "6-8", 120),
                    ("Overhead Press", 3, "8-10", 90),
                    ("Lat Pulldown", 3, "10-12", 90),
                ],
            ),
            (
                "Lower Body",
                &[
                    ("Squat", 4, "6-8", 150),
                    ("Romanian Deadlift", 3, "8-10", 120),
                    ("Leg Press", 3, "10-12", 90),
                    ("Calf Raise", 3, "12-15", 60),
                ],
            ),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_format_groups_compile() {
        for (tag, pattern) in FORMAT_GROUPS {
            assert!(Regex::new(pattern).is_ok(), "bad pattern for {:?}", tag);
        }
    }

    #[test]
    fn test_dictionary_has_no_duplicates() {
        let mut seen = HashSet::new();
        for name in EXERCISE_DICTIONARY {
            assert!(seen.insert(name.to_lowercase()), "duplicate: {}", name);
        }
    }

    #[test]
    fn test_stoplist_is_lowercase() {
        for word in STOPLIST {
            assert_eq!(*word, word.to_lowercase());
        }
    }

    #[test]
    fn test_skeleton_keys_unique_and_nonempty() {
        let mut keys = HashSet::new();
        for skeleton in PROGRAM_SKELETONS {
            assert!(keys.insert(skeleton.key));
            assert!(skeleton.days.len() > 1, "{} needs several days", skeleton.key);
            for (_, exercises) in skeleton.days {
                assert!(!exercises.is_empty());
                for (_, sets, _, rest) in *exercises {
                    assert!(*sets > 0 && *rest > 0);
                }
            }
        }
    }
}
