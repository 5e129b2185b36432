//! Format classification.
//!
//! Guesses how a document organizes its days from the keyword groups in
//! [`FORMAT_GROUPS`]. The tag is reported in the debug trace and logs only;
//! segmentation tries every strategy regardless.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::FormatTag;
use crate::tables::FORMAT_GROUPS;

static COMPILED_GROUPS: Lazy<Vec<(FormatTag, Regex)>> = Lazy::new(|| {
    FORMAT_GROUPS
        .iter()
        .filter_map(|(tag, pattern)| Regex::new(pattern).ok().map(|re| (*tag, re)))
        .collect()
});

/// First matching format group, or [`FormatTag::Generic`].
pub fn classify(text: &str) -> FormatTag {
    COMPILED_GROUPS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(tag, _)| *tag)
        .unwrap_or(FormatTag::Generic)
}
