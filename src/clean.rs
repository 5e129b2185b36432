//! Text cleaning: strip binary and metadata noise from extracted text.
//!
//! Rules run in a fixed order because later rules assume the earlier ones
//! already removed gross structure (control bytes, URLs, PDF object syntax):
//!
//! 1. normalize line endings, tabs and NBSP
//! 2. strip control characters and U+FFFD
//! 3. strip URL-like substrings
//! 4. strip PDF object markers (`12 0 obj`, `endstream`, `/FlateDecode`, ...)
//! 5. strip long CamelCase / ALL-CAPS runs (embedded metadata keys)
//! 6. strip tokens of 30+ characters (encoded data)
//! 7. collapse whitespace, keeping line structure
//!
//! Line breaks survive cleaning; the segmenter depends on them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Tokens at least this long are treated as encoded data.
pub const LONG_TOKEN_CHARS: usize = 30;

/// Below this many characters a text is too short to salvage.
const GARBAGE_MIN_CHARS: usize = 20;

/// Minimum share of printable characters for a text to be worth scanning.
const GARBAGE_MIN_PRINTABLE_RATIO: f64 = 0.5;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|ftp://|www\.)\S+").unwrap());

static PDF_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b\d+\s+\d+\s+obj\b|\bendobj\b|\bendstream\b|\bstream\b|\bstartxref\b|\bxref\b|\btrailer\b",
        r"|%%EOF|%PDF-\d\.\d|\b\d+ \d+ R\b",
        r"|/(?:Type|Subtype|Font|BaseFont|Filter|FlateDecode|DCTDecode|Length\d?|Producer|Creator",
        r"|CreationDate|ModDate|Contents|Resources|MediaBox|CropBox|Parent|Kids|Count|Catalog",
        r"|Pages|Page|Root|Info|Size|XObject|ProcSet|Encoding|Annots|Metadata|ExtGState|Widths",
        r"|FirstChar|LastChar|FontDescriptor|DecodeParms|ObjStm|XRef|Prev|ID)\b",
    ))
    .unwrap()
});

static CAMEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z][a-z0-9]*(?:[A-Z][a-z0-9]+)+\b").unwrap());

static ALL_CAPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9_]{10,}\b").unwrap());

static LONG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\S{{{},}}", LONG_TOKEN_CHARS)).unwrap());

/// Clean `text` until no rule changes it any more.
///
/// After the first pass every rule only deletes text or replaces a match of
/// two or more characters with one space, so the loop terminates; the result
/// is a fixed point, which makes `clean` idempotent.
pub fn clean(text: &str) -> String {
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let normalized: String = text
        .replace("\r\n", "\n")
        .chars()
        .filter_map(|c| match c {
            '\r' => Some('\n'),
            '\t' | '\u{00A0}' => Some(' '),
            '\n' => Some('\n'),
            '\u{FFFD}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let s = URL_RE.replace_all(&normalized, " ");
    let s = PDF_MARKER_RE.replace_all(&s, " ");
    let s = CAMEL_RE.replace_all(&s, |caps: &Captures| {
        let token = &caps[0];
        if is_metadata_camel_case(token) {
            " ".to_string()
        } else {
            token.to_string()
        }
    });
    let s = ALL_CAPS_RE.replace_all(&s, " ");
    let s = LONG_TOKEN_RE.replace_all(&s, " ");
    collapse_whitespace(&s)
}

/// CamelCase keys like `CreationDate` or `PdfProducerName`, but not short
/// compounds a human might write (`BenchPress`).
fn is_metadata_camel_case(token: &str) -> bool {
    let humps = token.chars().filter(|c| c.is_ascii_uppercase()).count()
        + usize::from(token.starts_with(|c: char| c.is_ascii_lowercase()));
    humps >= 3 || (humps >= 2 && token.len() >= 12)
}

/// Collapse runs of whitespace within lines, trim lines, and keep at most one
/// blank line between paragraphs.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(&collapsed);
    }
    out
}

/// True when `text` is too short or too binary to be worth pattern matching.
///
/// The printable-ratio rule only matters for raw text. [`clean`] strips every
/// unprintable character, so on cleaned text only the length rule can fire.
pub fn is_garbage(text: &str) -> bool {
    let total = text.chars().count();
    if text.trim().chars().count() < GARBAGE_MIN_CHARS {
        return true;
    }
    let printable = text.chars().filter(|c| is_printable(*c)).count();
    (printable as f64 / total as f64) < GARBAGE_MIN_PRINTABLE_RATIO
}

pub(crate) fn is_printable(c: char) -> bool {
    match c {
        '\n' | '\r' | '\t' => true,
        '\u{FFFD}' => false,
        c => !c.is_control(),
    }
}
