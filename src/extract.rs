//! Text extraction from raw document bytes.
//!
//! Extraction never fails. It walks an ordered chain of tiers and keeps the
//! first one that yields usable text (at least `min_text_chars` characters
//! after cleaning):
//!
//! | Tier | Input it handles |
//! |------|------------------|
//! | [`PdfTextObjects`] | PDF files, decoded page by page with `pdf-extract` |
//! | [`OoxmlDocument`] | `.docx` (ZIP with `word/document.xml`) |
//! | [`RawBytes`] | anything; salvages string runs from binary markup |
//! | [`FilenameSkeleton`] | nothing but the file name |
//!
//! Runs salvaged from binary markup must also carry an exercise signal (a
//! parseable exercise line or a known exercise name). Compressed streams and
//! random bytes yield letter noise that would otherwise pass the length check.
//!
//! When every tier declines, the result is empty text tagged
//! [`TextSource::None`]; the pipeline turns that into a manual-entry result.

use std::io::Read;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::clean::{clean, is_printable};
use crate::config::PipelineSettings;
use crate::line::parse_line;
use crate::models::{ExtractedText, SourceDocument, TextSource};
use crate::strategy::{first_success, Strategy, StrategyError, Trace};
use crate::tables::{ProgramSkeleton, PROGRAM_SKELETONS};
use crate::vocabulary::has_dictionary_hit;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// How far into the file to look for a `%PDF` header.
const PDF_HEADER_WINDOW: usize = 1024;

/// Above this share of non-printable characters, raw text is treated as binary markup.
const BINARY_MARKUP_RATIO: f64 = 0.3;

const STAGE: &str = "extract";

/// Run the extraction chain over `doc`.
pub fn extract(doc: &SourceDocument, settings: &PipelineSettings, trace: &mut Trace) -> ExtractedText {
    let pdf = PdfTextObjects {
        min_chars: settings.min_text_chars,
    };
    let ooxml = OoxmlDocument {
        min_chars: settings.min_text_chars,
    };
    let raw = RawBytes {
        min_chars: settings.min_text_chars,
    };
    let skeleton = FilenameSkeleton;
    let chain: [&dyn Strategy<SourceDocument, (TextSource, String)>; 4] =
        [&pdf, &ooxml, &raw, &skeleton];

    let before = trace.steps().len();
    let winner = first_success(STAGE, &chain, doc, trace);

    let warnings: Vec<String> = trace.steps()[before..]
        .iter()
        .filter(|step| {
            step.detail
                .as_deref()
                .is_some_and(|d| !d.starts_with("not applicable"))
        })
        .map(|step| {
            format!(
                "{} extraction failed: {}",
                step.strategy,
                step.detail.as_deref().unwrap_or_default()
            )
        })
        .collect();
    for w in &warnings {
        tracing::warn!(document = %doc.name, "{}", w);
    }

    match winner {
        Some((name, (source, content))) => {
            tracing::info!(document = %doc.name, tier = name, chars = content.len(), "text extracted");
            ExtractedText {
                content,
                source,
                warnings,
            }
        }
        None => {
            tracing::warn!(document = %doc.name, "no extraction tier produced text");
            ExtractedText {
                content: String::new(),
                source: TextSource::None,
                warnings,
            }
        }
    }
}

fn require_usable(text: String, min_chars: usize) -> Result<String, StrategyError> {
    let usable = clean(&text).chars().count();
    if usable < min_chars {
        return Err(StrategyError::Insufficient(format!(
            "{} usable chars, need {}",
            usable, min_chars
        )));
    }
    Ok(text)
}

// ============ PDF ============

/// Primary tier: decode the PDF's text objects page by page.
pub struct PdfTextObjects {
    pub min_chars: usize,
}

impl Strategy<SourceDocument, (TextSource, String)> for PdfTextObjects {
    fn name(&self) -> &'static str {
        "pdf_text_objects"
    }

    fn attempt(&self, doc: &SourceDocument) -> Result<(TextSource, String), StrategyError> {
        if !looks_like_pdf(&doc.bytes) {
            return Err(StrategyError::NotApplicable("no %PDF header".to_string()));
        }
        let bytes = doc.bytes.as_slice();
        // pdf-extract panics on some malformed inputs; a panic is just another failed tier here.
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| StrategyError::Failed("PDF decoder panicked".to_string()))?
        .map_err(|e| StrategyError::Failed(e.to_string()))?;

        let text = pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        require_usable(text, self.min_chars).map(|t| (TextSource::PdfTextObjects, t))
    }
}

fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(4).any(|w| w == b"%PDF")
}

// ============ OOXML ============

/// Word documents: the `<w:t>` runs of `word/document.xml`, one line per paragraph.
pub struct OoxmlDocument {
    pub min_chars: usize,
}

impl Strategy<SourceDocument, (TextSource, String)> for OoxmlDocument {
    fn name(&self) -> &'static str {
        "ooxml_document"
    }

    fn attempt(&self, doc: &SourceDocument) -> Result<(TextSource, String), StrategyError> {
        if !doc.bytes.starts_with(b"PK\x03\x04") {
            return Err(StrategyError::NotApplicable("not a ZIP container".to_string()));
        }
        let xml = read_docx_body(&doc.bytes)?;
        let text = extract_paragraph_text(&xml)?;
        require_usable(text, self.min_chars).map(|t| (TextSource::OoxmlDocument, t))
    }
}

fn read_docx_body(bytes: &[u8]) -> Result<Vec<u8>, StrategyError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| StrategyError::Failed(e.to_string()))?;
    let entry = archive.by_name("word/document.xml").map_err(|_| {
        StrategyError::NotApplicable("word/document.xml not found".to_string())
    })?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| StrategyError::Failed(e.to_string()))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(StrategyError::Failed(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }
    Ok(out)
}

fn extract_paragraph_text(xml: &[u8]) -> Result<String, StrategyError> {
    use quick_xml::events::Event;

    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(te)) if in_text => {
                out.push_str(te.unescape().unwrap_or_default().as_ref());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tab" => out.push(' '),
            Ok(Event::Eof) => break,
            Err(e) => return Err(StrategyError::Failed(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

// ============ Raw bytes ============

static MARKUP_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%PDF|\bendobj\b|\bendstream\b|\b\d+ \d+ obj\b").unwrap());

/// String runs inside binary markup: `(literal)`, `<hex>`, `<text>`, `[text]`.
static DELIMITED_RUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\(((?:[^()\\]|\\.){1,400})\)",
        r"|<([0-9A-Fa-f\s]{4,800})>",
        r"|<([^<>\n]{3,200})>",
        r"|\[([^\[\]()\n]{3,200})\]",
    ))
    .unwrap()
});

static LETTERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]").unwrap());

/// Reinterpret the file as text; dig human-readable runs out of binary markup.
pub struct RawBytes {
    pub min_chars: usize,
}

impl Strategy<SourceDocument, (TextSource, String)> for RawBytes {
    fn name(&self) -> &'static str {
        "raw_bytes"
    }

    fn attempt(&self, doc: &SourceDocument) -> Result<(TextSource, String), StrategyError> {
        if doc.bytes.is_empty() {
            return Err(StrategyError::Insufficient("document is empty".to_string()));
        }
        let text = String::from_utf8_lossy(&doc.bytes);
        if !looks_like_binary_markup(&text) {
            return require_usable(text.into_owned(), self.min_chars)
                .map(|t| (TextSource::RawBytes, t));
        }
        let salvaged = require_usable(salvage_delimited_runs(&text), self.min_chars)?;
        require_exercise_signal(salvaged).map(|t| (TextSource::RawBytes, t))
    }
}

fn require_exercise_signal(text: String) -> Result<String, StrategyError> {
    let cleaned = clean(&text);
    // Rest is irrelevant here; only whether some line parses.
    let parses = cleaned.lines().any(|line| parse_line(line, 0).is_some());
    if parses || has_dictionary_hit(&cleaned) {
        Ok(text)
    } else {
        Err(StrategyError::Insufficient(
            "salvaged runs carry no exercise signal".to_string(),
        ))
    }
}

fn looks_like_binary_markup(text: &str) -> bool {
    if MARKUP_HINT_RE.is_match(text) {
        return true;
    }
    let total = text.chars().count().max(1);
    let unprintable = text.chars().filter(|c| !is_printable(*c)).count();
    unprintable as f64 / total as f64 > BINARY_MARKUP_RATIO
}

/// Collect delimited string runs in document order, one per line.
pub(crate) fn salvage_delimited_runs(text: &str) -> String {
    let mut runs = Vec::new();
    for caps in DELIMITED_RUN_RE.captures_iter(text) {
        let run = if let Some(m) = caps.get(1) {
            unescape_pdf_literal(m.as_str())
        } else if let Some(m) = caps.get(2) {
            match decode_hex_run(m.as_str()) {
                Some(decoded) => decoded,
                None => continue,
            }
        } else if let Some(m) = caps.get(3).or_else(|| caps.get(4)) {
            m.as_str().to_string()
        } else {
            continue;
        };
        let run = run.trim();
        // `<< /Key value >>` dictionaries look like angle runs
        if run.starts_with('/') {
            continue;
        }
        if LETTERS_RE.find_iter(run).count() >= 3 {
            runs.push(run.to_string());
        }
    }
    runs.join("\n")
}

fn unescape_pdf_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('r') => out.push('\n'),
            Some('t') => out.push(' '),
            Some(other @ ('(' | ')' | '\\')) => out.push(other),
            // octal escapes and unknown escapes carry no readable text
            Some(_) | None => {}
        }
    }
    out
}

fn decode_hex_run(s: &str) -> Option<String> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    let bytes: Vec<u8> = digits
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .filter(|b| *b != 0)
        .collect();
    let decoded = String::from_utf8_lossy(&bytes).into_owned();
    if decoded.is_empty() || decoded.chars().any(|c| !is_printable(c)) {
        return None;
    }
    Some(decoded)
}

// ============ File name ============

/// Last resort: fabricate a program skeleton from keywords in the file name.
pub struct FilenameSkeleton;

impl Strategy<SourceDocument, (TextSource, String)> for FilenameSkeleton {
    fn name(&self) -> &'static str {
        "filename_skeleton"
    }

    fn attempt(&self, doc: &SourceDocument) -> Result<(TextSource, String), StrategyError> {
        let skeleton = select_skeleton(&doc.name).ok_or_else(|| {
            StrategyError::NotApplicable(format!("no program keyword in '{}'", doc.name))
        })?;
        tracing::debug!(document = %doc.name, skeleton = skeleton.key, "synthesizing skeleton");
        Ok((TextSource::FilenameSkeleton, render_skeleton(skeleton)))
    }
}

/// First skeleton whose keyword appears in the file name.
pub fn select_skeleton(file_name: &str) -> Option<&'static ProgramSkeleton> {
    let lower = file_name.to_lowercase();
    let spaced = lower.replace(['_', '-', '.'], " ");
    PROGRAM_SKELETONS
        .iter()
        .find(|s| s.keywords.iter().any(|k| lower.contains(k) || spaced.contains(k)))
}

/// Render a skeleton in the dash grammar under `Day N` headings.
fn render_skeleton(skeleton: &ProgramSkeleton) -> String {
    let mut out = String::new();
    for (i, (title, exercises)) in skeleton.days.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Day {} - {}\n", i + 1, title));
        for (name, sets, reps, rest) in exercises.iter() {
            out.push_str(&format!(
                "{} - {} sets x {} reps - Rest {} seconds\n",
                name, sets, reps, rest
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Outcome;

    fn settings() -> PipelineSettings {
        PipelineSettings::default()
    }

    #[test]
    fn test_plain_text_uses_raw_bytes_tier() {
        let body = "Day 1\nBench Press - 3 sets x 8-10 reps - Rest 90 seconds\nDay 2\nSquat - 4 sets x 5 reps";
        let doc = SourceDocument::new("plan.txt", body.as_bytes().to_vec());
        let mut trace = Trace::new();
        let out = extract(&doc, &settings(), &mut trace);
        assert_eq!(out.source, TextSource::RawBytes);
        assert_eq!(out.content, body);
        // PDF and OOXML tiers were not applicable, which is not worth a warning
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_invalid_pdf_falls_through_with_warning() {
        let doc = SourceDocument::new("bench_plan.pdf", b"%PDF-1.4\ngarbage".to_vec());
        let mut trace = Trace::new();
        let out = extract(&doc, &settings(), &mut trace);
        assert_eq!(out.source, TextSource::FilenameSkeleton);
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("pdf_text_objects extraction failed")));
    }

    #[test]
    fn test_empty_document_without_keyword_is_empty() {
        let doc = SourceDocument::new("scan0001.pdf", Vec::new());
        let mut trace = Trace::new();
        let out = extract(&doc, &settings(), &mut trace);
        assert_eq!(out.source, TextSource::None);
        assert!(out.is_empty());
        assert_eq!(trace.steps().len(), 4);
    }

    #[test]
    fn test_salvage_parenthesized_runs() {
        let markup = "4 0 obj << /Length 80 >> stream\nBT (Bench Press 3x8) Tj ET\nBT (Squat 5x5) Tj (\\(ok\\)) Tj ET\nendstream endobj";
        let salvaged = salvage_delimited_runs(markup);
        assert_eq!(salvaged, "Bench Press 3x8\nSquat 5x5");
    }

    #[test]
    fn test_salvage_hex_runs() {
        // "Deadlift"
        let salvaged = salvage_delimited_runs("<446561646C696674> Tj");
        assert_eq!(salvaged, "Deadlift");
    }

    /// Deterministic high-entropy bytes.
    fn noise(len: usize, mut state: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_salvaged_noise_falls_through_to_skeleton() {
        let doc = SourceDocument::new("bench_press_12wk.pdf", noise(8192, 0x9E37_79B9_7F4A_7C15));
        let mut trace = Trace::new();
        let out = extract(&doc, &settings(), &mut trace);
        assert_eq!(out.source, TextSource::FilenameSkeleton);
        assert!(trace
            .steps()
            .iter()
            .any(|s| s.strategy == "raw_bytes" && s.outcome == Outcome::Rejected));
    }

    #[test]
    fn test_exercise_signal_gate() {
        assert!(require_exercise_signal("Snab\nPausucxq Wygiy\nPufb".to_string()).is_err());
        assert!(require_exercise_signal("Qzx\nSquat 5x5\nVrk".to_string()).is_ok());
        assert!(require_exercise_signal("notes about the deadlift".to_string()).is_ok());
    }

    #[test]
    fn test_select_skeleton_by_keyword() {
        assert_eq!(select_skeleton("bench_press_12wk.pdf").map(|s| s.key), Some("bench"));
        assert_eq!(select_skeleton("StrongLifts 5x5.pdf").map(|s| s.key), Some("stronglifts"));
        assert_eq!(select_skeleton("wendler-531-bbb.pdf").map(|s| s.key), Some("531"));
        assert_eq!(select_skeleton("my_gym_routine.pdf").map(|s| s.key), Some("upper_lower"));
        assert!(select_skeleton("scan0001.pdf").is_none());
    }

    #[test]
    fn test_rendered_skeleton_is_parseable_text() {
        let skeleton = select_skeleton("bench.pdf").unwrap();
        let text = render_skeleton(skeleton);
        assert!(text.starts_with("Day 1 - Heavy Bench\nBench Press - 5 sets x 5 reps - Rest 180 seconds\n"));
        assert_eq!(text.matches("Day ").count(), skeleton.days.len());
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let xml = br#"<?xml version="1.0"?><w:document xmlns:w="x"><w:body><w:p><w:r><w:t>Day 1</w:t></w:r></w:p><w:p><w:r><w:t>Squat - 5 sets x 5 reps</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_paragraph_text(xml).unwrap();
        assert_eq!(text, "Day 1\nSquat - 5 sets x 5 reps\n");
    }
}
