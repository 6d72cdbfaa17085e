//! Section extraction from provider responses.
//!
//! The analysis prompt asks for four literal section headers. Providers
//! drift on decoration (numbering, bold markers, casing), so headers are
//! matched loosely at line starts; each section body runs until the next
//! known header. Kept in this crate, next to the providers, so the parsing
//! strategy can vary per provider without touching the orchestrator.

use regex::Regex;

use crate::augmenter::AnalysisReport;

/// The literal headers requested by the analysis prompt.
pub const SECTION_HEADERS: [&str; 4] = [
    "SUMMARY",
    "STRENGTHS",
    "AREAS FOR IMPROVEMENT",
    "SUGGESTIONS",
];

/// Fallback summary when the provider response carries no SUMMARY header.
pub const SUMMARY_FALLBACK: &str = "Analysis not available";

fn header_regex(name: &str) -> Regex {
    // Tolerates "1. SUMMARY:", "**SUMMARY**:", "summary:" at line starts.
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:\d+\.[ \t]*)?\*{{0,2}}{}\*{{0,2}}[ \t]*:",
        regex::escape(name)
    ))
    .expect("section header regex is valid")
}

/// Extract the raw text of one section, trimmed. `None` when the header is
/// absent or the section body is empty.
pub fn extract_section(text: &str, name: &str) -> Option<String> {
    let header = header_regex(name).find(text)?;
    let rest = &text[header.end()..];

    let mut end = rest.len();
    for other in SECTION_HEADERS {
        if let Some(next) = header_regex(other).find(rest) {
            end = end.min(next.start());
        }
    }

    let body = rest[..end].trim();
    (!body.is_empty()).then(|| body.to_string())
}

/// Extract a section as a list, split on numbered or bulleted markers.
/// Continuation lines are folded into the preceding item. Falls back to
/// the whole section as a single item when no markers are found.
pub fn section_items(text: &str, name: &str) -> Vec<String> {
    let Some(section) = extract_section(text, name) else {
        return Vec::new();
    };

    let marker = Regex::new(r"^[ \t]*(?:\d+\.|[-•*])[ \t]*(.*)$").expect("bullet regex is valid");

    let mut items: Vec<String> = Vec::new();
    for line in section.lines() {
        if let Some(caps) = marker.captures(line) {
            let head = caps[1].trim().to_string();
            items.push(head);
        } else if let Some(last) = items.last_mut() {
            let continuation = line.trim();
            if !continuation.is_empty() {
                last.push(' ');
                last.push_str(continuation);
            }
        }
    }
    items.retain(|item| !item.is_empty());

    if items.is_empty() {
        vec![section]
    } else {
        items
    }
}

/// Parse a full provider response into a structured report.
pub fn parse_report(text: &str) -> AnalysisReport {
    AnalysisReport {
        summary: extract_section(text, "SUMMARY")
            .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()),
        strengths: section_items(text, "STRENGTHS"),
        areas_for_improvement: section_items(text, "AREAS FOR IMPROVEMENT"),
        suggestions: section_items(text, "SUGGESTIONS"),
        full_analysis: text.to_string(),
    }
}
