//! Best-effort `[ATS_SCORE: NN]` marker extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SCORE_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*ATS[_ ]SCORE\s*:\s*(\d{1,3})\s*(?:/\s*100\s*)?\]")
        .expect("valid score marker regex")
});

const MAX_SCORE: u32 = 100;

/// Model output with the score marker split out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredText {
    /// `None` when no marker was present. Absence never means zero.
    pub score: Option<String>,
    pub body: String,
}

/// Locates the first score marker, returns its value (capped at 100) and the text
/// without it.
///
/// The halves around the marker are trimmed and rejoined with a newline if the gap
/// spanned a line break, otherwise a single space. Text without a marker is returned
/// unchanged.
pub fn extract_score(text: &str) -> ScoredText {
    let Some(caps) = SCORE_MARKER_RE.captures(text) else {
        return ScoredText {
            score: None,
            body: text.to_string(),
        };
    };

    // Group 0 always exists on a successful capture.
    let marker = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
    let score = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(|n| n.min(MAX_SCORE).to_string());

    let raw_before = &text[..marker.0];
    let raw_after = &text[marker.1..];
    let before = raw_before.trim_end();
    let after = raw_after.trim_start();

    let gap_has_newline = raw_before[before.len()..].contains('\n')
        || raw_after[..raw_after.len() - after.len()].contains('\n');

    let body = match (before.is_empty(), after.is_empty()) {
        (true, _) => after.to_string(),
        (_, true) => before.to_string(),
        _ if gap_has_newline => format!("{before}\n{after}"),
        _ => format!("{before} {after}"),
    };

    ScoredText {
        score,
        body: body.trim().to_string(),
    }
}
