//! Line classifier: an ordered list of pattern → tag rules.
//!
//! Every trimmed input line is run through `RULES` top to bottom; the first rule that
//! returns `Some` wins. The final `body` rule always matches, so classification is
//! total. Context-sensitive rules (name, contact, title) read a small
//! `ClassifierState` that the document builder advances after each line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compose::dates::{split_trailing_date, standalone_date};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// The semantic role of one input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineKind {
    Blank,
    /// A run of underscores (or similar); drawn as a rule, carries no content.
    Divider,
    Name(String),
    Contact(String),
    SectionHeader(String),
    /// Marker already stripped.
    Bullet(String),
    /// A line holding nothing but a date span.
    DateLine(String),
    Category { label: String, items: Vec<String> },
    Title { title: String, date: Option<String> },
    Body(String),
}

/// Thresholds for the length-based rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub name_max_chars: usize,
    /// Header lines must be strictly shorter than this.
    pub header_max_chars: usize,
    pub title_max_chars: usize,
    pub title_max_words: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            name_max_chars: 60,
            header_max_chars: 50,
            title_max_chars: 110,
            title_max_words: 16,
        }
    }
}

/// What the context-sensitive rules need to know about the lines already seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierState {
    pub seen_name: bool,
    pub seen_contact: bool,
    /// Any content other than the name/contact block has been seen.
    pub seen_other_content: bool,
    pub in_section: bool,
    /// The open section holds paragraphs (summary, profile, objective).
    pub in_prose_section: bool,
}

impl ClassifierState {
    /// Advances the state past a classified line.
    pub fn observe(&mut self, kind: &LineKind) {
        match kind {
            LineKind::Blank | LineKind::Divider => {}
            LineKind::Name(_) => self.seen_name = true,
            LineKind::Contact(_) => self.seen_contact = true,
            LineKind::SectionHeader(header) => {
                self.in_section = true;
                self.in_prose_section = is_prose_section(header);
                self.seen_other_content = true;
            }
            _ => self.seen_other_content = true,
        }
    }

    /// Still inside the name/contact block at the top of the document.
    fn in_preamble(&self) -> bool {
        !self.in_section && !self.seen_other_content
    }
}

type RuleFn = fn(&str, &ClassifierState, &ClassifierConfig) -> Option<LineKind>;

/// A named classification rule.
pub struct Rule {
    pub name: &'static str,
    pub apply: RuleFn,
}

/// Evaluated top to bottom; precedence is the order of this list.
pub const RULES: &[Rule] = &[
    Rule { name: "blank", apply: rule_blank },
    Rule { name: "divider", apply: rule_divider },
    Rule { name: "name", apply: rule_name },
    Rule { name: "contact", apply: rule_contact },
    Rule { name: "date_line", apply: rule_date_line },
    Rule { name: "section_header", apply: rule_section_header },
    Rule { name: "bullet", apply: rule_bullet },
    Rule { name: "category", apply: rule_category },
    Rule { name: "title", apply: rule_title },
    Rule { name: "body", apply: rule_body },
];

/// Classifies one line. Returns the tag and the name of the rule that produced it.
pub fn classify_line(
    line: &str,
    state: &ClassifierState,
    config: &ClassifierConfig,
) -> (LineKind, &'static str) {
    let line = line.trim();
    for rule in RULES {
        if let Some(kind) = (rule.apply)(line, state, config) {
            return (kind, rule.name);
        }
    }
    (LineKind::Body(line.to_string()), "body")
}

// ────────────────────────────────────────────────────────────────────────────
// Patterns
// ────────────────────────────────────────────────────────────────────────────

static DIVIDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_=─━]{3,}$|^-{3,}$").expect("valid divider regex"));
static BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[•●○◦▪▫■□‣⁃∙·*]\s*|[-–—]\s+)(\S.*)$").expect("valid bullet regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").expect("valid email regex"));
static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)https?://|www\.|linkedin\.com|github\.com").expect("valid link regex")
});
static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:|]{2,40}):\s*(\S.*)$").expect("valid category regex"));

const KNOWN_SECTIONS: &[&str] = &[
    "SUMMARY",
    "PROFESSIONAL SUMMARY",
    "PROFILE",
    "PROFESSIONAL PROFILE",
    "OBJECTIVE",
    "CAREER OBJECTIVE",
    "ABOUT",
    "ABOUT ME",
    "EXPERIENCE",
    "PROFESSIONAL EXPERIENCE",
    "WORK EXPERIENCE",
    "EMPLOYMENT HISTORY",
    "EDUCATION",
    "SKILLS",
    "TECHNICAL SKILLS",
    "CORE COMPETENCIES",
    "CERTIFICATIONS",
    "CERTIFICATES",
    "PROJECTS",
    "AWARDS",
    "ACHIEVEMENTS",
    "PUBLICATIONS",
    "LANGUAGES",
    "VOLUNTEER EXPERIENCE",
    "INTERESTS",
];

/// Separators that split a contact line into segments.
const CONTACT_SEPARATORS: &[char] = &['|', '•', '·'];

// ────────────────────────────────────────────────────────────────────────────
// Rules
// ────────────────────────────────────────────────────────────────────────────

fn rule_blank(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    line.is_empty().then_some(LineKind::Blank)
}

fn rule_divider(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    DIVIDER_RE.is_match(line).then_some(LineKind::Divider)
}

fn rule_name(line: &str, state: &ClassifierState, config: &ClassifierConfig) -> Option<LineKind> {
    let eligible = !state.seen_name
        && state.in_preamble()
        && line.chars().count() <= config.name_max_chars
        && line.chars().any(char::is_alphabetic)
        && !BULLET_RE.is_match(line)
        && !looks_like_contact(line, false)
        && known_section(line).is_none();

    eligible.then(|| LineKind::Name(line.to_string()))
}

/// Open until the first section header; a headline may sit between name and contact.
fn rule_contact(line: &str, state: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    if state.seen_contact || state.in_section {
        return None;
    }
    looks_like_contact(line, state.seen_name).then(|| LineKind::Contact(line.to_string()))
}

fn rule_date_line(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    standalone_date(line).map(LineKind::DateLine)
}

fn rule_section_header(
    line: &str,
    _: &ClassifierState,
    config: &ClassifierConfig,
) -> Option<LineKind> {
    if let Some(known) = known_section(line) {
        return Some(LineKind::SectionHeader(known));
    }

    let stripped = line.strip_suffix(':').unwrap_or(line).trim();
    let is_header = line.chars().count() < config.header_max_chars
        && stripped.chars().any(char::is_alphabetic)
        && stripped == stripped.to_uppercase()
        && !stripped.contains(['|', ':', '@'])
        && !BULLET_RE.is_match(line);

    is_header.then(|| LineKind::SectionHeader(stripped.to_string()))
}

fn rule_bullet(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    BULLET_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| LineKind::Bullet(m.as_str().trim().to_string()))
}

fn rule_category(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    let caps = CATEGORY_RE.captures(line)?;
    let label = caps.get(1)?.as_str().trim();
    let rest = caps.get(2)?.as_str().trim();

    if label.to_lowercase().ends_with("http") || label.to_lowercase().ends_with("https") {
        return None;
    }

    let items: Vec<String> = rest
        .split([',', ';'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let short_label = label.split_whitespace().count() <= 3;
    let list_like = items.len() >= 2 || (short_label && !rest.ends_with('.'));

    list_like.then(|| LineKind::Category {
        label: label.to_string(),
        items,
    })
}

fn rule_title(line: &str, state: &ClassifierState, config: &ClassifierConfig) -> Option<LineKind> {
    if !state.in_section {
        return None;
    }

    if let Some((title, date)) = split_trailing_date(line) {
        return Some(LineKind::Title {
            title,
            date: Some(date),
        });
    }

    if line.contains('|') {
        return Some(LineKind::Title {
            title: line.to_string(),
            date: None,
        });
    }

    let short_enough = line.chars().count() <= config.title_max_chars
        && line.split_whitespace().count() <= config.title_max_words;
    let prose = state.in_prose_section || line.ends_with('.') || line.matches(',').count() >= 2;

    (short_enough && !prose).then(|| LineKind::Title {
        title: line.to_string(),
        date: None,
    })
}

fn rule_body(line: &str, _: &ClassifierState, _: &ClassifierConfig) -> Option<LineKind> {
    Some(LineKind::Body(line.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Email or link markers always qualify; bare separator-segmented lines only count
/// once a name has been seen.
fn looks_like_contact(line: &str, allow_segments: bool) -> bool {
    if EMAIL_RE.is_match(line) || LINK_RE.is_match(line) {
        return true;
    }
    allow_segments
        && line
            .split(CONTACT_SEPARATORS)
            .filter(|s| !s.trim().is_empty())
            .count()
            >= 2
}

/// Matches a well-known section title in any case, with an optional trailing colon.
fn known_section(line: &str) -> Option<String> {
    let candidate = line.strip_suffix(':').unwrap_or(line).trim().to_uppercase();
    KNOWN_SECTIONS
        .iter()
        .any(|s| *s == candidate)
        .then_some(candidate)
}

pub fn is_prose_section(header: &str) -> bool {
    let upper = header.to_uppercase();
    upper.contains("SUMMARY")
        || upper.contains("PROFILE")
        || upper.contains("OBJECTIVE")
        || upper.starts_with("ABOUT")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    fn fresh() -> ClassifierState {
        ClassifierState::default()
    }

    fn after_name() -> ClassifierState {
        ClassifierState {
            seen_name: true,
            ..ClassifierState::default()
        }
    }

    fn in_section() -> ClassifierState {
        ClassifierState {
            seen_name: true,
            seen_contact: true,
            seen_other_content: true,
            in_section: true,
            in_prose_section: false,
        }
    }

    fn rule_for(line: &str, state: &ClassifierState) -> &'static str {
        classify_line(line, state, &cfg()).1
    }

    #[test]
    fn test_rules_are_ordered_and_end_with_body() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names.first(), Some(&"blank"));
        assert_eq!(names.last(), Some(&"body"));
        let name_pos = names.iter().position(|n| *n == "name").unwrap();
        let header_pos = names.iter().position(|n| *n == "section_header").unwrap();
        assert!(name_pos < header_pos, "name must win over an all-caps name line");
    }

    #[test]
    fn test_blank_and_divider() {
        assert_eq!(classify_line("   ", &fresh(), &cfg()).0, LineKind::Blank);
        assert_eq!(classify_line("________", &in_section(), &cfg()).0, LineKind::Divider);
        assert_eq!(classify_line("-----", &in_section(), &cfg()).0, LineKind::Divider);
    }

    #[test]
    fn test_first_line_is_name_even_when_uppercase() {
        assert_eq!(
            classify_line("JANE DOE", &fresh(), &cfg()).0,
            LineKind::Name("JANE DOE".to_string())
        );
    }

    #[test]
    fn test_name_rejects_contact_bullet_and_section_words() {
        assert_eq!(rule_for("jane@example.com", &fresh()), "contact");
        assert_eq!(rule_for("• Led a team", &fresh()), "bullet");
        assert_eq!(rule_for("EXPERIENCE", &fresh()), "section_header");
    }

    #[test]
    fn test_name_only_once() {
        assert_ne!(rule_for("John Smith", &after_name()), "name");
    }

    #[test]
    fn test_contact_markers() {
        let line = "jane@example.com | +1 555 0100 | linkedin.com/in/janedoe";
        assert_eq!(
            classify_line(line, &after_name(), &cfg()).0,
            LineKind::Contact(line.to_string())
        );
        assert_eq!(rule_for("+1 555 0100 | Dublin, Ireland", &after_name()), "contact");
        assert_eq!(rule_for("https://janedoe.dev", &after_name()), "contact");
    }

    #[test]
    fn test_contact_recognized_at_most_once() {
        let state = ClassifierState {
            seen_contact: true,
            ..after_name()
        };
        assert_ne!(rule_for("jane@example.com", &state), "contact");
    }

    #[test]
    fn test_contact_after_headline_is_still_contact() {
        let state = ClassifierState {
            seen_other_content: true,
            ..after_name()
        };
        assert_eq!(rule_for("jane@example.com | +1 555 0100", &state), "contact");
    }

    #[test]
    fn test_contact_closes_at_first_section() {
        assert_ne!(rule_for("jane@example.com", &in_section()), "contact");
        let state = ClassifierState {
            seen_contact: false,
            ..in_section()
        };
        assert_ne!(rule_for("jane@example.com", &state), "contact");
    }

    #[test]
    fn test_section_header_rules() {
        assert_eq!(
            classify_line("TECHNICAL SKILLS:", &in_section(), &cfg()).0,
            LineKind::SectionHeader("TECHNICAL SKILLS".to_string())
        );
        assert_eq!(
            classify_line("Professional Experience", &in_section(), &cfg()).0,
            LineKind::SectionHeader("PROFESSIONAL EXPERIENCE".to_string())
        );
        assert_eq!(rule_for("VOLUNTEERING & OUTREACH", &in_section()), "section_header");
    }

    #[test]
    fn test_section_header_rejects_long_numeric_and_piped_lines() {
        let long = "A VERY LONG UPPERCASE LINE THAT GOES ON WELL PAST THE LIMIT";
        assert_ne!(rule_for(long, &in_section()), "section_header");
        assert_ne!(rule_for("2019 / 2020", &in_section()), "section_header");
        assert_ne!(rule_for("ANALYST | ACME", &in_section()), "section_header");
    }

    #[test]
    fn test_bullet_markers_are_stripped() {
        for line in ["• Shipped it", "- Shipped it", "* Shipped it", "–  Shipped it", "▪Shipped it"] {
            assert_eq!(
                classify_line(line, &in_section(), &cfg()).0,
                LineKind::Bullet("Shipped it".to_string()),
                "{line}"
            );
        }
        assert_ne!(rule_for("-Shipped it", &in_section()), "bullet");
    }

    #[test]
    fn test_date_line() {
        assert_eq!(
            classify_line("Jan 2022 - Present", &in_section(), &cfg()).0,
            LineKind::DateLine("Jan 2022 - Present".to_string())
        );
        assert_eq!(rule_for("2019 - 2021", &in_section()), "date_line");
    }

    #[test]
    fn test_category_line() {
        assert_eq!(
            classify_line("Languages: Python, SQL, R", &in_section(), &cfg()).0,
            LineKind::Category {
                label: "Languages".to_string(),
                items: vec!["Python".to_string(), "SQL".to_string(), "R".to_string()],
            }
        );
        assert_eq!(rule_for("Certifications: CFA Level II", &in_section()), "category");
        assert_ne!(rule_for("https://example.com/path", &in_section()), "category");
        assert_ne!(
            rule_for("Note that the long label here: was a sentence.", &in_section()),
            "category"
        );
    }

    #[test]
    fn test_title_with_pipes_and_date() {
        assert_eq!(
            classify_line(
                "Senior Analyst | Acme Corp | Remote (Jan 2022 - Present)",
                &in_section(),
                &cfg()
            )
            .0,
            LineKind::Title {
                title: "Senior Analyst | Acme Corp | Remote".to_string(),
                date: Some("Jan 2022 - Present".to_string()),
            }
        );
    }

    #[test]
    fn test_plain_short_line_is_title_in_section() {
        assert_eq!(rule_for("Data Analyst, Globex", &in_section()), "title");
    }

    #[test]
    fn test_sentences_are_body() {
        let sentence = "Analyst with six years of experience turning messy data into decisions.";
        assert_eq!(rule_for(sentence, &in_section()), "body");
        assert_eq!(rule_for("Python, SQL, Tableau, dbt", &in_section()), "body");
    }

    #[test]
    fn test_prose_section_never_yields_plain_titles() {
        let state = ClassifierState {
            in_prose_section: true,
            ..in_section()
        };
        assert_eq!(rule_for("Results-driven analyst", &state), "body");
    }

    #[test]
    fn test_outside_sections_everything_else_is_body() {
        let state = ClassifierState {
            seen_name: true,
            seen_contact: true,
            seen_other_content: true,
            ..ClassifierState::default()
        };
        assert_eq!(rule_for("Analyst | Acme", &state), "body");
    }

    #[test]
    fn test_observe_tracks_sections() {
        let mut state = fresh();
        state.observe(&LineKind::Name("JANE".to_string()));
        assert!(state.seen_name && !state.seen_other_content);
        state.observe(&LineKind::SectionHeader("PROFESSIONAL SUMMARY".to_string()));
        assert!(state.in_section && state.in_prose_section);
        state.observe(&LineKind::SectionHeader("EXPERIENCE".to_string()));
        assert!(!state.in_prose_section);
    }
}
