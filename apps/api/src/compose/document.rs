//! Structured résumé document built from classified lines.

use serde::{Deserialize, Serialize};

use crate::compose::classify::{classify_line, ClassifierConfig, ClassifierState, LineKind};

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResumeDocument {
    pub name: Option<String>,
    pub contact_line: Option<String>,
    /// Source order. A section with an empty header holds content found before any header.
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Empty for anonymous entries opened by a stray bullet or paragraph.
    pub title: String,
    pub date_label: Option<String>,
    /// The date came from the title's own input line (drawn right-aligned beside it).
    pub date_inline: bool,
    pub bullets: Vec<String>,
    pub categories: Vec<Category>,
    pub free_text: Vec<String>,
    /// Divider lines, as the bullet index each one precedes. `bullets.len()` means
    /// after the last bullet.
    #[serde(default)]
    pub dividers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    pub items: Vec<String>,
}

impl ParsedResumeDocument {
    /// True when at least one real section header was recognized.
    pub fn has_sections(&self) -> bool {
        self.sections.iter().any(|s| !s.header.is_empty())
    }
}

impl Entry {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.date_label.is_none()
            && self.bullets.is_empty()
            && self.categories.is_empty()
            && self.free_text.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Classifies every line of `text` and groups the result.
///
/// When no section header is found, everything except the name and contact line is
/// kept verbatim as body paragraphs in one anonymous section.
pub fn parse_document(text: &str, config: &ClassifierConfig) -> ParsedResumeDocument {
    let mut state = ClassifierState::default();
    let mut builder = DocumentBuilder::default();

    for line in text.lines() {
        let (kind, _rule) = classify_line(line, &state, config);
        state.observe(&kind);
        builder.push(kind);
    }

    let doc = builder.finish();
    if doc.has_sections() {
        doc
    } else {
        plain_document(text, doc.name, doc.contact_line)
    }
}

/// Name and contact block plus every other non-blank line as a body paragraph.
pub fn plain_document(
    text: &str,
    name: Option<String>,
    contact_line: Option<String>,
) -> ParsedResumeDocument {
    let mut skip_name = name.clone();
    let mut skip_contact = contact_line.clone();

    let free_text: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| {
            if skip_name.as_deref() == Some(*l) {
                skip_name = None;
                return false;
            }
            if skip_contact.as_deref() == Some(*l) {
                skip_contact = None;
                return false;
            }
            true
        })
        .map(str::to_string)
        .collect();

    let sections = if free_text.is_empty() {
        Vec::new()
    } else {
        vec![Section {
            header: String::new(),
            entries: vec![Entry {
                free_text,
                ..Entry::default()
            }],
        }]
    };

    ParsedResumeDocument {
        name,
        contact_line,
        sections,
    }
}

#[derive(Default)]
struct DocumentBuilder {
    doc: ParsedResumeDocument,
    /// The last entry of the last section accepts content.
    entry_open: bool,
    /// The previous line was an entry title with nothing under it yet.
    pending_title: bool,
}

impl DocumentBuilder {
    fn push(&mut self, kind: LineKind) {
        let was_pending = std::mem::replace(&mut self.pending_title, false);

        match kind {
            LineKind::Blank => {}
            // Without an open entry the divider sits under a header or the identity
            // block, which already draw their own rule.
            LineKind::Divider => {
                if let Some(entry) = self.open_entry_mut() {
                    let at = entry.bullets.len();
                    if entry.dividers.last() != Some(&at) {
                        entry.dividers.push(at);
                    }
                }
            }
            LineKind::Name(name) => self.doc.name = Some(name),
            LineKind::Contact(contact) => self.doc.contact_line = Some(contact),
            LineKind::SectionHeader(header) => {
                self.doc.sections.push(Section {
                    header,
                    entries: Vec::new(),
                });
                self.entry_open = false;
            }
            LineKind::Bullet(text) => self.current_entry().bullets.push(text),
            LineKind::Category { label, items } => {
                self.current_entry().categories.push(Category { label, items })
            }
            LineKind::DateLine(date) => {
                let entry = self.current_entry();
                if entry.date_label.is_none() && !entry.title.is_empty() {
                    entry.date_label = Some(date);
                    entry.date_inline = false;
                } else {
                    entry.free_text.push(date);
                }
            }
            LineKind::Title { title, date } => {
                if was_pending && self.continues_title(&title, date.is_some()) {
                    let entry = self.current_entry();
                    entry.title = format!("{}, {}", entry.title, title);
                    if date.is_some() {
                        entry.date_inline = true;
                        entry.date_label = date;
                    }
                } else {
                    self.open_entry(Entry {
                        title,
                        date_inline: date.is_some(),
                        date_label: date,
                        ..Entry::default()
                    });
                }
                self.pending_title = true;
            }
            LineKind::Body(text) => self.current_entry().free_text.push(text),
        }
    }

    /// A title line directly under a bullet-less title continues it, unless both lines
    /// carry their own date or both are full `a | b` structures.
    fn continues_title(&self, next: &str, next_dated: bool) -> bool {
        let Some(open) = self.open_entry_ref() else {
            return false;
        };
        let both_dated = open.date_label.is_some() && next_dated;
        let both_piped = open.title.contains('|') && next.contains('|');
        open.bullets.is_empty() && !both_dated && !both_piped
    }

    fn open_entry_ref(&self) -> Option<&Entry> {
        if !self.entry_open {
            return None;
        }
        self.doc.sections.last().and_then(|s| s.entries.last())
    }

    fn open_entry_mut(&mut self) -> Option<&mut Entry> {
        if !self.entry_open {
            return None;
        }
        self.doc.sections.last_mut().and_then(|s| s.entries.last_mut())
    }

    fn open_entry(&mut self, entry: Entry) {
        self.ensure_section().entries.push(entry);
        self.entry_open = true;
    }

    /// The open entry, or a fresh anonymous one under the current section.
    fn current_entry(&mut self) -> &mut Entry {
        if !self.entry_open || self.doc.sections.last().map_or(true, |s| s.entries.is_empty()) {
            self.open_entry(Entry::default());
        }
        let section = self.ensure_section();
        let last = section.entries.len() - 1;
        &mut section.entries[last]
    }

    fn ensure_section(&mut self) -> &mut Section {
        if self.doc.sections.is_empty() {
            self.doc.sections.push(Section::default());
        }
        let last = self.doc.sections.len() - 1;
        &mut self.doc.sections[last]
    }

    fn finish(mut self) -> ParsedResumeDocument {
        for section in &mut self.doc.sections {
            section.entries.retain(|e| !e.is_empty());
        }
        self.doc
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
