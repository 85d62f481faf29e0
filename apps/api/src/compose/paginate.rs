//! Paginated layout: turns a `ParsedResumeDocument` into positioned draw commands.
//!
//! # Rules
//! - A wrapped group (one bullet, one paragraph, one title block, one category) is
//!   never split across pages unless it is taller than a whole page.
//! - A section header reserves room for itself plus the opening of its first entry
//!   (at least `header_keep_lines` body lines), so it is never stranded at the bottom
//!   of a page. Entry titles likewise stay with the first group beneath them.
//! - The vertical cursor only moves down within a page; a page break resets it to the
//!   top margin of a fresh page.
//!
//! Coordinates are points with the origin at the top-left corner of the page; `y` is
//! the text baseline. Backends flip to their own coordinate system.

use serde::{Deserialize, Serialize};

use crate::compose::classify::ClassifierConfig;
use crate::compose::document::{Category, Entry, ParsedResumeDocument, Section};
use crate::compose::font_metrics::{get_metrics, wrap_text, Face};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry, type sizes and spacing. Defaults are A4 with 20mm margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub name_size: f32,
    pub contact_size: f32,
    pub header_size: f32,
    pub title_size: f32,
    pub body_size: f32,
    pub small_size: f32,
    /// Line height as a multiple of the font size.
    pub line_spacing: f32,
    /// Hanging indent of bullet text relative to the margin.
    pub bullet_indent: f32,
    pub section_gap: f32,
    pub entry_gap: f32,
    pub paragraph_gap: f32,
    /// Minimum body lines that must fit below a section header on the same page.
    pub header_keep_lines: usize,
    pub classifier: ClassifierConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 56.69,
            name_size: 16.0,
            contact_size: 9.0,
            header_size: 12.0,
            title_size: 10.5,
            body_size: 10.0,
            small_size: 9.0,
            line_spacing: 1.3,
            bullet_indent: 12.0,
            section_gap: 10.0,
            entry_gap: 6.0,
            paragraph_gap: 3.0,
            header_keep_lines: 2,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_spacing
    }

    /// Rejects geometry that leaves no room to draw.
    pub fn validate(&self) -> Result<(), String> {
        let sizes = [
            self.name_size,
            self.contact_size,
            self.header_size,
            self.title_size,
            self.body_size,
            self.small_size,
        ];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err("font sizes must be positive".into());
        }
        if !(self.line_spacing >= 1.0) {
            return Err(format!("line_spacing must be >= 1.0, got {}", self.line_spacing));
        }
        if self.content_width() <= self.bullet_indent * 2.0 {
            return Err(format!(
                "content width {:.1}pt is too narrow for page {:.1}pt with margin {:.1}pt",
                self.content_width(),
                self.page_width,
                self.margin
            ));
        }
        if self.content_height() < self.line_height(self.name_size) * 2.0 {
            return Err(format!("content height {:.1}pt is too short", self.content_height()));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Horizontal anchor of a text command: `x` is the left edge, centre or right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Text {
        text: String,
        x: f32,
        y: f32,
        face: Face,
        size: f32,
        align: Align,
    },
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDocument {
    pub page_width: f32,
    pub page_height: f32,
    /// Never empty.
    pub pages: Vec<Page>,
}

#[cfg(test)]
impl LaidOutDocument {
    /// Every text command in drawing order, with its page index.
    pub fn texts(&self) -> impl Iterator<Item = (usize, &DrawCommand)> {
        self.pages.iter().enumerate().flat_map(|(i, p)| {
            p.commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Text { .. }))
                .map(move |c| (i, c))
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// One item of a row, positioned relative to the row's top.
#[derive(Debug, Clone)]
pub(crate) enum RowItem {
    Text {
        text: String,
        x: f32,
        face: Face,
        size: f32,
        align: Align,
    },
    Rule {
        x1: f32,
        x2: f32,
        dy: f32,
        thickness: f32,
    },
}

/// One output line: its height and everything drawn on it.
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub height: f32,
    pub items: Vec<RowItem>,
}

impl Row {
    fn text(config: &LayoutConfig, text: String, x: f32, face: Face, size: f32, align: Align) -> Self {
        Self {
            height: config.line_height(size),
            items: vec![RowItem::Text {
                text,
                x,
                face,
                size,
                align,
            }],
        }
    }

    fn rule(config: &LayoutConfig, thickness: f32, height: f32) -> Self {
        Self {
            height,
            items: vec![RowItem::Rule {
                x1: config.margin,
                x2: config.page_width - config.margin,
                dy: height / 2.0,
                thickness,
            }],
        }
    }

    fn baseline_offset(&self) -> f32 {
        self.items
            .iter()
            .filter_map(|i| match i {
                RowItem::Text { size, .. } => Some(*size),
                RowItem::Rule { .. } => None,
            })
            .fold(0.0_f32, f32::max)
    }
}

/// Vertical cursor over a growing list of pages.
pub struct PageLayout {
    top: f32,
    bottom: f32,
    y: f32,
    pages: Vec<Page>,
}

impl PageLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            top: config.margin,
            bottom: config.page_height - config.margin,
            y: config.margin,
            pages: vec![Page::default()],
        }
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.top
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= self.bottom + 0.01
    }

    pub fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.top;
    }

    /// Starts a new page unless `height` fits below the cursor. A fresh page never breaks.
    pub fn reserve(&mut self, height: f32) {
        if !self.fits(height) && !self.at_page_top() {
            self.break_page();
        }
    }

    /// Vertical whitespace; swallowed at the top of a page.
    pub fn gap(&mut self, dy: f32) {
        if self.at_page_top() {
            return;
        }
        if self.fits(dy) {
            self.y += dy;
        } else {
            self.break_page();
        }
    }

    /// Places rows as one unit; falls back to row-by-row when the group exceeds a page.
    pub(crate) fn place_group(&mut self, rows: &[Row]) {
        let total = height_of(rows);
        if total <= self.bottom - self.top {
            self.reserve(total);
            for row in rows {
                self.place_row(row);
            }
        } else {
            for row in rows {
                self.reserve(row.height);
                self.place_row(row);
            }
        }
    }

    fn place_row(&mut self, row: &Row) {
        let baseline = self.y + row.baseline_offset();
        let Some(page) = self.pages.last_mut() else {
            return;
        };

        for item in &row.items {
            let command = match item {
                RowItem::Text {
                    text,
                    x,
                    face,
                    size,
                    align,
                } => DrawCommand::Text {
                    text: text.clone(),
                    x: *x,
                    y: baseline,
                    face: *face,
                    size: *size,
                    align: *align,
                },
                RowItem::Rule {
                    x1,
                    x2,
                    dy,
                    thickness,
                } => DrawCommand::Rule {
                    x1: *x1,
                    x2: *x2,
                    y: self.y + dy,
                    thickness: *thickness,
                },
            };
            page.commands.push(command);
        }
        self.y += row.height;
    }

    pub fn finish(self, config: &LayoutConfig) -> LaidOutDocument {
        LaidOutDocument {
            page_width: config.page_width,
            page_height: config.page_height,
            pages: self.pages,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured layout
// ────────────────────────────────────────────────────────────────────────────

/// Lays out the parsed document, followed by the score footer when a score is given.
pub fn layout_document(
    doc: &ParsedResumeDocument,
    ats_score: Option<&str>,
    config: &LayoutConfig,
) -> LaidOutDocument {
    let mut composer = Composer {
        config,
        page: PageLayout::new(config),
    };

    composer.identity(doc.name.as_deref(), doc.contact_line.as_deref());
    for section in &doc.sections {
        composer.section(section);
    }
    if let Some(score) = ats_score {
        composer.score_footer(score);
    }
    composer.page.finish(config)
}

/// Degraded layout: every non-blank line as a wrapped body paragraph.
pub fn layout_plain(text: &str, ats_score: Option<&str>, config: &LayoutConfig) -> LaidOutDocument {
    let mut composer = Composer {
        config,
        page: PageLayout::new(config),
    };

    for paragraph in text.lines().map(str::trim) {
        if paragraph.is_empty() {
            composer.page.gap(config.paragraph_gap * 2.0);
            continue;
        }
        composer.paragraph(paragraph);
    }
    if let Some(score) = ats_score {
        composer.score_footer(score);
    }
    composer.page.finish(config)
}

struct Composer<'a> {
    config: &'a LayoutConfig,
    page: PageLayout,
}

impl Composer<'_> {
    fn identity(&mut self, name: Option<&str>, contact: Option<&str>) {
        let cfg = self.config;
        let center = cfg.page_width / 2.0;
        let mut rows = Vec::new();

        if let Some(name) = name {
            let name = name.to_uppercase();
            for line in wrap_text(&name, Face::SerifBold, cfg.name_size, cfg.content_width()) {
                rows.push(Row::text(cfg, line, center, Face::SerifBold, cfg.name_size, Align::Center));
            }
        }
        if let Some(contact) = contact {
            for line in wrap_text(contact, Face::Sans, cfg.contact_size, cfg.content_width()) {
                rows.push(Row::text(cfg, line, center, Face::Sans, cfg.contact_size, Align::Center));
            }
        }
        if rows.is_empty() {
            return;
        }
        rows.push(Row::rule(cfg, 0.5, 6.0));
        self.page.place_group(&rows);
    }

    fn section(&mut self, section: &Section) {
        let cfg = self.config;

        if !section.header.is_empty() {
            self.page.gap(cfg.section_gap);
            let rows = vec![
                Row::text(
                    cfg,
                    section.header.clone(),
                    cfg.margin,
                    Face::SerifBold,
                    cfg.header_size,
                    Align::Left,
                ),
                Row::rule(cfg, 0.75, 5.0),
            ];
            let keep = cfg.header_keep_lines as f32 * cfg.line_height(cfg.body_size);
            let lead = section
                .entries
                .first()
                .map_or(0.0, |e| self.lead_height(e))
                .max(keep);
            self.page.reserve((height_of(&rows) + lead).min(cfg.content_height()));
            self.page.place_group(&rows);
        }

        for (i, entry) in section.entries.iter().enumerate() {
            if i > 0 {
                self.page.gap(cfg.entry_gap);
            }
            self.entry(entry);
        }
    }

    fn entry(&mut self, entry: &Entry) {
        let title_rows = self.title_rows(entry);
        let groups = self.body_groups(entry);
        if !title_rows.is_empty() {
            // Keep the title with the first group beneath it.
            let first_group = groups.first().map_or(0.0, |(g, _)| height_of(g));
            self.page
                .reserve((height_of(&title_rows) + first_group).min(self.config.content_height()));
            self.page.place_group(&title_rows);
        }

        for (group, gap) in groups {
            self.page.place_group(&group);
            self.page.gap(gap);
        }
    }

    /// Height that must fit below a section header: the entry's title block plus the
    /// first group under it.
    fn lead_height(&self, entry: &Entry) -> f32 {
        let title = height_of(&self.title_rows(entry));
        let first = self
            .body_groups(entry)
            .first()
            .map_or(0.0, |(g, _)| height_of(g));
        title + first
    }

    /// Paragraphs, then categories, then bullets with their dividers; one row group
    /// each, paired with the whitespace that follows it.
    fn body_groups(&self, entry: &Entry) -> Vec<(Vec<Row>, f32)> {
        let gap = self.config.paragraph_gap;
        let mut groups: Vec<(Vec<Row>, f32)> = entry
            .free_text
            .iter()
            .map(|p| (self.paragraph_rows(p), gap))
            .chain(entry.categories.iter().map(|c| (self.category_rows(c), 0.0)))
            .collect();

        for at in 0..=entry.bullets.len() {
            if entry.dividers.contains(&at) {
                groups.push((vec![Row::rule(self.config, 0.5, DIVIDER_HEIGHT)], 0.0));
            }
            if let Some(bullet) = entry.bullets.get(at) {
                groups.push((self.bullet_rows(bullet), 0.0));
            }
        }
        groups
    }

    /// Title lines, with the date right-aligned on the first line when it came from the
    /// same input line, or on an italic line below otherwise.
    fn title_rows(&self, entry: &Entry) -> Vec<Row> {
        let cfg = self.config;
        let mut rows = Vec::new();
        let right_edge = cfg.page_width - cfg.margin;

        let inline_date = entry.date_label.as_deref().filter(|_| entry.date_inline);
        let title_width = match inline_date {
            Some(date) => {
                let date_w = get_metrics(Face::Sans).width_pt(date, cfg.body_size);
                (cfg.content_width() - date_w - 12.0).max(cfg.content_width() / 2.0)
            }
            None => cfg.content_width(),
        };

        if !entry.title.is_empty() {
            let lines = wrap_text(&entry.title, Face::SansBold, cfg.title_size, title_width);
            for (i, line) in lines.into_iter().enumerate() {
                let mut row = Row::text(cfg, line, cfg.margin, Face::SansBold, cfg.title_size, Align::Left);
                if i == 0 {
                    if let Some(date) = inline_date {
                        row.items.push(RowItem::Text {
                            text: date.to_string(),
                            x: right_edge,
                            face: Face::Sans,
                            size: cfg.body_size,
                            align: Align::Right,
                        });
                    }
                }
                rows.push(row);
            }
        }

        if let Some(date) = entry.date_label.as_deref() {
            if !entry.date_inline || entry.title.is_empty() {
                rows.push(Row::text(
                    cfg,
                    date.to_string(),
                    cfg.margin,
                    Face::SansOblique,
                    cfg.small_size,
                    Align::Left,
                ));
            }
        }
        rows
    }

    fn paragraph(&mut self, text: &str) {
        let rows = self.paragraph_rows(text);
        self.page.place_group(&rows);
        self.page.gap(self.config.paragraph_gap);
    }

    fn paragraph_rows(&self, text: &str) -> Vec<Row> {
        let cfg = self.config;
        wrap_text(text, Face::Sans, cfg.body_size, cfg.content_width())
            .into_iter()
            .map(|line| Row::text(cfg, line, cfg.margin, Face::Sans, cfg.body_size, Align::Left))
            .collect()
    }

    /// Bold label followed by the comma-joined items, continuation lines hung under the items.
    fn category_rows(&self, category: &Category) -> Vec<Row> {
        let cfg = self.config;
        let label = format!("{}:", category.label);
        let label_w = get_metrics(Face::SansBold).width_pt(&label, cfg.body_size)
            + get_metrics(Face::Sans).space_width * cfg.body_size;
        let indent = label_w.min(cfg.content_width() / 2.0);
        let items_x = cfg.margin + indent;

        let lines = wrap_text(
            &category.items.join(", "),
            Face::Sans,
            cfg.body_size,
            cfg.content_width() - indent,
        );

        let mut rows = vec![Row::text(cfg, label, cfg.margin, Face::SansBold, cfg.body_size, Align::Left)];
        for (i, line) in lines.into_iter().enumerate() {
            if i == 0 {
                rows[0].items.push(RowItem::Text {
                    text: line,
                    x: items_x,
                    face: Face::Sans,
                    size: cfg.body_size,
                    align: Align::Left,
                });
            } else {
                rows.push(Row::text(cfg, line, items_x, Face::Sans, cfg.body_size, Align::Left));
            }
        }
        rows
    }

    /// Bullet glyph on the first line, text hung at `bullet_indent`.
    fn bullet_rows(&self, text: &str) -> Vec<Row> {
        let cfg = self.config;
        let text_x = cfg.margin + cfg.bullet_indent;
        let lines = wrap_text(text, Face::Sans, cfg.body_size, cfg.content_width() - cfg.bullet_indent);

        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let mut row = Row::text(cfg, line, text_x, Face::Sans, cfg.body_size, Align::Left);
                if i == 0 {
                    row.items.insert(
                        0,
                        RowItem::Text {
                            text: BULLET_GLYPH.to_string(),
                            x: cfg.margin + cfg.bullet_indent * 0.3,
                            face: Face::Sans,
                            size: cfg.body_size,
                            align: Align::Left,
                        },
                    );
                }
                row
            })
            .collect()
    }

    fn score_footer(&mut self, score: &str) {
        let cfg = self.config;
        self.page.gap(cfg.section_gap);
        let row = Row::text(
            cfg,
            score_footer_text(score),
            cfg.page_width / 2.0,
            Face::SansOblique,
            cfg.small_size,
            Align::Center,
        );
        self.page.place_group(&[row]);
    }
}

fn height_of(rows: &[Row]) -> f32 {
    rows.iter().map(|r| r.height).sum()
}

pub const BULLET_GLYPH: &str = "•";

/// Vertical space taken by a divider line, rule centred.
const DIVIDER_HEIGHT: f32 = 8.0;

pub fn score_footer_text(score: &str) -> String {
    format!("ATS Optimization Score: {score}/100 | Generated by ApplyIQ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::document::parse_document;

    fn text_row(cfg: &LayoutConfig, s: &str) -> Row {
        Row::text(cfg, s.to_string(), cfg.margin, Face::Sans, cfg.body_size, Align::Left)
    }

    fn layout(text: &str, score: Option<&str>) -> LaidOutDocument {
        let cfg = LayoutConfig::default();
        let doc = parse_document(text, &cfg.classifier);
        layout_document(&doc, score, &cfg)
    }

    fn text_of(cmd: &DrawCommand) -> (&str, f32, f32, Face, Align) {
        match cmd {
            DrawCommand::Text {
                text,
                x,
                y,
                face,
                align,
                ..
            } => (text.as_str(), *x, *y, *face, *align),
            DrawCommand::Rule { .. } => panic!("not a text command"),
        }
    }

    fn long_resume(roles: usize, bullets_per_role: usize) -> String {
        let mut text = String::from("JANE DOE\njane@example.com | +1 555 0100\n");
        for section in ["EXPERIENCE", "PROJECTS"] {
            text.push_str(section);
            text.push('\n');
            for r in 0..roles {
                text.push_str(&format!("Senior Analyst {r} | Acme Corp (Jan 2020 - Present)\n"));
                for b in 0..bullets_per_role {
                    text.push_str(&format!(
                        "• Bullet {r}-{b} led a cross-functional initiative that reduced reporting \
                         latency by thirty percent while migrating legacy dashboards to a modern stack\n"
                    ));
                }
            }
        }
        text
    }

    #[test]
    fn test_default_config_is_valid_a4() {
        let cfg = LayoutConfig::default();
        assert!(cfg.validate().is_ok());
        assert!((cfg.page_width - 595.28).abs() < 0.01);
        assert!((cfg.page_height - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_validate_rejects_huge_margin() {
        let cfg = LayoutConfig {
            margin: 290.0,
            ..LayoutConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_group_never_splits_at_any_start_position() {
        let cfg = LayoutConfig::default();
        let rows: Vec<Row> = (0..4).map(|i| text_row(&cfg, &format!("line {i}"))).collect();

        let mut offset = 0.0;
        while offset < cfg.content_height() {
            let mut page = PageLayout::new(&cfg);
            page.gap(0.5); // leave the page top so reserve may break
            page.gap(offset);
            page.place_group(&rows);

            let doc = page.finish(&cfg);
            let pages_with_text: Vec<usize> = doc
                .pages
                .iter()
                .enumerate()
                .filter(|(_, p)| !p.commands.is_empty())
                .map(|(i, _)| i)
                .collect();
            assert_eq!(pages_with_text.len(), 1, "group split at offset {offset}");
            for (_, cmd) in doc.texts() {
                let (_, _, y, _, _) = text_of(cmd);
                assert!(y <= cfg.page_height - cfg.margin + 0.01);
            }
            offset += 3.7;
        }
    }

    #[test]
    fn test_oversized_group_flows_line_by_line() {
        let cfg = LayoutConfig::default();
        let rows: Vec<Row> = (0..120).map(|i| text_row(&cfg, &format!("line {i}"))).collect();

        let mut page = PageLayout::new(&cfg);
        page.place_group(&rows);
        let doc = page.finish(&cfg);

        assert!(doc.pages.len() >= 2);
        assert_eq!(doc.texts().count(), 120);
        for (_, cmd) in doc.texts() {
            let (_, _, y, _, _) = text_of(cmd);
            assert!(y >= cfg.margin && y <= cfg.page_height - cfg.margin + 0.01);
        }
    }

    #[test]
    fn test_gap_is_swallowed_at_page_top() {
        let cfg = LayoutConfig::default();
        let mut page = PageLayout::new(&cfg);
        page.gap(20.0);
        assert_eq!(page.y, cfg.margin);
    }

    #[test]
    fn test_canonical_layout() {
        let doc = layout(
            "JANE DOE\njane@example.com | +1 555 0100\nEXPERIENCE\n\
             Senior Analyst | Acme Corp | Remote (Jan 2022 - Present)\n\
             • Led a 4-person team to cut latency by 30%\n• Shipped two major releases\n\
             EDUCATION\nBSc Economics | State University | 2019\n",
            None,
        );
        assert_eq!(doc.pages.len(), 1);

        let texts: Vec<_> = doc.texts().map(|(_, c)| text_of(c)).collect();
        let (name, _, name_y, name_face, name_align) = texts[0];
        assert_eq!(name, "JANE DOE");
        assert_eq!(name_face, Face::SerifBold);
        assert_eq!(name_align, Align::Center);

        let title = texts
            .iter()
            .find(|t| t.0 == "Senior Analyst | Acme Corp | Remote")
            .unwrap();
        let date = texts.iter().find(|t| t.0 == "Jan 2022 - Present").unwrap();
        assert_eq!(date.4, Align::Right);
        assert_eq!(date.2, title.2);
        assert!(title.2 > name_y);

        let bullets = texts.iter().filter(|t| t.0 == BULLET_GLYPH).count();
        assert_eq!(bullets, 2);

        let headers: Vec<&str> = texts
            .iter()
            .filter(|t| t.3 == Face::SerifBold && t.0 != "JANE DOE")
            .map(|t| t.0)
            .collect();
        assert_eq!(headers, vec!["EXPERIENCE", "EDUCATION"]);
    }

    #[test]
    fn test_standalone_date_goes_beneath_title_in_italic() {
        let doc = layout("EXPERIENCE\nSenior Analyst | Acme Corp\nJan 2022 - Present\n• Did it", None);
        let texts: Vec<_> = doc.texts().map(|(_, c)| text_of(c)).collect();
        let title = texts.iter().find(|t| t.0 == "Senior Analyst | Acme Corp").unwrap();
        let date = texts.iter().find(|t| t.0 == "Jan 2022 - Present").unwrap();
        assert_eq!(date.3, Face::SansOblique);
        assert_eq!(date.4, Align::Left);
        assert!(date.2 > title.2);
    }

    #[test]
    fn test_cursor_is_monotonic_within_each_page() {
        let doc = layout(&long_resume(6, 6), Some("88"));
        assert!(doc.pages.len() >= 2);
        for page in &doc.pages {
            let mut last_y = 0.0_f32;
            for cmd in &page.commands {
                let y = match cmd {
                    DrawCommand::Text { y, .. } | DrawCommand::Rule { y, .. } => *y,
                };
                assert!(y + 0.01 >= last_y, "cursor moved up: {y} < {last_y}");
                last_y = last_y.max(y);
            }
        }
    }

    #[test]
    fn test_no_page_starts_with_bullet_continuation() {
        let cfg = LayoutConfig::default();
        let doc = layout(&long_resume(6, 6), None);
        let text_x = cfg.margin + cfg.bullet_indent;

        for page in doc.pages.iter().skip(1) {
            let first = page
                .commands
                .iter()
                .find(|c| matches!(c, DrawCommand::Text { .. }))
                .unwrap();
            let (_, x, y, _, _) = text_of(first);
            if (x - text_x).abs() < 0.01 {
                let has_glyph = page.commands.iter().any(|c| match c {
                    DrawCommand::Text { text, y: gy, .. } => text == BULLET_GLYPH && (*gy - y).abs() < 0.01,
                    _ => false,
                });
                assert!(has_glyph, "page starts mid-bullet");
            }
        }
    }

    #[test]
    fn test_section_header_is_never_last_on_page() {
        let cfg = LayoutConfig::default();
        let doc = layout(&long_resume(6, 6), None);
        for page in &doc.pages {
            let texts: Vec<_> = page
                .commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Text { .. }))
                .map(text_of)
                .collect();
            if let Some(last) = texts.last() {
                assert!(
                    !(last.3 == Face::SerifBold && (last.1 - cfg.margin).abs() < 0.01),
                    "header {} stranded at page bottom",
                    last.0
                );
            }
        }
    }

    #[test]
    fn test_score_footer_is_last_text() {
        let doc = layout("JANE DOE\nEXPERIENCE\nDev | Acme\n• Built it", Some("85"));
        let (_, last) = doc.texts().last().unwrap();
        let (text, _, _, face, _) = text_of(last);
        assert_eq!(text, "ATS Optimization Score: 85/100 | Generated by ApplyIQ");
        assert_eq!(face, Face::SansOblique);
    }

    #[test]
    fn test_no_sections_renders_plain_paragraphs() {
        let doc = layout("Jane Doe\njane@example.com\nI build data pipelines.", None);
        let texts: Vec<&str> = doc.texts().map(|(_, c)| text_of(c).0).collect();
        assert_eq!(texts, vec!["JANE DOE", "jane@example.com", "I build data pipelines."]);
    }

    #[test]
    fn test_layout_plain_keeps_every_line() {
        let cfg = LayoutConfig::default();
        let doc = layout_plain("first line\n\nsecond line\n", Some("70"), &cfg);
        let texts: Vec<&str> = doc.texts().map(|(_, c)| text_of(c).0).collect();
        assert_eq!(
            texts,
            vec![
                "first line",
                "second line",
                "ATS Optimization Score: 70/100 | Generated by ApplyIQ"
            ]
        );
    }

    fn rule_ys(doc: &LaidOutDocument) -> Vec<f32> {
        doc.pages
            .iter()
            .flat_map(|p| &p.commands)
            .filter_map(|c| match c {
                DrawCommand::Rule { y, .. } => Some(*y),
                DrawCommand::Text { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_divider_draws_a_rule_between_bullets() {
        let base = "JANE DOE\nEXPERIENCE\nAnalyst | Acme\n• first bullet\n";
        let with = layout(&format!("{base}__________\n• second bullet"), None);
        let without = layout(&format!("{base}• second bullet"), None);

        let with_rules = rule_ys(&with);
        assert_eq!(with_rules.len(), rule_ys(&without).len() + 1);

        let texts: Vec<_> = with.texts().map(|(_, c)| text_of(c)).collect();
        let first = texts.iter().find(|t| t.0 == "first bullet").unwrap();
        let second = texts.iter().find(|t| t.0 == "second bullet").unwrap();
        let divider = with_rules.last().unwrap();
        assert!(*divider > first.2 && *divider < second.2);
    }

    #[test]
    fn test_divider_under_section_header_adds_no_rule() {
        let with = layout("JANE DOE\nEXPERIENCE\n__________\nAnalyst | Acme\n• one", None);
        let without = layout("JANE DOE\nEXPERIENCE\nAnalyst | Acme\n• one", None);
        assert_eq!(rule_ys(&with).len(), rule_ys(&without).len());
    }

    #[test]
    fn test_category_label_is_bold_and_items_follow() {
        let doc = layout("SKILLS\nLanguages: Python, SQL, Rust", None);
        let texts: Vec<_> = doc.texts().map(|(_, c)| text_of(c)).collect();
        let label = texts.iter().find(|t| t.0 == "Languages:").unwrap();
        let items = texts.iter().find(|t| t.0 == "Python, SQL, Rust").unwrap();
        assert_eq!(label.3, Face::SansBold);
        assert_eq!(items.3, Face::Sans);
        assert_eq!(label.2, items.2);
        assert!(items.1 > label.1);
    }
}
