//! PDF backend built on lopdf: A4 pages, the four standard Type1 faces, WinAnsi text.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::compose::canvas::{render, Canvas};
use crate::compose::font_metrics::{get_metrics, Face};
use crate::compose::paginate::{Align, LaidOutDocument};
use crate::compose::ComposeError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Download name for a rendered résumé, e.g. `Resume_ATS_Optimized_2026-10-18_094500.pdf`.
pub fn resume_filename(now: DateTime<Utc>) -> String {
    format!("Resume_ATS_Optimized_{}.pdf", now.format("%Y-%m-%d_%H%M%S"))
}

/// Renders a laid-out document to PDF bytes.
pub fn render_pdf(layout: &LaidOutDocument) -> Result<Vec<u8>, ComposeError> {
    let mut canvas = PdfCanvas::new(layout.page_width, layout.page_height);
    render(layout, &mut canvas);
    canvas.finish()
}

pub struct PdfCanvas {
    page_width: f32,
    page_height: f32,
    pages: Vec<Vec<Operation>>,
    font: (Face, f32),
}

impl PdfCanvas {
    pub fn new(page_width: f32, page_height: f32) -> Self {
        Self {
            page_width,
            page_height,
            pages: vec![Vec::new()],
            font: (Face::Sans, 10.0),
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Page-space y (origin bottom-left).
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }
}

impl Canvas for PdfCanvas {
    fn set_font(&mut self, face: Face, size: f32) {
        self.font = (face, size);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: Align) {
        let (face, size) = self.font;
        let width = get_metrics(face).width_pt(text, size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let baseline = self.flip(y);

        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(face.resource_name().as_bytes().to_vec()), real(size)],
        ));
        ops.push(Operation::new("Td", vec![real(left), real(baseline)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn draw_rule(&mut self, x1: f32, x2: f32, y: f32, thickness: f32) {
        let y = self.flip(y);
        let ops = self.ops();
        ops.push(Operation::new("w", vec![real(thickness)]));
        ops.push(Operation::new("m", vec![real(x1), real(y)]));
        ops.push(Operation::new("l", vec![real(x2), real(y)]));
        ops.push(Operation::new("S", vec![]));
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn finish(self) -> Result<Vec<u8>, ComposeError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in Face::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations }
                .encode()
                .map_err(|e| ComposeError::Render(format!("content stream: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), real(self.page_width), real(self.page_height)],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| ComposeError::Render(format!("pdf write: {e}")))?;
        Ok(bytes)
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// Maps text to WinAnsi bytes. Latin-1 passes through, common typographic punctuation
/// takes its cp1252 slot, anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' | '●' | '▪' | '◦' | '∙' | '‣' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::document::parse_document;
    use crate::compose::paginate::{layout_document, LayoutConfig};
    use chrono::TimeZone;

    #[test]
    fn test_resume_filename_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 45, 0).unwrap();
        assert_eq!(resume_filename(now), "Resume_ATS_Optimized_2026-10-18_094500.pdf");
    }

    #[test]
    fn test_win_ansi_mapping() {
        assert_eq!(encode_win_ansi("Ab 1"), b"Ab 1".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("• – — ’"), vec![0x95, b' ', 0x96, b' ', 0x97, b' ', 0x92]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_render_pdf_produces_loadable_document() {
        let cfg = LayoutConfig::default();
        let doc = parse_document(
            "JANE DOE\njane@example.com\nEXPERIENCE\nAnalyst | Acme (2020 - 2022)\n• Built reports",
            &cfg.classifier,
        );
        let layout = layout_document(&doc, Some("91"), &cfg);

        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let loaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(loaded.get_pages().len(), layout.pages.len());
    }

    #[test]
    fn test_multi_page_layout_yields_multi_page_pdf() {
        let cfg = LayoutConfig::default();
        let text: String = std::iter::once("JANE DOE\nEXPERIENCE\nAnalyst | Acme\n".to_string())
            .chain((0..120).map(|i| format!("• Bullet number {i} about shipping dashboards\n")))
            .collect();
        let layout = layout_document(&parse_document(&text, &cfg.classifier), None, &cfg);
        assert!(layout.pages.len() > 1);

        let loaded = Document::load_mem(&render_pdf(&layout).unwrap()).unwrap();
        assert_eq!(loaded.get_pages().len(), layout.pages.len());
    }
}
