//! Render backends. `render` replays a laid-out document onto any `Canvas`.

use crate::compose::font_metrics::Face;
use crate::compose::paginate::{Align, DrawCommand, LaidOutDocument};
use crate::compose::ComposeError;

/// Minimal drawing surface. Coordinates are points from the top-left corner; `y` is
/// the text baseline.
pub trait Canvas {
    fn set_font(&mut self, face: Face, size: f32);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, align: Align);
    fn draw_rule(&mut self, x1: f32, x2: f32, y: f32, thickness: f32);
    /// Starts the next page. The first page exists before any call.
    fn new_page(&mut self);
    fn finish(self) -> Result<Vec<u8>, ComposeError>
    where
        Self: Sized;
}

/// Replays every page in order. Font changes are only issued when the face or size changes.
pub fn render<C: Canvas>(layout: &LaidOutDocument, canvas: &mut C) {
    let mut font: Option<(Face, f32)> = None;

    for (index, page) in layout.pages.iter().enumerate() {
        if index > 0 {
            canvas.new_page();
            font = None;
        }
        for command in &page.commands {
            match command {
                DrawCommand::Text {
                    text,
                    x,
                    y,
                    face,
                    size,
                    align,
                } => {
                    if font != Some((*face, *size)) {
                        canvas.set_font(*face, *size);
                        font = Some((*face, *size));
                    }
                    canvas.draw_text(text, *x, *y, *align);
                }
                DrawCommand::Rule {
                    x1,
                    x2,
                    y,
                    thickness,
                } => canvas.draw_rule(*x1, *x2, *y, *thickness),
            }
        }
    }
}
