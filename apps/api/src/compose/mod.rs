// Résumé composition: heuristic line classification, document grouping, paginated
// layout and the PDF backend. Pure and synchronous; handlers call it on the blocking pool.

pub mod canvas;
pub mod classify;
pub mod dates;
pub mod document;
pub mod font_metrics;
pub mod paginate;
pub mod pdf;

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;
use tracing::{debug, warn};

pub use document::parse_document;
pub use paginate::{layout_document, layout_plain, LaidOutDocument, LayoutConfig};
pub use pdf::{render_pdf, resume_filename, PDF_CONTENT_TYPE};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("nothing to compose: résumé text is empty")]
    EmptyInput,

    #[error("invalid layout config: {0}")]
    InvalidConfig(String),

    #[error("render failed: {0}")]
    Render(String),
}

#[derive(Debug, Clone)]
pub struct ComposedResume {
    pub layout: LaidOutDocument,
    /// Structured layout failed and the plain-paragraph layout was used instead.
    pub degraded: bool,
}

/// PDF bytes plus what the layout pass reported.
#[derive(Debug, Clone)]
pub struct RenderedResume {
    pub pdf: Vec<u8>,
    pub pages: usize,
    pub degraded: bool,
}

/// Parses and lays out optimized résumé text.
///
/// Any failure inside the structured path degrades to `layout_plain` with a warning;
/// only empty input or an unusable config is an error.
pub fn compose(
    text: &str,
    ats_score: Option<&str>,
    config: &LayoutConfig,
) -> Result<ComposedResume, ComposeError> {
    if text.trim().is_empty() {
        return Err(ComposeError::EmptyInput);
    }
    config.validate().map_err(ComposeError::InvalidConfig)?;

    let structured = catch_unwind(AssertUnwindSafe(|| {
        let document = parse_document(text, &config.classifier);
        let layout = layout_document(&document, ats_score, config);
        debug!(
            sections = document.sections.len(),
            pages = layout.pages.len(),
            "Composed structured résumé"
        );
        layout
    }));

    match structured {
        Ok(layout) => Ok(ComposedResume {
            layout,
            degraded: false,
        }),
        Err(_) => {
            warn!("Structured layout failed; falling back to plain paragraphs");
            Ok(ComposedResume {
                layout: layout_plain(text, ats_score, config),
                degraded: true,
            })
        }
    }
}

/// `compose` followed by the PDF backend.
pub fn compose_pdf(
    text: &str,
    ats_score: Option<&str>,
    config: &LayoutConfig,
) -> Result<RenderedResume, ComposeError> {
    let composed = compose(text, ats_score, config)?;
    Ok(RenderedResume {
        pdf: render_pdf(&composed.layout)?,
        pages: composed.layout.pages.len(),
        degraded: composed.degraded,
    })
}
