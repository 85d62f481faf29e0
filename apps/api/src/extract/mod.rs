// Résumé text extraction from uploaded PDFs.
// pdf-extract is CPU-bound and may panic on malformed files, so it always runs on the
// blocking pool; a panic surfaces as a JoinError and maps to `ExtractError::Failed`.

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("uploaded file is not a PDF")]
    NotPdf,

    #[error("no extractable text found in PDF")]
    NoText,

    #[error("PDF text extraction failed: {0}")]
    Failed(String),
}

/// Extracts and normalizes the text of a PDF upload.
pub async fn extract_resume_text(bytes: Bytes) -> Result<String, ExtractError> {
    if !is_pdf(&bytes) {
        return Err(ExtractError::NotPdf);
    }

    let size = bytes.len();
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| ExtractError::Failed(format!("extraction task aborted: {e}")))?
        .map_err(|e| ExtractError::Failed(e.to_string()))?;

    let text = normalize_text(&raw);
    if text.is_empty() {
        return Err(ExtractError::NoText);
    }
    debug!(bytes = size, chars = text.len(), "Extracted résumé text from PDF");
    Ok(text)
}

/// Leading whitespace before the header is tolerated, as PDF readers do.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(PDF_MAGIC)
}

/// Unifies line endings, trims trailing whitespace, collapses blank-line runs to one.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in unified.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { line });
        previous_blank = blank;
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose_pdf, LayoutConfig};

    #[test]
    fn test_is_pdf_checks_magic() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(is_pdf(b"\n  %PDF-1.4"));
        assert!(!is_pdf(b"PK\x03\x04 docx"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "\r\n\r\nJANE DOE  \r\n\r\n\r\n\nEXPERIENCE\r   \nAnalyst\n\n\n";
        assert_eq!(normalize_text(raw), "JANE DOE\n\nEXPERIENCE\n\nAnalyst");
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let err = extract_resume_text(Bytes::from_static(b"plain text resume"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::NotPdf));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_a_failure_not_a_crash() {
        let err = extract_resume_text(Bytes::from_static(b"%PDF-1.4\nthis is not a pdf body"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Failed(_)));
    }

    #[tokio::test]
    async fn test_extracts_text_from_composed_pdf() {
        let rendered = compose_pdf(
            "JANE DOE\nEXPERIENCE\nAnalyst | Acme\n• Maintained reporting pipelines",
            None,
            &LayoutConfig::default(),
        )
        .unwrap();
        let text = extract_resume_text(Bytes::from(rendered.pdf)).await.unwrap();
        assert!(text.contains("pipelines"), "extracted: {text:?}");
    }
}
