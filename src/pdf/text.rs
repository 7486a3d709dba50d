//! Per-page text access for the codebook PDF.
//!
//! The heading-detection and row-parsing heuristics only need page text,
//! so PDF access sits behind a small seam; tests feed plain strings.

use std::path::Path;

use lopdf::Document;

use super::error::ExtractionError;

/// Provides the text of every page of a PDF, in page order.
pub trait PdfTextSource: Send + Sync {
    /// Returns one string per page, index 0 being the first page.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// Production text source backed by lopdf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextSource;

impl PdfTextSource for LopdfTextSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let document = Document::load(path).map_err(|e| ExtractionError::pdf(path, e))?;

        let mut texts = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = document
                .extract_text(&[*page_number])
                .map_err(|e| ExtractionError::pdf(path, e))?;
            texts.push(text);
        }

        Ok(texts)
    }
}
