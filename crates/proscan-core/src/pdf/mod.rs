//! Page-addressable documents and text extraction.

mod extractor;
mod text;

pub use extractor::PdfDocument;
pub use text::TextDocument;

use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// An opened document whose pages can be read one at a time.
pub trait PagedDocument {
    /// Get the number of pages.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Concatenates page text in page order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor {
    first_page_only: bool,
}

impl TextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read only the first page of each document.
    pub fn with_first_page_only(mut self, first_page_only: bool) -> Self {
        self.first_page_only = first_page_only;
        self
    }

    /// Full text of the document, one line break between pages.
    ///
    /// A page that yields no text contributes an empty segment.
    pub fn extract(&self, document: &dyn PagedDocument) -> String {
        let page_count = document.page_count();
        let last_page = if self.first_page_only {
            page_count.min(1)
        } else {
            page_count
        };

        let mut segments = Vec::with_capacity(last_page as usize);
        for page in 1..=last_page {
            let text = document.extract_page_text(page).unwrap_or_else(|e| {
                debug!("Page {} yielded no text: {}", page, e);
                String::new()
            });
            segments.push(text);
        }

        debug!(
            "Extracted {} chars from {} of {} pages",
            segments.iter().map(String::len).sum::<usize>(),
            last_page,
            page_count
        );

        segments.join("\n")
    }
}
