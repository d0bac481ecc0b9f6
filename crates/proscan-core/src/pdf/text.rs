//! Documents whose text was extracted ahead of time.

use super::{PagedDocument, Result};
use crate::error::PdfError;

/// Form feed, the conventional page separator in plain-text dumps.
const PAGE_BREAK: char = '\u{0C}';

/// In-memory pages of already-extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    pages: Vec<String>,
}

impl TextDocument {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }

    /// Split a plain-text dump into pages on form feeds.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.split(PAGE_BREAK).map(str::to_string).collect())
    }
}

impl PagedDocument for TextDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or(PdfError::InvalidPage(page))
    }
}
