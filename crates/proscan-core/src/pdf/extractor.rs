//! PDF page text extraction using lopdf.

use lopdf::Document;
use tracing::debug;

use super::{PagedDocument, Result};
use crate::error::PdfError;

/// An opened PDF. The parsed document is released when this value drops.
pub struct PdfDocument {
    document: Document,
}

impl PdfDocument {
    /// Parse a PDF from bytes.
    ///
    /// Documents encrypted with an empty user password are decrypted; any
    /// other encryption is an error. A document without pages is accepted
    /// and simply yields no text.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self { document })
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.page_count())
            .finish()
    }
}

impl PagedDocument for PdfDocument {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        if !self.document.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }

        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction {
                page,
                reason: e.to_string(),
            })
    }
}
