//! Invoice classification and field extraction.

mod classifier;
mod parser;
pub mod rules;

pub use classifier::{Classification, DocumentClassifier};
pub use parser::InvoiceParser;

use crate::error::ExtractionError;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice field extractors.
pub trait InvoiceExtractor {
    /// Extract an invoice record from the full text of a classified document.
    fn extract_fields(&self, text: &str) -> Result<InvoiceRecord>;
}
