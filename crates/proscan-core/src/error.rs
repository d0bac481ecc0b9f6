//! Error types for the proscan-core library.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the proscan library.
#[derive(Error, Debug)]
pub enum ProscanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document source could not enumerate its documents.
    #[error("document source failed: {0}")]
    Source(String),

    /// The reporting sink could not write the records.
    #[error("report failed: {0}")]
    Report(String),

    /// The batch was cancelled before every document was processed.
    #[error("batch cancelled after {processed} documents")]
    Cancelled { processed: usize },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from a page.
    #[error("failed to extract text from page {page}: {reason}")]
    TextExtraction { page: u32, reason: String },

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The matched amount is not a whole number of pieces.
    #[error("amount {amount} is not a multiple of the piece rate {rate}")]
    IntegrityViolation { amount: Decimal, rate: Decimal },

    /// Failed to parse a matched value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },

    /// A configured pattern does not compile or lacks a required group.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },
}

impl ExtractionError {
    /// Whether this is the piece-count consistency failure.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, ExtractionError::IntegrityViolation { .. })
    }
}

/// Result type for the proscan library.
pub type Result<T> = std::result::Result<T, ProscanError>;
