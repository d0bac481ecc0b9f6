//! Core library for freight invoice scanning.
//!
//! This crate provides:
//! - Page-ordered text extraction from PDFs (lopdf)
//! - Marker-count classification of invoice documents
//! - Field extraction (PRO number, date, piece count, load ID) with a
//!   piece-count consistency check
//! - A batch pipeline that isolates per-document failures and orders
//!   records by invoice date

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod pipeline;

pub use error::{ExtractionError, PdfError, ProscanError, Result};
pub use invoice::{Classification, DocumentClassifier, InvoiceExtractor, InvoiceParser};
pub use models::config::ProscanConfig;
pub use models::invoice::{InvoiceRecord, NOT_FOUND, UNSET_DATE};
pub use pdf::{PagedDocument, PdfDocument, TextDocument, TextExtractor};
pub use pipeline::{
    BatchOutput, Diagnostic, DiagnosticKind, DocumentContent, DocumentOutcome, DocumentSource,
    ExtractedText, Pipeline, ReportSink, SourceDocument,
};
