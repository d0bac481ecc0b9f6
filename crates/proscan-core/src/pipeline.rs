//! Batch pipeline: classify, extract, collect, and sort invoice records.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ExtractionError, PdfError, ProscanError};
use crate::invoice::{Classification, DocumentClassifier, InvoiceExtractor, InvoiceParser};
use crate::models::config::ProscanConfig;
use crate::models::invoice::{sort_by_date, InvoiceRecord};
use crate::pdf::{PagedDocument, PdfDocument, TextDocument, TextExtractor};

/// Content of a document handed over by a [`DocumentSource`].
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// Raw PDF bytes, opened by the pipeline.
    Pdf(Vec<u8>),
    /// Text that was extracted ahead of time.
    Text(TextDocument),
}

/// A named document awaiting processing.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Display name used in diagnostics (usually a file or attachment name).
    pub name: String,
    pub content: DocumentContent,
}

impl SourceDocument {
    pub fn pdf(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: DocumentContent::Pdf(data),
        }
    }

    pub fn text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            content: DocumentContent::Text(TextDocument::from_text(text)),
        }
    }
}

/// Supplies the documents for one batch.
///
/// An error here is fatal to the batch.
pub trait DocumentSource {
    fn documents(&mut self) -> crate::Result<Vec<SourceDocument>>;
}

impl DocumentSource for Vec<SourceDocument> {
    fn documents(&mut self) -> crate::Result<Vec<SourceDocument>> {
        Ok(std::mem::take(self))
    }
}

/// Receives the final, date-ordered records.
///
/// An error here is fatal to the batch.
pub trait ReportSink {
    fn write_records(&mut self, records: &[InvoiceRecord]) -> crate::Result<()>;
}

/// What happened to a single document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Fields were extracted.
    Record(InvoiceRecord),
    /// Too few marker occurrences; not an error.
    Rejected { markers: usize, threshold: usize },
    /// The piece-count amount did not divide by the rate.
    IntegrityViolation(ExtractionError),
    /// The document could not be read or parsed.
    ExtractionFault(String),
}

/// Reason category attached to a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Skipped,
    IntegrityViolation,
    ExtractionFault,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Skipped => write!(f, "skipped"),
            DiagnosticKind::IntegrityViolation => write!(f, "check invoice"),
            DiagnosticKind::ExtractionFault => write!(f, "extraction failed"),
        }
    }
}

/// A line-oriented note about a skipped or dropped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub document: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.document, self.kind, self.message)
    }
}

/// Records and diagnostics from one batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// Accepted records in ascending date order.
    pub records: Vec<InvoiceRecord>,
    /// One entry per skipped or dropped document, in processing order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of documents examined.
    pub processed: usize,
}

impl BatchOutput {
    pub fn skipped(&self) -> usize {
        self.count(DiagnosticKind::Skipped)
    }

    pub fn dropped(&self) -> usize {
        self.diagnostics.len() - self.skipped()
    }

    fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

/// Text read from one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub pages: u32,
    pub text: String,
}

/// Classification and extraction over a batch of documents.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: DocumentClassifier,
    parser: InvoiceParser,
    text: TextExtractor,
    cancel: Option<Arc<AtomicBool>>,
}

impl Pipeline {
    pub fn new(classifier: DocumentClassifier, parser: InvoiceParser) -> Self {
        Self {
            classifier,
            parser,
            text: TextExtractor::new(),
            cancel: None,
        }
    }

    /// Build a pipeline from a validated configuration.
    pub fn from_config(config: &ProscanConfig) -> crate::Result<Self> {
        config.validate()?;
        let classifier = DocumentClassifier::from_config(&config.classifier)?;
        let parser = InvoiceParser::from_config(&config.extraction)?;
        Ok(Self::new(classifier, parser).with_text_extractor(
            TextExtractor::new().with_first_page_only(config.pdf.first_page_only),
        ))
    }

    pub fn with_text_extractor(mut self, text: TextExtractor) -> Self {
        self.text = text;
        self
    }

    /// Stop the batch at the next document boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn classifier(&self) -> &DocumentClassifier {
        &self.classifier
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Classify and extract already-extracted document text.
    pub fn process_text(&self, text: &str) -> DocumentOutcome {
        match self.classifier.classify(text) {
            Classification::OutOfScope { markers, threshold } => {
                DocumentOutcome::Rejected { markers, threshold }
            }
            Classification::InScope { .. } => match self.parser.extract_fields(text) {
                Ok(record) => DocumentOutcome::Record(record),
                Err(e) => e.into(),
            },
        }
    }

    /// Open a source document and extract its text.
    ///
    /// Panics raised by the PDF parser are contained and returned as
    /// [`PdfError::Parse`].
    pub fn read_text(&self, source: &SourceDocument) -> Result<ExtractedText, PdfError> {
        contain_panics(|| {
            let pdf;
            let document: &dyn PagedDocument = match &source.content {
                DocumentContent::Pdf(data) => {
                    pdf = PdfDocument::load(data)?;
                    &pdf
                }
                DocumentContent::Text(doc) => doc,
            };

            Ok(ExtractedText {
                pages: document.page_count(),
                text: self.text.extract(document),
            })
        })
    }

    /// Open and process one source document.
    pub fn process(&self, source: &SourceDocument) -> DocumentOutcome {
        match self.read_text(source) {
            Ok(extracted) => self.process_text(&extracted.text),
            Err(e) => DocumentOutcome::ExtractionFault(e.to_string()),
        }
    }

    /// Process every document, isolating failures, and sort the records by date.
    ///
    /// Only cancellation fails the batch; per-document failures become
    /// diagnostics.
    pub fn run<'a, I>(&self, documents: I) -> crate::Result<BatchOutput>
    where
        I: IntoIterator<Item = &'a SourceDocument>,
    {
        let mut output = BatchOutput::default();

        for source in documents {
            if self.is_cancelled() {
                warn!("Batch cancelled after {} documents", output.processed);
                return Err(ProscanError::Cancelled {
                    processed: output.processed,
                });
            }

            output.processed += 1;
            debug!("Parsing and filtering: {}", source.name);

            match self.process(source) {
                DocumentOutcome::Record(record) => {
                    info!(
                        "Invoice details for {}: PRO# {}, date {}, pieces {}, load ID {}",
                        source.name,
                        record.tracking_number(),
                        record.invoice_date(),
                        record.piece_count(),
                        record.load_id()
                    );
                    output.records.push(record);
                }
                DocumentOutcome::Rejected { markers, threshold } => {
                    output.diagnostics.push(Diagnostic {
                        document: source.name.clone(),
                        kind: DiagnosticKind::Skipped,
                        message: format!(
                            "'{}' appeared {} times, which is less than {}",
                            self.classifier.marker(),
                            markers,
                            threshold
                        ),
                    });
                }
                DocumentOutcome::IntegrityViolation(e) => {
                    warn!("Dropping {}: {}", source.name, e);
                    output.diagnostics.push(Diagnostic {
                        document: source.name.clone(),
                        kind: DiagnosticKind::IntegrityViolation,
                        message: e.to_string(),
                    });
                }
                DocumentOutcome::ExtractionFault(reason) => {
                    warn!("Dropping {}: {}", source.name, reason);
                    output.diagnostics.push(Diagnostic {
                        document: source.name.clone(),
                        kind: DiagnosticKind::ExtractionFault,
                        message: reason,
                    });
                }
            }
        }

        sort_by_date(&mut output.records);

        info!(
            "Processed {} documents: {} records, {} skipped, {} dropped",
            output.processed,
            output.records.len(),
            output.skipped(),
            output.dropped()
        );

        Ok(output)
    }

    /// Pull documents from `source`, run the batch, and hand the records to `sink`.
    pub fn run_batch(
        &self,
        source: &mut dyn DocumentSource,
        sink: &mut dyn ReportSink,
    ) -> crate::Result<BatchOutput> {
        let documents = source.documents()?;
        let output = self.run(&documents)?;
        sink.write_records(&output.records)?;
        Ok(output)
    }
}

fn contain_panics<T>(f: impl FnOnce() -> Result<T, PdfError>) -> Result<T, PdfError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        Err(PdfError::Parse(
            "PDF parser panicked (malformed document)".to_string(),
        ))
    })
}

impl From<ExtractionError> for DocumentOutcome {
    fn from(e: ExtractionError) -> Self {
        if e.is_integrity_violation() {
            DocumentOutcome::IntegrityViolation(e)
        } else {
            DocumentOutcome::ExtractionFault(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const MARKERS: &str = "HUNTINGTON PARK\nHuntington Park\nhuntington park\nHUNTINGTON PARK\n";

    fn invoice(pro: &str, date: &str, amount: &str, load: &str) -> String {
        format!("{MARKERS}PRO {pro}\nDate {date}\nCharge ${amount}\nLoad {load};\n")
    }

    fn pipeline() -> Pipeline {
        Pipeline::from_config(&ProscanConfig::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch() -> Vec<SourceDocument> {
        vec![
            SourceDocument::text("march.txt", &invoice("100000001", "03/15/2024", "30.00", "GP1")),
            SourceDocument::text("january.txt", &invoice("100000002", "01/10/2024", "50.00", "GP2")),
            SourceDocument::text("february.txt", &invoice("100000003", "02/20/2024", "70.00", "GP3")),
            SourceDocument::text("flyer.txt", "Visit Huntington Park once $120.00 01/01/2020"),
        ]
    }

    #[test]
    fn test_records_sorted_by_date() {
        let output = pipeline().run(&batch()).unwrap();

        let dates: Vec<NaiveDate> = output.records.iter().map(|r| r.invoice_date()).collect();
        assert_eq!(dates, vec![date(2024, 1, 10), date(2024, 2, 20), date(2024, 3, 15)]);
        assert_eq!(output.records[0].piece_count(), 5);
        assert_eq!(output.processed, 4);
    }

    #[test]
    fn test_rejected_document_is_only_a_skip() {
        let output = pipeline().run(&batch()).unwrap();

        assert_eq!(output.skipped(), 1);
        assert_eq!(output.dropped(), 0);
        assert_eq!(
            output.diagnostics,
            vec![Diagnostic {
                document: "flyer.txt".to_string(),
                kind: DiagnosticKind::Skipped,
                message: "'HUNTINGTON PARK' appeared 1 times, which is less than 4".to_string(),
            }]
        );
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let documents = vec![
            SourceDocument::text("bad-amount.txt", &invoice("100000001", "03/15/2024", "125.00", "GP1")),
            SourceDocument::pdf("corrupt.pdf", b"%PDF-1.4 garbage".to_vec()),
            SourceDocument::text("good.txt", &invoice("100000002", "01/10/2024", "120.00", "GP2")),
        ];

        let output = pipeline().run(&documents).unwrap();

        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].piece_count(), 12);
        assert_eq!(output.dropped(), 2);

        let kinds: Vec<(&str, DiagnosticKind)> = output
            .diagnostics
            .iter()
            .map(|d| (d.document.as_str(), d.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("bad-amount.txt", DiagnosticKind::IntegrityViolation),
                ("corrupt.pdf", DiagnosticKind::ExtractionFault),
            ]
        );
    }

    #[test]
    fn test_equal_dates_keep_processing_order() {
        let documents = vec![
            SourceDocument::text("a", &invoice("100000001", "05/01/2024", "10.00", "GP1")),
            SourceDocument::text("b", &format!("{MARKERS}no date here $20.00")),
            SourceDocument::text("c", &invoice("100000003", "05/01/2024", "30.00", "GP3")),
            SourceDocument::text("d", &format!("{MARKERS}still no date $40.00")),
        ];

        let output = pipeline().run(&documents).unwrap();
        let pieces: Vec<u32> = output.records.iter().map(|r| r.piece_count()).collect();
        assert_eq!(pieces, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_run_is_idempotent() {
        let documents = batch();
        let pipeline = pipeline();

        let first = pipeline.run(&documents).unwrap();
        let second = pipeline.run(&documents).unwrap();

        assert_eq!(first.records, second.records);
        assert_eq!(first.diagnostics, second.diagnostics);
    }

    #[test]
    fn test_custom_threshold() {
        let mut config = ProscanConfig::default();
        config.classifier.threshold = 1;
        let pipeline = Pipeline::from_config(&config).unwrap();

        let output = pipeline.run(&batch()).unwrap();
        assert_eq!(output.records.len(), 4);
        assert_eq!(output.records[0].invoice_date(), date(2020, 1, 1));
    }

    struct FailingSource;

    impl DocumentSource for FailingSource {
        fn documents(&mut self) -> crate::Result<Vec<SourceDocument>> {
            Err(ProscanError::Source("mailbox folder not found".to_string()))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        written: Vec<InvoiceRecord>,
    }

    impl ReportSink for CollectingSink {
        fn write_records(&mut self, records: &[InvoiceRecord]) -> crate::Result<()> {
            self.written.extend_from_slice(records);
            Ok(())
        }
    }

    #[test]
    fn test_run_batch_hands_sorted_records_to_sink() {
        let mut source = batch();
        let mut sink = CollectingSink::default();

        let output = pipeline().run_batch(&mut source, &mut sink).unwrap();
        assert_eq!(sink.written, output.records);
        assert_eq!(sink.written[0].tracking_number(), "100000002");
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn write_records(&mut self, _records: &[InvoiceRecord]) -> crate::Result<()> {
            Err(ProscanError::Report("disk full".to_string()))
        }
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let mut source = batch();
        let result = pipeline().run_batch(&mut source, &mut FailingSink);

        assert!(matches!(result, Err(ProscanError::Report(_))));
    }

    #[test]
    fn test_cancelled_batch_stops_before_next_document() {
        let flag = Arc::new(AtomicBool::new(false));
        let pipeline = pipeline().with_cancel_flag(flag.clone());

        assert_eq!(pipeline.run(&batch()).unwrap().processed, 4);

        flag.store(true, Ordering::Relaxed);
        let mut sink = CollectingSink::default();
        let result = pipeline.run_batch(&mut batch(), &mut sink);

        assert!(matches!(result, Err(ProscanError::Cancelled { processed: 0 })));
        assert!(sink.written.is_empty());
    }

    struct PanickingDocument;

    impl PagedDocument for PanickingDocument {
        fn page_count(&self) -> u32 {
            1
        }

        fn extract_page_text(&self, _page: u32) -> crate::pdf::Result<String> {
            panic!("content stream overflow")
        }
    }

    #[test]
    fn test_parser_panic_is_contained() {
        let pipeline = pipeline();
        let result = contain_panics(|| Ok(pipeline.text.extract(&PanickingDocument)));

        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_read_text_reports_pages() {
        let source = SourceDocument::text("two-pages.txt", "first\u{0C}second");
        let extracted = pipeline().read_text(&source).unwrap();

        assert_eq!(extracted.pages, 2);
        assert_eq!(extracted.text, "first\nsecond");
    }

    #[test]
    fn test_source_failure_is_fatal() {
        let mut sink = CollectingSink::default();
        let result = pipeline().run_batch(&mut FailingSource, &mut sink);

        assert!(matches!(result, Err(ProscanError::Source(_))));
        assert!(sink.written.is_empty());
    }
}
