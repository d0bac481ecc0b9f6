//! Freight invoice parser combining the four field rules.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::invoice::{InvoiceRecord, NOT_FOUND, UNSET_DATE};

use super::rules::{FieldExtractor, FieldRules};
use super::{InvoiceExtractor, Result};

/// Rule-based invoice parser.
///
/// The four fields are extracted independently over the same text. Missing
/// fields fall back to placeholders; only a piece-count inconsistency or a
/// malformed amount fails the document.
#[derive(Debug, Clone, Default)]
pub struct InvoiceParser {
    rules: FieldRules,
}

impl InvoiceParser {
    /// Create a parser with the default patterns and a rate of 10 per piece.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            rules: FieldRules::from_config(config)?,
        })
    }

    fn extract_tracking_number(&self, text: &str) -> String {
        self.rules
            .tracking
            .extract(text)
            .map(|m| m.value)
            .unwrap_or_else(|| NOT_FOUND.to_string())
    }

    fn extract_load_id(&self, text: &str) -> String {
        self.rules
            .load_id
            .extract(text)
            .map(|m| m.value)
            .unwrap_or_else(|| NOT_FOUND.to_string())
    }
}

impl InvoiceExtractor for InvoiceParser {
    fn extract_fields(&self, text: &str) -> Result<InvoiceRecord> {
        let tracking_number = self.extract_tracking_number(text);
        let invoice_date = self.rules.dates.earliest(text).unwrap_or(UNSET_DATE);
        let piece_count = self.rules.pieces.count(text)?;
        let load_id = self.extract_load_id(text);

        debug!(
            "Extracted PRO# {}, date {}, {} pieces, load {}",
            tracking_number, invoice_date, piece_count, load_id
        );

        Ok(InvoiceRecord::new(tracking_number, invoice_date, piece_count, load_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::models::config::DateOrder;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const INVOICE_TEXT: &str = r#"
        WESTERN TRANSPORT                     PRO# 104233871
        Shipper: ACME FOODS, HUNTINGTON PARK CA
        Ship date 03/14/2024    Invoice date 03/16/2024
        Ref 12345678  Acct 1234567890
        Pieces charge $120.00   Fuel surcharge $13.75
        Load GP88412; BOL 7731
    "#;

    #[test]
    fn test_extract_all_fields() {
        let parser = InvoiceParser::new();
        let record = parser.extract_fields(INVOICE_TEXT).unwrap();

        assert_eq!(
            record,
            InvoiceRecord::new(
                "104233871",
                NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
                12,
                "GP88412",
            )
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let parser = InvoiceParser::new();
        let record = parser.extract_fields("nothing useful here").unwrap();

        assert_eq!(record.tracking_number(), NOT_FOUND);
        assert_eq!(record.invoice_date(), UNSET_DATE);
        assert_eq!(record.piece_count(), 0);
        assert_eq!(record.load_id(), NOT_FOUND);
    }

    #[test]
    fn test_integrity_violation_fails_document() {
        let parser = InvoiceParser::new();
        let text = INVOICE_TEXT.replace("$120.00", "$125.00");

        let err = parser.extract_fields(&text).unwrap_err();
        assert!(matches!(err, ExtractionError::IntegrityViolation { .. }));
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            piece_rate: Decimal::new(20, 0),
            date_order: DateOrder::DayFirst,
            ..ExtractionConfig::default()
        };
        let parser = InvoiceParser::from_config(&config).unwrap();
        let record = parser
            .extract_fields("14/03/2024 16/03/2024 $120.00")
            .unwrap();

        assert_eq!(record.piece_count(), 6);
        assert_eq!(record.invoice_date(), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }
}
