//! Freight invoice record produced by field extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder stored when a text field cannot be located.
pub const NOT_FOUND: &str = "Not found";

/// Placeholder stored when no invoice date can be located.
pub const UNSET_DATE: NaiveDate = NaiveDate::MIN;

/// One validated invoice extracted from a classified document.
///
/// Fields are private; a record cannot change after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    tracking_number: String,
    invoice_date: NaiveDate,
    piece_count: u32,
    load_id: String,
}

impl InvoiceRecord {
    /// Create a record from already-extracted field values.
    pub fn new(
        tracking_number: impl Into<String>,
        invoice_date: NaiveDate,
        piece_count: u32,
        load_id: impl Into<String>,
    ) -> Self {
        Self {
            tracking_number: tracking_number.into(),
            invoice_date,
            piece_count,
            load_id: load_id.into(),
        }
    }

    /// PRO (tracking) number, or [`NOT_FOUND`].
    pub fn tracking_number(&self) -> &str {
        &self.tracking_number
    }

    /// Earliest date on the invoice, or [`UNSET_DATE`].
    pub fn invoice_date(&self) -> NaiveDate {
        self.invoice_date
    }

    /// Number of pieces billed.
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    /// Load identifier, or [`NOT_FOUND`].
    pub fn load_id(&self) -> &str {
        &self.load_id
    }

    pub fn has_tracking_number(&self) -> bool {
        self.tracking_number != NOT_FOUND
    }

    pub fn has_date(&self) -> bool {
        self.invoice_date != UNSET_DATE
    }

    pub fn has_load_id(&self) -> bool {
        self.load_id != NOT_FOUND
    }

    /// Human-readable notes about fields that fell back to placeholders.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.has_tracking_number() {
            missing.push("tracking number");
        }
        if !self.has_date() {
            missing.push("invoice date");
        }
        if !self.has_load_id() {
            missing.push("load ID");
        }
        missing
    }
}

/// Sort records by ascending invoice date.
///
/// The sort is stable: records with equal dates (including [`UNSET_DATE`])
/// keep their accumulation order.
pub fn sort_by_date(records: &mut [InvoiceRecord]) {
    records.sort_by_key(InvoiceRecord::invoice_date);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_fields() {
        let record = InvoiceRecord::new(NOT_FOUND, UNSET_DATE, 0, "GP1");
        assert_eq!(record.missing_fields(), vec!["tracking number", "invoice date"]);
        assert!(record.has_load_id());
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![
            InvoiceRecord::new("000000001", date(2024, 3, 1), 1, "GP1"),
            InvoiceRecord::new("000000002", UNSET_DATE, 2, "GP2"),
            InvoiceRecord::new("000000003", date(2024, 3, 1), 3, "GP3"),
            InvoiceRecord::new("000000004", UNSET_DATE, 4, "GP4"),
            InvoiceRecord::new("000000005", date(2024, 1, 1), 5, "GP5"),
        ];

        sort_by_date(&mut records);

        let order: Vec<&str> = records.iter().map(|r| r.tracking_number()).collect();
        assert_eq!(
            order,
            vec!["000000002", "000000004", "000000005", "000000001", "000000003"]
        );
    }
}
