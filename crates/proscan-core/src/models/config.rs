//! Configuration structures for the invoice pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ProscanError;
use crate::invoice::rules::patterns::{
    DEFAULT_AMOUNT_PATTERN, DEFAULT_DATE_PATTERN, DEFAULT_LOAD_ID_PATTERN,
    DEFAULT_TRACKING_PATTERN,
};
use crate::invoice::rules::FieldRules;

/// Main configuration for the proscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProscanConfig {
    /// Document classification configuration.
    pub classifier: ClassifierConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Report rendering configuration.
    pub report: ReportConfig,
}

/// Marker-count classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Phrase whose repeated presence marks an in-scope invoice.
    pub marker: String,

    /// Minimum number of marker occurrences for a document to be accepted.
    pub threshold: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            marker: "HUNTINGTON PARK".to_string(),
            threshold: 4,
        }
    }
}

/// Order of the two leading fields in a `NN/NN/YYYY` date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// MM/DD/YYYY (US short date).
    #[default]
    MonthFirst,
    /// DD/MM/YYYY.
    DayFirst,
}

/// Field extraction settings.
///
/// Pattern capture-group contracts:
/// - `tracking_pattern`: the whole match is the tracking number.
/// - `date_pattern`: groups 1 and 2 are the day/month pair (see `date_order`), group 3 the year.
/// - `amount_pattern`: group 1 is the numeric amount.
/// - `load_id_pattern`: group 1 is the load identifier without its terminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency units billed per piece.
    pub piece_rate: Decimal,

    /// How to read the leading fields of a matched date.
    pub date_order: DateOrder,

    pub tracking_pattern: String,

    pub date_pattern: String,

    pub amount_pattern: String,

    pub load_id_pattern: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            piece_rate: Decimal::TEN,
            date_order: DateOrder::MonthFirst,
            tracking_pattern: DEFAULT_TRACKING_PATTERN.to_string(),
            date_pattern: DEFAULT_DATE_PATTERN.to_string(),
            amount_pattern: DEFAULT_AMOUNT_PATTERN.to_string(),
            load_id_pattern: DEFAULT_LOAD_ID_PATTERN.to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Only read the first page of each document.
    pub first_page_only: bool,
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// chrono format string for the date column.
    pub date_format: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
        }
    }
}

impl ProscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check that the configuration can drive a pipeline.
    pub fn validate(&self) -> Result<(), ProscanError> {
        if self.classifier.marker.is_empty() {
            return Err(ProscanError::Config("classifier.marker must not be empty".to_string()));
        }
        if self.classifier.threshold == 0 {
            return Err(ProscanError::Config("classifier.threshold must be at least 1".to_string()));
        }
        if self.extraction.piece_rate <= Decimal::ZERO {
            return Err(ProscanError::Config(format!(
                "extraction.piece_rate must be positive, got {}",
                self.extraction.piece_rate
            )));
        }
        FieldRules::from_config(&self.extraction)
            .map_err(|e| ProscanError::Config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProscanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifier.threshold, 4);
        assert_eq!(config.extraction.piece_rate, Decimal::TEN);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ProscanConfig =
            serde_json::from_str(r#"{"classifier": {"threshold": 2}}"#).unwrap();
        assert_eq!(config.classifier.threshold, 2);
        assert_eq!(config.classifier.marker, "HUNTINGTON PARK");
        assert_eq!(config.extraction.date_order, DateOrder::MonthFirst);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ProscanConfig::default();
        config.classifier.marker.clear();
        assert!(config.validate().is_err());

        let mut config = ProscanConfig::default();
        config.extraction.piece_rate = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = ProscanConfig::default();
        config.extraction.load_id_pattern = r"\bGP\d+;".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ProscanConfig::default();
        config.extraction.date_order = DateOrder::DayFirst;
        config.save(&path).unwrap();

        let loaded = ProscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.date_order, DateOrder::DayFirst);
        assert_eq!(loaded.report.date_format, "%-m/%-d/%Y");
    }
}
