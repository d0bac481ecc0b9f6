//! Marker-count classification of extracted document text.

use regex::Regex;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::config::ClassifierConfig;

/// Result of classifying one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The marker appeared often enough.
    InScope { markers: usize },
    /// Too few markers; not an invoice or an incomplete scan.
    OutOfScope { markers: usize, threshold: usize },
}

impl Classification {
    pub fn is_in_scope(&self) -> bool {
        matches!(self, Classification::InScope { .. })
    }
}

/// Decides whether a document is an in-scope invoice.
///
/// A combined scan carries the marker phrase once per invoice section, so
/// in-scope documents repeat it at least `threshold` times. Matching is
/// case-insensitive and non-overlapping.
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    marker: String,
    pattern: Regex,
    threshold: usize,
}

impl DocumentClassifier {
    pub fn new(marker: &str, threshold: usize) -> Result<Self, ExtractionError> {
        if marker.is_empty() {
            return Err(ExtractionError::InvalidPattern {
                field: "marker".to_string(),
                reason: "marker phrase is empty".to_string(),
            });
        }

        let pattern = Regex::new(&format!("(?i){}", regex::escape(marker))).map_err(|e| {
            ExtractionError::InvalidPattern {
                field: "marker".to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            marker: marker.to_string(),
            pattern,
            threshold,
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ExtractionError> {
        Self::new(&config.marker, config.threshold)
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Count non-overlapping occurrences of the marker.
    pub fn count_markers(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    pub fn classify(&self, text: &str) -> Classification {
        let markers = self.count_markers(text);

        if markers >= self.threshold {
            debug!("'{}' appeared {} times, document in scope", self.marker, markers);
            Classification::InScope { markers }
        } else {
            info!(
                "Document skipped: '{}' appeared {} times, which is less than {}",
                self.marker, markers, self.threshold
            );
            Classification::OutOfScope {
                markers,
                threshold: self.threshold,
            }
        }
    }

    pub fn is_in_scope(&self, text: &str) -> bool {
        self.classify(text).is_in_scope()
    }
}
