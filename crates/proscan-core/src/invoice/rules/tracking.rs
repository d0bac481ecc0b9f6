//! PRO (tracking) number extraction.

use regex::Regex;

use super::patterns::TRACKING_NUMBER;
use super::{ExtractionMatch, FieldExtractor};

/// Tracking number extractor. No checksum is applied.
#[derive(Debug, Clone)]
pub struct TrackingNumberExtractor {
    pattern: Regex,
}

impl TrackingNumberExtractor {
    pub fn new() -> Self {
        Self::with_pattern(TRACKING_NUMBER.clone())
    }

    pub fn with_pattern(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Default for TrackingNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TrackingNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                .with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}
