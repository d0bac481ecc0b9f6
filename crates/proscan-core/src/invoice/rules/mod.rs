//! Rule-based field extractors for freight invoices.

pub mod amounts;
pub mod dates;
pub mod load_id;
pub mod patterns;
pub mod tracking;

pub use amounts::{parse_amount, pieces_for_amount, AmountExtractor, PieceCounter};
pub use dates::DateExtractor;
pub use load_id::LoadIdExtractor;
pub use tracking::TrackingNumberExtractor;

use regex::Regex;

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field, in document order.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value matched in source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// The four field extractors compiled from one configuration.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub tracking: TrackingNumberExtractor,
    pub dates: DateExtractor,
    pub pieces: PieceCounter,
    pub load_id: LoadIdExtractor,
}

impl FieldRules {
    /// Compile the configured patterns, checking their capture groups.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let tracking = compile("tracking_pattern", &config.tracking_pattern, 0)?;
        let dates = compile("date_pattern", &config.date_pattern, 3)?;
        let amounts = compile("amount_pattern", &config.amount_pattern, 1)?;
        let load_id = compile("load_id_pattern", &config.load_id_pattern, 1)?;

        Ok(Self {
            tracking: TrackingNumberExtractor::with_pattern(tracking),
            dates: DateExtractor::with_pattern(dates, config.date_order),
            pieces: PieceCounter::new(AmountExtractor::with_pattern(amounts), config.piece_rate),
            load_id: LoadIdExtractor::with_pattern(load_id),
        })
    }
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            tracking: TrackingNumberExtractor::new(),
            dates: DateExtractor::new(),
            pieces: PieceCounter::default(),
            load_id: LoadIdExtractor::new(),
        }
    }
}

fn compile(field: &str, pattern: &str, groups: usize) -> Result<Regex, ExtractionError> {
    let regex = Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    // captures_len counts the implicit whole-match group
    if regex.captures_len() < groups + 1 {
        return Err(ExtractionError::InvalidPattern {
            field: field.to_string(),
            reason: format!(
                "expected at least {} capture group(s), found {}",
                groups,
                regex.captures_len() - 1
            ),
        });
    }

    Ok(regex)
}
