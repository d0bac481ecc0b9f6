//! Dollar amount extraction and the piece-count rule.

use std::str::FromStr;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use super::patterns::DOLLAR_AMOUNT;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Dollar amount extractor. Yields the numeric text of each amount.
#[derive(Debug, Clone)]
pub struct AmountExtractor {
    pattern: Regex,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self::with_pattern(DOLLAR_AMOUNT.clone())
    }

    pub fn with_pattern(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern.captures(text).and_then(|caps| {
            let full_match = caps.get(0)?;
            let number = caps.get(1)?;
            Some(
                ExtractionMatch::new(number.as_str().to_string(), full_match.as_str())
                    .with_position(full_match.start(), full_match.end()),
            )
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let number = caps.get(1)?;
                Some(
                    ExtractionMatch::new(number.as_str().to_string(), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

/// Derives the piece count from the first dollar amount on an invoice.
///
/// Each piece is billed at a fixed rate, so the amount has to divide evenly.
/// A remainder usually means a surcharge line was matched instead of the
/// piece-cost line, and is reported as [`ExtractionError::IntegrityViolation`].
#[derive(Debug, Clone)]
pub struct PieceCounter {
    amounts: AmountExtractor,
    rate: Decimal,
}

impl PieceCounter {
    pub fn new(amounts: AmountExtractor, rate: Decimal) -> Self {
        Self { amounts, rate }
    }

    /// Set the per-piece rate.
    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = rate;
        self
    }

    /// Piece count for the text, or 0 when no amount is present.
    pub fn count(&self, text: &str) -> Result<u32, ExtractionError> {
        let Some(found) = self.amounts.extract(text) else {
            debug!("No dollar amount found, piece count is 0");
            return Ok(0);
        };

        let amount = parse_amount(&found.value)?;
        let pieces = pieces_for_amount(amount, self.rate)?;
        debug!("Amount {} at rate {} -> {} pieces", found.source, self.rate, pieces);
        Ok(pieces)
    }
}

impl Default for PieceCounter {
    fn default() -> Self {
        Self::new(AmountExtractor::new(), Decimal::TEN)
    }
}

/// Parse the numeric part of a dollar amount (e.g., "120.00").
pub fn parse_amount(s: &str) -> Result<Decimal, ExtractionError> {
    Decimal::from_str(s).map_err(|_| ExtractionError::Parse {
        field: "amount".to_string(),
        value: s.to_string(),
    })
}

/// Convert an amount to a whole number of pieces at `rate` per piece.
pub fn pieces_for_amount(amount: Decimal, rate: Decimal) -> Result<u32, ExtractionError> {
    if rate <= Decimal::ZERO {
        return Err(ExtractionError::Parse {
            field: "piece rate".to_string(),
            value: rate.to_string(),
        });
    }

    if !(amount % rate).is_zero() {
        return Err(ExtractionError::IntegrityViolation { amount, rate });
    }

    (amount / rate)
        .trunc()
        .to_u32()
        .ok_or_else(|| ExtractionError::Parse {
            field: "piece count".to_string(),
            value: amount.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_whole_multiple() {
        let counter = PieceCounter::default();
        assert_eq!(counter.count("Linehaul $120.00 Fuel $7.35").unwrap(), 12);
        assert_eq!(counter.count("Total $40").unwrap(), 4);
        assert_eq!(counter.count("Total $0.00").unwrap(), 0);
    }

    #[test]
    fn test_remainder_is_integrity_violation() {
        let counter = PieceCounter::default();
        let err = counter.count("Total $125.00").unwrap_err();

        match err {
            ExtractionError::IntegrityViolation { amount, rate } => {
                assert_eq!(amount, dec("125.00"));
                assert_eq!(rate, Decimal::TEN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_only_first_amount_counts() {
        let counter = PieceCounter::default();
        assert!(counter.count("Surcharge $12.50 then $100.00").is_err());
        assert_eq!(counter.count("Pieces $100.00 then $12.50").unwrap(), 10);
    }

    #[test]
    fn test_no_amount_is_zero() {
        let counter = PieceCounter::default();
        assert_eq!(counter.count("no money here, 120.00 USD").unwrap(), 0);
    }

    #[test]
    fn test_custom_rate() {
        let counter = PieceCounter::default().with_rate(dec("12.50"));
        assert_eq!(counter.count("$125.00").unwrap(), 10);
        assert!(counter.count("$120.00").unwrap_err().is_integrity_violation());
    }

    #[test]
    fn test_oversized_amount_is_parse_error() {
        let counter = PieceCounter::default();
        let err = counter.count("$99999999999999999999999999999999990").unwrap_err();
        assert!(!err.is_integrity_violation());
    }

    #[test]
    fn test_pieces_for_amount_rejects_zero_rate() {
        assert!(pieces_for_amount(dec("10"), Decimal::ZERO).is_err());
    }
}
