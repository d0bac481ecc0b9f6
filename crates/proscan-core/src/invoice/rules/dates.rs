//! Date extraction for freight invoices.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::trace;

use super::patterns::SHORT_DATE;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::config::DateOrder;

/// Short-date extractor.
///
/// Date-shaped text that is not a calendar date (month 13, February 30,
/// year 0000) is skipped rather than reported.
#[derive(Debug, Clone)]
pub struct DateExtractor {
    pattern: Regex,
    order: DateOrder,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self::with_pattern(SHORT_DATE.clone(), DateOrder::MonthFirst)
    }

    pub fn with_pattern(pattern: Regex, order: DateOrder) -> Self {
        Self { pattern, order }
    }

    /// Set how the two leading fields are read.
    pub fn with_order(mut self, order: DateOrder) -> Self {
        self.order = order;
        self
    }

    /// Earliest valid date anywhere in the text.
    pub fn earliest(&self, text: &str) -> Option<NaiveDate> {
        self.extract_all(text).into_iter().map(|m| m.value).min()
    }

    fn parse(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let first: u32 = caps.get(1)?.as_str().parse().ok()?;
        let second: u32 = caps.get(2)?.as_str().parse().ok()?;
        let year: i32 = caps.get(3)?.as_str().parse().ok()?;
        if year < 1 {
            return None;
        }

        let (month, day) = match self.order {
            DateOrder::MonthFirst => (first, second),
            DateOrder::DayFirst => (second, first),
        };

        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let Some(full_match) = caps.get(0) else {
                continue;
            };

            match self.parse(&caps) {
                Some(date) => results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                ),
                None => trace!("Skipping invalid date {:?}", full_match.as_str()),
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_earliest_date_wins() {
        let extractor = DateExtractor::new();
        let text = "Ship 03/15/2024 Deliver 03/18/2024 Billed 02/29/2024";

        assert_eq!(extractor.earliest(text), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_invalid_dates_are_skipped() {
        let extractor = DateExtractor::new();
        let text = "Bad 13/01/2024 also 02/30/2024 good 06/01/2024";

        let all = extractor.extract_all(text);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, date(2024, 6, 1));
        assert_eq!(all[0].source, "06/01/2024");
    }

    #[test]
    fn test_year_zero_is_not_a_date() {
        let extractor = DateExtractor::new();
        let text = "Printed 12/31/0000 Ship 01/05/2024";

        assert_eq!(extractor.extract_all(text).len(), 1);
        assert_eq!(extractor.earliest(text), Some(date(2024, 1, 5)));
        assert_eq!(extractor.earliest("01/01/0001"), Some(date(1, 1, 1)));
    }

    #[test]
    fn test_day_first_order() {
        let extractor = DateExtractor::new().with_order(DateOrder::DayFirst);

        assert_eq!(extractor.earliest("15/03/2024"), Some(date(2024, 3, 15)));
        assert_eq!(extractor.earliest("03/15/2024"), None);
    }

    #[test]
    fn test_no_dates() {
        let extractor = DateExtractor::new();
        assert_eq!(extractor.earliest("nothing here 1/2/2024"), None);
    }
}
