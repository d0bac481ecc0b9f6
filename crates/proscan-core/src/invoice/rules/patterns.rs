//! Default regex patterns for freight invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// PRO number: exactly nine digits standing alone.
pub const DEFAULT_TRACKING_PATTERN: &str = r"\b\d{9}\b";

/// Short date, `NN/NN/YYYY`.
pub const DEFAULT_DATE_PATTERN: &str = r"\b(\d{2})/(\d{2})/(\d{4})\b";

/// Dollar amount with optional cents.
pub const DEFAULT_AMOUNT_PATTERN: &str = r"\$(\d+(?:\.\d{2})?)";

/// Load ID: `GP` and digits, terminated by a semicolon.
pub const DEFAULT_LOAD_ID_PATTERN: &str = r"\b(GP\d+);";

lazy_static! {
    pub static ref TRACKING_NUMBER: Regex = Regex::new(DEFAULT_TRACKING_PATTERN).unwrap();

    pub static ref SHORT_DATE: Regex = Regex::new(DEFAULT_DATE_PATTERN).unwrap();

    pub static ref DOLLAR_AMOUNT: Regex = Regex::new(DEFAULT_AMOUNT_PATTERN).unwrap();

    pub static ref LOAD_ID: Regex = Regex::new(DEFAULT_LOAD_ID_PATTERN).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_number_boundaries() {
        assert!(TRACKING_NUMBER.is_match("PRO 123456789"));
        assert!(!TRACKING_NUMBER.is_match("12345678"));
        assert!(!TRACKING_NUMBER.is_match("1234567890"));
        assert!(!TRACKING_NUMBER.is_match("X123456789"));
    }

    #[test]
    fn test_amount_captures_number_only() {
        let caps = DOLLAR_AMOUNT.captures("Total $120.00 due").unwrap();
        assert_eq!(&caps[1], "120.00");

        let caps = DOLLAR_AMOUNT.captures("Fee $125.5").unwrap();
        assert_eq!(&caps[1], "125");
    }

    #[test]
    fn test_load_id_requires_terminator() {
        assert_eq!(&LOAD_ID.captures("Ref GP4521; x").unwrap()[1], "GP4521");
        assert!(LOAD_ID.captures("Ref GP4521 x").is_none());
        assert!(LOAD_ID.captures("XGP4521;").is_none());
    }
}
