//! Load identifier extraction.

use regex::Regex;

use super::patterns::LOAD_ID;
use super::{ExtractionMatch, FieldExtractor};

/// Load ID extractor. The terminator is matched but not kept.
#[derive(Debug, Clone)]
pub struct LoadIdExtractor {
    pattern: Regex,
}

impl LoadIdExtractor {
    pub fn new() -> Self {
        Self::with_pattern(LOAD_ID.clone())
    }

    pub fn with_pattern(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Default for LoadIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LoadIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                let id = caps.get(1)?;
                Some(
                    ExtractionMatch::new(id.as_str().to_string(), full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semicolon_is_stripped() {
        let extractor = LoadIdExtractor::new();
        let result = extractor.extract("Load: GP4521; Trailer 55").unwrap();

        assert_eq!(result.value, "GP4521");
        assert_eq!(result.source, "GP4521;");
    }

    #[test]
    fn test_first_terminated_id() {
        let extractor = LoadIdExtractor::new();
        let result = extractor.extract("GP11 GP22; GP33;").unwrap();
        assert_eq!(result.value, "GP22");
    }

    #[test]
    fn test_absent() {
        let extractor = LoadIdExtractor::new();
        assert!(extractor.extract("GP; GPX12; gp12;").is_none());
    }
}
