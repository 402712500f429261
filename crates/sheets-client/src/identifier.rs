//! Spreadsheet identifier classification.

use once_cell::sync::Lazy;
use regex::Regex;

static SPREADSHEET_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://docs\.google\.com/spreadsheets/(?:u/\d+/)?d/([A-Za-z0-9_-]+)")
        .expect("spreadsheet url pattern is valid")
});

/// How a caller-supplied identifier should be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetIdentifier {
    /// A spreadsheet URL; holds the key extracted from it
    Url(String),
    /// Anything else is treated as a title
    Title(String),
}

impl SpreadsheetIdentifier {
    /// Classify an identifier as URL-form or title-form.
    pub fn classify(input: &str) -> Self {
        let trimmed = input.trim();
        match SPREADSHEET_URL_PATTERN.captures(trimmed) {
            Some(caps) => Self::Url(caps[1].to_string()),
            None => Self::Title(input.to_string()),
        }
    }
}
