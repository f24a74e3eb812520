//! Invoice field extraction.

mod extractor;
mod fields;

pub use extractor::InvoiceExtractor;
pub use crate::models::Field;

use serde::Serialize;

use crate::error::ExtractionError;
use crate::models::InvoiceRecord;
use crate::vendors::VendorMatch;

/// Outcome of extracting one field.
///
/// Keeps "nothing there" apart from "something there but malformed" so the
/// two can be logged differently; both end up as an empty string in the
/// record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldOutcome {
    Found(String),
    NotFound,
    Error(String),
}

impl FieldOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, FieldOutcome::Found(_))
    }

    /// The found value, or an empty string.
    pub fn value(&self) -> &str {
        match self {
            FieldOutcome::Found(v) => v,
            _ => "",
        }
    }
}

impl From<Option<String>> for FieldOutcome {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => FieldOutcome::Found(v),
            _ => FieldOutcome::NotFound,
        }
    }
}

impl From<Result<Option<String>, ExtractionError>> for FieldOutcome {
    fn from(result: Result<Option<String>, ExtractionError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(e) => FieldOutcome::Error(e.to_string()),
        }
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Extracted record.
    pub record: InvoiceRecord,
    /// Outcome per field, in extraction order.
    pub outcomes: Vec<(Field, FieldOutcome)>,
    /// How the vendor was resolved, if it was.
    pub vendor_match: Option<VendorMatch>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionReport {
    fn new(file_name: &str) -> Self {
        Self {
            record: InvoiceRecord::empty(file_name),
            outcomes: Vec::new(),
            vendor_match: None,
            warnings: Vec::new(),
            processing_time_ms: 0,
        }
    }

    /// Outcome recorded for a field.
    pub fn outcome(&self, field: Field) -> Option<&FieldOutcome> {
        self.outcomes
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, outcome)| outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let found: FieldOutcome = Ok(Some("01/31/24".to_string())).into();
        assert_eq!(found, FieldOutcome::Found("01/31/24".to_string()));

        let missing: FieldOutcome = Ok(None).into();
        assert_eq!(missing, FieldOutcome::NotFound);

        let failed: FieldOutcome = Err(ExtractionError::NoNetDays("2%".to_string())).into();
        assert_eq!(failed, FieldOutcome::Error("no net days in terms: 2%".to_string()));
        assert_eq!(failed.value(), "");
    }

    #[test]
    fn test_empty_value_is_not_found() {
        assert_eq!(FieldOutcome::from(Some(String::new())), FieldOutcome::NotFound);
        assert!(FieldOutcome::from(Some("x".to_string())).is_found());
    }
}
