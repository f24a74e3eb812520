//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// Field extraction or derived calculation error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Vendor master data error.
    #[error("vendor data error: {0}")]
    Vendor(#[from] VendorDataError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while extracting a single field or computing a derived one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The invoice date matched none of the accepted formats.
    #[error("unrecognized date: {0}")]
    InvalidDate(String),

    /// The amount text is not a US-dollar amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The discount terms could not be interpreted.
    #[error("malformed discount terms: {0}")]
    MalformedTerms(String),

    /// The discount terms carry no net-days count.
    #[error("no net days in terms: {0}")]
    NoNetDays(String),

    /// A field extractor panicked; the field is reported empty.
    #[error("{field} extraction panicked: {message}")]
    FieldPanicked { field: String, message: String },
}

/// Errors related to vendor master data.
#[derive(Error, Debug)]
pub enum VendorDataError {
    /// Failed to parse the master data file.
    #[error("failed to parse vendor master data: {0}")]
    Parse(String),

    /// An identifier maps to a vendor missing from the catalog.
    #[error("identifier {identifier:?} maps to unknown vendor {vendor:?}")]
    UnknownVendor { identifier: String, vendor: String },
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
