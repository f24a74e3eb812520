//! Core library for template-free invoice field extraction.
//!
//! This crate provides:
//! - Token normalization, label location and geometric value association
//! - Field validators for invoice numbers, PO numbers, dates and amounts
//! - A vendor override registry with a reloadable vendor catalog
//! - Derived field calculation (discount due date, discounted total)
//! - The per-document orchestrator producing an [`InvoiceRecord`]

pub mod error;
pub mod invoice;
pub mod layout;
pub mod models;
pub mod rules;
pub mod vendors;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ExtractionError, InvexError, Result, VendorDataError};
pub use invoice::{ExtractionReport, Field, FieldOutcome, InvoiceExtractor};
pub use models::config::{ExtractionConfig, InvexConfig};
pub use models::document::{Document, Token};
pub use models::record::{COLUMNS, EXTENDED_COLUMNS, InvoiceRecord};
pub use rules::derived::{
    apply_credit_sign, calculate_discount_due_date, calculate_discounted_total,
};
pub use vendors::{
    OverrideAction, OverrideContext, OverrideRegistry, VendorCache, VendorCatalog, VendorMatch,
};
