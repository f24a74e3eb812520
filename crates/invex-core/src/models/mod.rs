//! Data models: tokenizer input, extraction output and configuration.

pub mod config;
pub mod document;
pub mod record;

pub use config::{BatchConfig, ExtractionConfig, InvexConfig, VendorConfig};
pub use document::{Document, Token};
pub use record::{COLUMNS, EXTENDED_COLUMNS, Field, InvoiceRecord};
