//! Per-document orchestration of field extraction.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::layout::normalize_tokens;
use crate::models::{Document, ExtractionConfig, Field, InvexConfig, InvoiceRecord};
use crate::rules::{apply_credit_sign, discount_due_date, discounted_total};
use crate::vendors::{OverrideRegistry, VendorCache, VendorCatalog};

use super::fields::{self, Scope, page_lines};
use super::{ExtractionReport, FieldOutcome};

type FieldFn = fn(&Scope<'_>) -> FieldOutcome;

/// Located fields, in extraction order.
const LOCATED_FIELDS: [(Field, FieldFn); 5] = [
    (Field::InvoiceNumber, fields::invoice_number),
    (Field::PoNumber, fields::po_number),
    (Field::InvoiceDate, fields::invoice_date),
    (Field::DiscountTerms, fields::discount_terms),
    (Field::TotalAmount, fields::total_amount),
];

/// Extracts an [`InvoiceRecord`] from a tokenized document.
///
/// Extraction never fails: missing or malformed fields are left empty and
/// reported through [`ExtractionReport`].
pub struct InvoiceExtractor {
    config: ExtractionConfig,
    vendors: Arc<VendorCache>,
}

impl InvoiceExtractor {
    /// Extractor with default settings, built-in vendor rules and an empty catalog.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            vendors: Arc::new(VendorCache::new(
                VendorCatalog::new(),
                OverrideRegistry::builtin(),
            )),
        }
    }

    /// Extractor configured from a full configuration, loading master data.
    pub fn from_config(config: &InvexConfig) -> Result<Self> {
        Ok(Self {
            config: config.extraction.clone(),
            vendors: Arc::new(VendorCache::from_config(&config.vendors)?),
        })
    }

    /// Set extraction settings.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a vendor cache, e.g. with a process that reloads it.
    pub fn with_vendor_cache(mut self, vendors: Arc<VendorCache>) -> Self {
        self.vendors = vendors;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// The vendor cache; reloads are seen by the next document.
    pub fn vendor_cache(&self) -> &Arc<VendorCache> {
        &self.vendors
    }

    /// Extract one document.
    pub fn extract(&self, document: &Document) -> InvoiceRecord {
        self.extract_with_report(document).record
    }

    /// Extract one document, keeping per-field outcomes and warnings.
    pub fn extract_with_report(&self, document: &Document) -> ExtractionReport {
        let start = Instant::now();
        let mut report = ExtractionReport::new(&document.file_name);

        if let Some(error) = &document.error {
            warn!("Tokenizer failed for {}: {}", document.file_name, error);
            report.warnings.push(format!("Tokenizer failed: {}", error));
        } else if document.words.is_empty() {
            report.warnings.push("Document has no tokens".to_string());
        } else {
            self.extract_fields(document, &mut report);
        }

        report.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} in {} ms ({} warnings)",
            document.file_name,
            report.processing_time_ms,
            report.warnings.len()
        );
        report
    }

    /// Extract many documents in parallel; output order follows input order.
    pub fn extract_batch(&self, documents: &[Document]) -> Vec<InvoiceRecord> {
        info!("Extracting batch of {} documents", documents.len());
        documents.par_iter().map(|d| self.extract(d)).collect()
    }

    /// [`extract_batch`](Self::extract_batch) keeping full reports.
    pub fn extract_reports(&self, documents: &[Document]) -> Vec<ExtractionReport> {
        documents
            .par_iter()
            .map(|d| self.extract_with_report(d))
            .collect()
    }

    /// Field arrays in [`COLUMNS`](crate::COLUMNS) order, one per document.
    pub fn export_rows(&self, documents: &[Document]) -> Vec<[String; 7]> {
        self.extract_batch(documents)
            .iter()
            .map(InvoiceRecord::columns)
            .collect()
    }

    fn extract_fields(&self, document: &Document, report: &mut ExtractionReport) {
        let state = self.vendors.snapshot();
        let first_page = normalize_tokens(&document.words, true);
        let all_pages = normalize_tokens(&document.words, false);
        debug!(
            "{}: {} tokens, {} on the first page",
            document.file_name,
            all_pages.len(),
            first_page.len()
        );

        let resolved = guarded(Field::VendorName, || {
            let lines = page_lines(&first_page, self.config.strict_tolerance);
            let hints = state.registry.identifier_hints();
            state.catalog.resolve(
                &lines,
                &document.file_name,
                &hints,
                self.config.fuzzy_vendor_threshold,
            )
        });
        let vendor = match resolved {
            Ok(Some((name, how))) => {
                report.vendor_match = Some(how);
                Ok(FieldOutcome::Found(name))
            }
            Ok(None) => Ok(FieldOutcome::NotFound),
            Err(e) => Err(e),
        };
        record(report, Field::VendorName, vendor);
        let vendor = report.record.vendor_name.clone();

        let scope = Scope {
            first_page: &first_page,
            all_pages: &all_pages,
            vendor: &vendor,
            registry: &state.registry,
            config: &self.config,
        };

        for (field, extract) in LOCATED_FIELDS {
            record(report, field, guarded(field, || extract(&scope)));
        }

        let terms = report.record.discount_terms.clone();
        let total = apply_credit_sign(&terms, &report.record.total_amount);
        report.record.total_amount = total.clone();

        record(
            report,
            Field::ShippingCost,
            guarded(Field::ShippingCost, || fields::shipping_cost(&scope, &terms)),
        );

        let date = report.record.invoice_date.clone();
        let due = guarded(Field::DiscountDueDate, || {
            if terms.is_empty() || date.is_empty() {
                return FieldOutcome::NotFound;
            }
            discount_due_date(&terms, &date).into()
        });
        record(report, Field::DiscountDueDate, due);

        let discounted = guarded(Field::DiscountedTotal, || {
            if total.is_empty() {
                return FieldOutcome::NotFound;
            }
            discounted_total(&terms, &total, &vendor).into()
        });
        record(report, Field::DiscountedTotal, discounted);
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one field's extraction, turning a panic into an error.
fn guarded<T, F>(field: Field, f: F) -> std::result::Result<T, ExtractionError>
where
    F: FnOnce() -> T,
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| ExtractionError::FieldPanicked {
        field: field.to_string(),
        message: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Store a field outcome in the report.
fn record(
    report: &mut ExtractionReport,
    field: Field,
    outcome: std::result::Result<FieldOutcome, ExtractionError>,
) {
    let outcome = outcome.unwrap_or_else(|e| FieldOutcome::Error(e.to_string()));
    match &outcome {
        FieldOutcome::Found(value) => *report.record.field_mut(field) = value.clone(),
        FieldOutcome::NotFound => debug!("{}: {} not found", report.record.file_name, field),
        FieldOutcome::Error(e) => {
            warn!("{}: {} left empty: {}", report.record.file_name, field, e);
            *report.record.field_mut(field) = String::new();
            report.warnings.push(format!("{}: {}", field, e));
        }
    }
    report.outcomes.push((field, outcome));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{doc, phrase, tok, tok_at};
    use crate::vendors::{OverrideAction, OverrideContext};

    fn sample_invoice() -> Document {
        doc(vec![
            phrase("Helinox Inc", 50.0, 20.0),
            phrase("Invoice #", 50.0, 60.0),
            vec![tok("INVUS20931", 150.0, 60.0)],
            phrase("PO Number", 50.0, 80.0),
            vec![tok("XD-5521", 150.0, 80.0)],
            phrase("Invoice Date: 01/01/2024", 50.0, 100.0),
            phrase("Terms: 2% 10 Net 30", 50.0, 120.0),
            phrase("Shipping", 50.0, 400.0),
            vec![tok("$12.50", 150.0, 400.0)],
            phrase("Total Due", 50.0, 420.0),
            vec![tok("$1,000.00", 150.0, 420.0)],
        ])
    }

    fn credit_memo(shipping: &str) -> Document {
        doc(vec![
            phrase("CREDIT MEMO", 200.0, 20.0),
            phrase("Invoice #", 50.0, 60.0),
            vec![tok("A-4591", 150.0, 60.0)],
            vec![
                tok_at("SHIPPING", 100.0, 156.0, 200.0),
                tok_at(shipping, 186.0, 221.0, 200.0),
            ],
            phrase("Total", 50.0, 420.0),
            vec![tok("$50.00", 150.0, 420.0)],
        ])
    }

    #[test]
    fn test_full_record() {
        let record = InvoiceExtractor::new().extract(&sample_invoice());

        let expected = InvoiceRecord {
            file_name: "test.pdf".to_string(),
            vendor_name: "Helinox".to_string(),
            invoice_number: "INVUS20931".to_string(),
            po_number: "XD-5521".to_string(),
            invoice_date: "01/01/24".to_string(),
            discount_terms: "2% 10 NET 30".to_string(),
            discount_due_date: "01/11/24".to_string(),
            discounted_total: "980.00".to_string(),
            shipping_cost: "12.50".to_string(),
            total_amount: "1000.00".to_string(),
        };
        assert_eq!(record, expected);
    }

    #[test]
    fn test_invoice_number_scenario() {
        let document = doc(vec![vec![
            tok_at("invoice", 100.0, 130.0, 50.0),
            tok_at("#", 131.0, 138.0, 50.0),
            tok_at("A-4591", 145.0, 180.0, 51.0),
        ]]);
        let record = InvoiceExtractor::new().extract(&document);
        assert_eq!(record.invoice_number, "A-4591");
    }

    #[test]
    fn test_credit_memo_scenario() {
        let extractor = InvoiceExtractor::new();

        for shipping in ["$0.00", "$5.00"] {
            let record = extractor.extract(&credit_memo(shipping));
            assert_eq!(record.discount_terms, "CREDIT MEMO");
            assert_eq!(record.shipping_cost, "0.00");
            assert_eq!(record.total_amount, "-50.00");
            assert_eq!(record.invoice_number, "A-4591");
            assert_eq!(record.discount_due_date, "");
            assert_eq!(record.discounted_total, "");
        }
    }

    #[test]
    fn test_credit_footer_keeps_invoice_positive() {
        let document = doc(vec![
            phrase("Terms: 2% 10 Net 30", 50.0, 120.0),
            phrase("Total", 50.0, 420.0),
            vec![tok("$100.00", 150.0, 420.0)],
            phrase("Credit memo requests must be made within 30 days.", 50.0, 700.0),
        ]);
        let record = InvoiceExtractor::new().extract(&document);

        assert_eq!(record.discount_terms, "2% 10 NET 30");
        assert_eq!(record.total_amount, "100.00");
        assert_eq!(record.discounted_total, "98.00");
    }

    #[test]
    fn test_deterministic() {
        let extractor = InvoiceExtractor::new();
        let document = sample_invoice();
        let first = extractor.extract(&document);
        for _ in 0..5 {
            assert_eq!(extractor.extract(&document), first);
        }
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let extractor = InvoiceExtractor::new();
        let document = sample_invoice();
        let mut reversed = document.clone();
        reversed.words.reverse();
        assert_eq!(extractor.extract(&reversed), extractor.extract(&document));
    }

    fn explode(_: &OverrideContext<'_>) -> FieldOutcome {
        panic!("malformed token")
    }

    #[test]
    fn test_field_failure_is_isolated() {
        let catalog = VendorCatalog::new().with_identifier("acme supply", "Acme");
        let mut document = sample_invoice();
        document.words.retain(|w| w.top != 20.0);
        document.words.extend(phrase("Acme Supply", 50.0, 20.0));

        let healthy = InvoiceExtractor::new().with_vendor_cache(Arc::new(VendorCache::new(
            catalog.clone(),
            OverrideRegistry::builtin(),
        )));
        let broken = InvoiceExtractor::new().with_vendor_cache(Arc::new(VendorCache::new(
            catalog,
            OverrideRegistry::builtin().with_rule(
                "Acme",
                Field::PoNumber,
                OverrideAction::Custom(explode),
            ),
        )));

        let expected = healthy.extract(&document);
        let report = broken.extract_with_report(&document);

        assert_eq!(expected.vendor_name, "Acme");
        assert_eq!(expected.po_number, "XD-5521");
        assert_eq!(report.record.po_number, "");
        assert_eq!(
            InvoiceRecord {
                po_number: expected.po_number.clone(),
                ..report.record.clone()
            },
            expected
        );
        assert!(matches!(
            report.outcome(Field::PoNumber),
            Some(FieldOutcome::Error(message)) if message.contains("panicked")
        ));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_vendor_override_precedence() {
        let mut document = sample_invoice();
        document.words.extend(vec![tok("55120", 250.0, 60.0)]);

        let helinox = InvoiceExtractor::new().extract(&document);
        assert_eq!(helinox.invoice_number, "INVUS20931");

        document.words.retain(|w| w.top != 20.0);
        let generic = InvoiceExtractor::new().extract(&document);
        assert_eq!(generic.vendor_name, "");
        assert_eq!(generic.invoice_number, "55120");
    }

    #[test]
    fn test_failed_and_empty_documents() {
        let extractor = InvoiceExtractor::new();

        let report = extractor.extract_with_report(&Document::failed("bad.pdf", "unreadable"));
        assert!(report.record.is_empty());
        assert_eq!(report.record.file_name, "bad.pdf");
        assert_eq!(report.warnings, vec!["Tokenizer failed: unreadable".to_string()]);

        let record = extractor.extract(&Document::new("blank.pdf", vec![]));
        assert!(record.is_empty());
    }

    #[test]
    fn test_batch_preserves_order() {
        let extractor = InvoiceExtractor::new();
        let documents = vec![
            sample_invoice(),
            Document::failed("bad.pdf", "unreadable"),
            credit_memo("$0.00"),
        ];

        let records = extractor.extract_batch(&documents);
        let sequential: Vec<InvoiceRecord> = documents.iter().map(|d| extractor.extract(d)).collect();
        assert_eq!(records, sequential);

        let rows = extractor.export_rows(&documents);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "Helinox");
        assert_eq!(rows[0][6], "1000.00");
        assert!(rows[1].iter().all(String::is_empty));
        assert_eq!(rows[2][3], "CREDIT MEMO");
    }

    #[test]
    fn test_reload_is_seen_by_next_document() {
        let extractor = InvoiceExtractor::new();
        let mut document = sample_invoice();
        document.words.retain(|w| w.top != 20.0);
        document.words.extend(phrase("Acme Supply", 50.0, 20.0));

        assert_eq!(extractor.extract(&document).vendor_name, "");
        extractor
            .vendor_cache()
            .reload_catalog(VendorCatalog::new().with_identifier("acme supply", "Acme"));
        assert_eq!(extractor.extract(&document).vendor_name, "Acme");
    }

    #[test]
    fn test_report_outcomes() {
        let report = InvoiceExtractor::new().extract_with_report(&sample_invoice());
        assert_eq!(report.outcomes.len(), 9);
        assert!(report.warnings.is_empty());
        assert!(matches!(
            report.vendor_match,
            Some(crate::vendors::VendorMatch::Identifier)
        ));
        assert_eq!(
            report.outcome(Field::DiscountDueDate),
            Some(&FieldOutcome::Found("01/11/24".to_string()))
        );
    }
}
