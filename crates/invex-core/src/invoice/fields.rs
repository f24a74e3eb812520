//! Per-field extraction on top of the layout primitives.
//!
//! Every extractor follows the same cascade: vendor custom procedures,
//! then the generic strategies with vendor labels and validators applied,
//! then the vendor default.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::layout::{
    Candidate, LabelPosition, LabelType, NormalizedToken, Strategy, below, find_custom_labels,
    find_labels, group_lines, pattern_search, right_of,
};
use crate::models::{ExtractionConfig, Field};
use crate::rules::patterns::{PO_EMBEDDED, PO_EMBEDDED_COLON};
use crate::rules::{
    Validator, clean_identifier, find_date, format_date, is_credit_label, is_credit_title,
    is_invoice_number, is_po_number, normalize_amount, normalize_signed_amount, normalize_terms,
};
use crate::vendors::{LabelPlan, OverrideContext, OverrideRegistry};

use super::FieldOutcome;

/// Everything a field extractor reads for one document.
pub(crate) struct Scope<'a> {
    pub first_page: &'a [NormalizedToken],
    pub all_pages: &'a [NormalizedToken],
    pub vendor: &'a str,
    pub registry: &'a OverrideRegistry,
    pub config: &'a ExtractionConfig,
}

impl<'a> Scope<'a> {
    /// Tokens searched by label-driven fields.
    fn tokens(&self) -> &'a [NormalizedToken] {
        if self.config.first_page_only {
            self.first_page
        } else {
            self.all_pages
        }
    }

    fn context(&self) -> OverrideContext<'a> {
        OverrideContext {
            tokens: self.tokens(),
            all_tokens: self.all_pages,
            vendor: self.vendor,
            config: self.config,
        }
    }

    /// Labels for a field: vendor phrases first, then the generic ones,
    /// unless the vendor replaces the generic labels. With `bottom_up`, each
    /// group is ordered from the last page and lowest position upwards.
    fn labels(
        &self,
        tokens: &[NormalizedToken],
        field: Field,
        label_type: LabelType,
        bottom_up: bool,
    ) -> Vec<LabelPosition> {
        let order = |mut group: Vec<LabelPosition>| {
            if bottom_up {
                group.sort_by(|a, b| {
                    b.page_num
                        .cmp(&a.page_num)
                        .then(b.top.total_cmp(&a.top))
                        .then(a.x0.total_cmp(&b.x0))
                });
            }
            group
        };
        match self.registry.label_plan(self.vendor, field) {
            LabelPlan::Replaced(phrases) => order(custom_labels(tokens, &phrases)),
            LabelPlan::Generic { extra } => {
                let mut labels = order(custom_labels(tokens, &extra));
                labels.extend(order(find_labels(tokens, label_type)));
                labels
            }
        }
    }

    fn validator(&self, field: Field) -> Option<Validator> {
        self.registry.validator(self.vendor, field)
    }

    /// Run the override cascade around a generic extractor.
    fn with_overrides<F>(&self, field: Field, generic: F) -> FieldOutcome
    where
        F: FnOnce() -> FieldOutcome,
    {
        let context = self.context();
        for custom in self.registry.custom(self.vendor, field) {
            match custom(&context) {
                found @ FieldOutcome::Found(_) => {
                    debug!("{} for {} found by vendor procedure", field, self.vendor);
                    return found;
                }
                FieldOutcome::Error(e) => debug!("{} vendor procedure failed: {}", field, e),
                FieldOutcome::NotFound => {}
            }
        }

        match generic() {
            FieldOutcome::NotFound => match self.registry.default_value(self.vendor, field) {
                Some(default) => {
                    debug!("{} for {} falls back to default", field, self.vendor);
                    FieldOutcome::Found(default.to_string())
                }
                None => FieldOutcome::NotFound,
            },
            outcome => outcome,
        }
    }
}

fn custom_labels(tokens: &[NormalizedToken], phrases: &[&str]) -> Vec<LabelPosition> {
    phrases
        .iter()
        .flat_map(|p| find_custom_labels(tokens, p))
        .collect()
}

/// Apply a candidate check; a check that panics rejects the candidate.
fn screen<F>(field: Field, accept: &F, text: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| accept(text))) {
        Ok(value) => value,
        Err(_) => {
            debug!("{} candidate {:?} rejected: validator panicked", field, text);
            None
        }
    }
}

/// Label searches shared by most fields.
struct Search<'s> {
    tokens: &'s [NormalizedToken],
    labels: Vec<LabelPosition>,
    line_gap: Option<f32>,
}

impl Search<'_> {
    /// Try the given strategies in order; the first candidate wins.
    fn run<F>(&self, field: Field, strategies: &[(Strategy, f32)], accept: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.labels.is_empty() {
            return None;
        }
        let accept = |text: &str| screen(field, &accept, text);

        for &(strategy, distance) in strategies {
            let found: Option<Candidate> = match strategy {
                Strategy::RightStrict | Strategy::RightLoose => {
                    right_of(self.tokens, &self.labels, distance, self.line_gap, &accept)
                }
                Strategy::Below => below(self.tokens, &self.labels, distance, self.line_gap, &accept),
                Strategy::Pattern => None,
            };
            if let Some(candidate) = found {
                debug!(
                    "{} = {:?} via {} from label {:?}",
                    field, candidate.value, strategy, self.labels[candidate.label].label_text
                );
                return Some(candidate.value);
            }
        }

        None
    }
}

fn strategies(config: &ExtractionConfig, below_distance: f32) -> [(Strategy, f32); 3] {
    [
        (Strategy::RightStrict, config.strict_tolerance),
        (Strategy::RightLoose, config.loose_tolerance),
        (Strategy::Below, below_distance),
    ]
}

/// Accept a single-token identifier when the validator passes.
fn identifier(validator: Validator) -> impl Fn(&str) -> Option<String> {
    move |text: &str| {
        let value = clean_identifier(text);
        (!value.is_empty() && validator(&value)).then_some(value)
    }
}

pub(crate) fn invoice_number(scope: &Scope<'_>) -> FieldOutcome {
    scope.with_overrides(Field::InvoiceNumber, || {
        let tokens = scope.tokens();
        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::InvoiceNumber, LabelType::Invoice, false),
            line_gap: None,
        };
        let validator = scope.validator(Field::InvoiceNumber).unwrap_or(is_invoice_number);

        search
            .run(
                Field::InvoiceNumber,
                &strategies(scope.config, scope.config.below_distance),
                identifier(validator),
            )
            .into()
    })
}

pub(crate) fn po_number(scope: &Scope<'_>) -> FieldOutcome {
    scope.with_overrides(Field::PoNumber, || {
        let tokens = scope.tokens();
        let accept = identifier(scope.validator(Field::PoNumber).unwrap_or(is_po_number));

        if let Some((index, value)) = pattern_search(tokens, &[&*PO_EMBEDDED, &*PO_EMBEDDED_COLON]) {
            if let Some(value) = screen(Field::PoNumber, &accept, &value) {
                debug!(
                    "{} = {:?} via {} in {:?}",
                    Field::PoNumber,
                    value,
                    Strategy::Pattern,
                    tokens[index].orig
                );
                return FieldOutcome::Found(value);
            }
        }

        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::PoNumber, LabelType::Po, false),
            line_gap: None,
        };
        search
            .run(
                Field::PoNumber,
                &strategies(scope.config, scope.config.tight_below_distance),
                accept,
            )
            .into()
    })
}

pub(crate) fn invoice_date(scope: &Scope<'_>) -> FieldOutcome {
    scope.with_overrides(Field::InvoiceDate, || {
        let tokens = scope.tokens();
        let validator = scope.validator(Field::InvoiceDate);
        let accept = |line: &str| {
            if validator.is_some_and(|v| !v(line)) {
                return None;
            }
            find_date(line).map(format_date)
        };

        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::InvoiceDate, LabelType::InvoiceDate, false),
            line_gap: Some(scope.config.line_gap),
        };
        if let Some(date) = search.run(
            Field::InvoiceDate,
            &strategies(scope.config, scope.config.below_distance),
            &accept,
        ) {
            return FieldOutcome::Found(date);
        }

        // First date on the first page, in reading order.
        first_page_lines(scope)
            .iter()
            .find_map(|line| screen(Field::InvoiceDate, &accept, line))
            .into()
    })
}

pub(crate) fn discount_terms(scope: &Scope<'_>) -> FieldOutcome {
    scope.with_overrides(Field::DiscountTerms, || {
        if first_page_lines(scope).iter().any(|line| is_credit_title(line)) {
            return FieldOutcome::Found("CREDIT MEMO".to_string());
        }

        let tokens = scope.tokens();
        let validator = scope.validator(Field::DiscountTerms);
        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::DiscountTerms, LabelType::Terms, false),
            line_gap: Some(scope.config.line_gap),
        };
        search
            .run(
                Field::DiscountTerms,
                &strategies(scope.config, scope.config.tight_below_distance),
                |line| {
                    if validator.is_some_and(|v| !v(line)) {
                        return None;
                    }
                    normalize_terms(line)
                },
            )
            .into()
    })
}

/// Total amount, read from every page with the last label first.
pub(crate) fn total_amount(scope: &Scope<'_>) -> FieldOutcome {
    scope.with_overrides(Field::TotalAmount, || {
        let tokens = scope.all_pages;
        let validator = scope.validator(Field::TotalAmount);
        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::TotalAmount, LabelType::Total, true),
            line_gap: None,
        };
        search
            .run(
                Field::TotalAmount,
                &strategies(scope.config, scope.config.below_distance),
                |text| {
                    if validator.is_some_and(|v| !v(text)) {
                        return None;
                    }
                    normalize_signed_amount(text)
                },
            )
            .into()
    })
}

/// Shipping cost from every page; credit documents always ship free.
pub(crate) fn shipping_cost(scope: &Scope<'_>, terms: &str) -> FieldOutcome {
    scope.with_overrides(Field::ShippingCost, || {
        if is_credit_label(terms) {
            return FieldOutcome::Found("0.00".to_string());
        }

        let tokens = scope.all_pages;
        let validator = scope.validator(Field::ShippingCost);
        let search = Search {
            tokens,
            labels: scope.labels(tokens, Field::ShippingCost, LabelType::Shipping, false),
            line_gap: None,
        };
        search
            .run(
                Field::ShippingCost,
                &strategies(scope.config, scope.config.tight_below_distance),
                |text| {
                    if validator.is_some_and(|v| !v(text)) {
                        return None;
                    }
                    normalize_amount(text)
                },
            )
            .into()
    })
}

/// First-page lines as text, in reading order.
pub(crate) fn first_page_lines(scope: &Scope<'_>) -> Vec<String> {
    page_lines(scope.first_page, scope.config.strict_tolerance)
}

pub(crate) fn page_lines(tokens: &[NormalizedToken], tolerance: f32) -> Vec<String> {
    group_lines(tokens, tolerance)
        .into_iter()
        .map(|line| {
            line.iter()
                .map(|&i| tokens[i].orig.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}
