//! Derived fields computed from discount terms, invoice date and total.
//!
//! These functions never look at geometry. They return `Ok(None)` when the
//! field simply does not apply and `Err` when the inputs are malformed, so
//! callers can tell "no discount" apart from "bad terms".

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ExtractionError;

use super::amounts::{format_amount, parse_amount};
use super::dates::{format_date, parse_date};
use super::patterns::{PERCENT, TERMS_NUMBER, TERMS_PERCENT_NET};
use super::terms::is_credit_label;

/// Vendors whose discounted total is always computed, even without a
/// `percent NET days` shape in their terms.
pub const ALWAYS_DISCOUNTED_VENDORS: &[&str] = &["Patagonia", "Darn Tough"];

/// Net-days count: the smallest integer in the terms not followed by `%`.
///
/// `Ok(None)` when the terms carry no numbers at all; `Err(NoNetDays)` when
/// every number is a percentage.
pub fn net_days(terms: &str) -> Result<Option<i64>, ExtractionError> {
    let mut saw_number = false;
    let mut days: Option<i64> = None;

    for caps in TERMS_NUMBER.captures_iter(terms) {
        saw_number = true;
        if caps.get(2).is_some() {
            continue;
        }
        let Ok(value) = caps[1].parse::<i64>() else {
            // Fractional numbers are never day counts.
            continue;
        };
        days = Some(days.map_or(value, |d| d.min(value)));
    }

    match (days, saw_number) {
        (Some(d), _) => Ok(Some(d)),
        (None, true) => Err(ExtractionError::NoNetDays(terms.to_string())),
        (None, false) => Ok(None),
    }
}

/// Discount due date: invoice date plus the net-days count, as `MM/DD/YY`.
pub fn discount_due_date(
    terms: &str,
    invoice_date: &str,
) -> Result<Option<String>, ExtractionError> {
    let Some(days) = net_days(terms)? else {
        return Ok(None);
    };
    let date = parse_date(invoice_date)?;

    let due = Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| ExtractionError::MalformedTerms(terms.to_string()))?;
    Ok(Some(format_date(due)))
}

/// Discounted total: `total * (1 - percent / 100)`, rounded to cents.
///
/// Requires `percent NET days`-shaped terms unless the vendor is in
/// [`ALWAYS_DISCOUNTED_VENDORS`], in which case any percentage in the terms
/// is used (or none, leaving the total unchanged).
pub fn discounted_total(
    terms: &str,
    total: &str,
    vendor: &str,
) -> Result<Option<String>, ExtractionError> {
    let percent = match TERMS_PERCENT_NET.captures(terms) {
        Some(caps) => Some(caps[1].to_string()),
        None if ALWAYS_DISCOUNTED_VENDORS.contains(&vendor) => Some(
            PERCENT
                .captures(terms)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "0".to_string()),
        ),
        None => None,
    };
    let Some(percent) = percent else {
        return Ok(None);
    };

    let percent: Decimal = percent
        .parse()
        .map_err(|_| ExtractionError::MalformedTerms(terms.to_string()))?;
    if percent > Decimal::ONE_HUNDRED {
        return Err(ExtractionError::MalformedTerms(terms.to_string()));
    }

    let total = parse_amount(total)?;
    let factor = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
    Ok(Some(format_amount(total * factor)))
}

/// Force a credit document's total negative.
///
/// Only flips positive totals; negative, zero or unparseable totals are
/// returned unchanged.
pub fn apply_credit_sign(terms: &str, total: &str) -> String {
    let trimmed = total.trim();
    if !is_credit_label(terms) {
        return trimmed.to_string();
    }
    match parse_amount(trimmed) {
        Ok(value) if value > Decimal::ZERO => format!("-{}", trimmed),
        _ => trimmed.to_string(),
    }
}

/// Standalone helper: discount due date, or `None` when not computable.
pub fn calculate_discount_due_date(terms: &str, invoice_date: &str) -> Option<String> {
    match discount_due_date(terms, invoice_date) {
        Ok(value) => value,
        Err(e) => {
            debug!("Discount due date not computable: {}", e);
            None
        }
    }
}

/// Standalone helper: discounted total, or `None` when not applicable.
pub fn calculate_discounted_total(terms: &str, total: &str, vendor: &str) -> Option<String> {
    match discounted_total(terms, total, vendor) {
        Ok(value) => value,
        Err(e) => {
            debug!("Discounted total not computable: {}", e);
            None
        }
    }
}
