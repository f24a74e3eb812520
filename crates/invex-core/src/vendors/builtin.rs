//! Built-in vendor rules.

use lazy_static::lazy_static;
use regex::Regex;

use crate::invoice::FieldOutcome;
use crate::layout::{LabelType, find_custom_labels, find_labels, right_of};
use crate::models::Field;
use crate::rules::patterns::PERCENT;
use crate::rules::{clean_identifier, is_po_number};

use super::registry::{OverrideAction, OverrideContext};

lazy_static! {
    static ref HELINOX_INVOICE: Regex = Regex::new(r"^INVUS\d+$").unwrap();
    static ref OBOZ_INVOICE: Regex = Regex::new(r"^CSI\d+$").unwrap();
    static ref OSPREY_INVOICE: Regex = Regex::new(r"^\d{7,8}$").unwrap();
    static ref CHACO_PO: Regex = Regex::new(r"^\d{4,6}$").unwrap();
    static ref MEMO_DAYS: Regex = Regex::new(r"(?i)(?:net\s*(\d+)|(\d+)\s*days?)").unwrap();
    static ref PO_FRAGMENT: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-/]*$").unwrap();
}

/// Max distance from a PO fragment to its continuation on the next line.
const CONTINUATION_DISTANCE: f32 = 20.0;

fn helinox_invoice(text: &str) -> bool {
    HELINOX_INVOICE.is_match(&clean_identifier(text))
}

fn oboz_invoice(text: &str) -> bool {
    OBOZ_INVOICE.is_match(&clean_identifier(text))
}

fn osprey_invoice(text: &str) -> bool {
    OSPREY_INVOICE.is_match(&clean_identifier(text))
}

fn chaco_po(text: &str) -> bool {
    let value = clean_identifier(text);
    CHACO_PO.is_match(&value) || is_po_number(&value)
}

/// Terms written in a `Memo` line, e.g. `Memo: 8% 60 days` becomes `8% NET 60`.
fn memo_terms(ctx: &OverrideContext<'_>) -> FieldOutcome {
    let labels = find_custom_labels(ctx.tokens, "memo");
    let found = right_of(
        ctx.tokens,
        &labels,
        ctx.config.strict_tolerance,
        Some(ctx.config.line_gap),
        |line| {
            let percent = PERCENT.captures(line)?;
            let rest = &line[percent.get(0)?.end()..];
            let days = MEMO_DAYS
                .captures(rest)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string());
            Some(match days {
                Some(days) => format!("{}% NET {}", &percent[1], days),
                None => format!("{}%", &percent[1]),
            })
        },
    );

    found.map(|c| c.value).into()
}

/// PO numbers broken across two lines after a trailing `-` or `/`.
fn split_po(ctx: &OverrideContext<'_>) -> FieldOutcome {
    let tokens = ctx.tokens;
    let labels = find_labels(tokens, LabelType::Po);
    let Some(first) = right_of(tokens, &labels, ctx.config.strict_tolerance, None, |text| {
        let value = clean_identifier(text);
        PO_FRAGMENT.is_match(&value).then_some(value)
    }) else {
        return FieldOutcome::NotFound;
    };

    if first.value.ends_with(['-', '/']) {
        let head = &tokens[first.token];
        let continuation = tokens
            .iter()
            .filter(|t| {
                let dy = t.top - head.top;
                t.page_num == head.page_num
                    && dy > 0.0
                    && dy <= CONTINUATION_DISTANCE
                    && t.x0 < head.x1
                    && t.x1 > head.x0
            })
            .min_by(|a, b| a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0)));

        if let Some(tail) = continuation {
            let joined = format!("{}{}", first.value, clean_identifier(&tail.orig));
            if is_po_number(&joined) {
                return FieldOutcome::Found(joined);
            }
        }
    }

    if is_po_number(&first.value) {
        FieldOutcome::Found(first.value)
    } else {
        FieldOutcome::NotFound
    }
}

/// Vendor rules registered by [`OverrideRegistry::builtin`](super::OverrideRegistry::builtin).
pub(crate) fn rules() -> Vec<(&'static str, Field, OverrideAction)> {
    vec![
        ("Helinox", Field::InvoiceNumber, OverrideAction::Validator(helinox_invoice)),
        (
            "Helinox",
            Field::VendorName,
            OverrideAction::identifiers(&["helinox.com", "helinox inc"]),
        ),
        ("Oboz", Field::InvoiceNumber, OverrideAction::Validator(oboz_invoice)),
        (
            "Oboz",
            Field::VendorName,
            OverrideAction::identifiers(&["obozfootwear.com", "oboz footwear"]),
        ),
        (
            "Kuhl",
            Field::InvoiceNumber,
            OverrideAction::extra_labels(&["Transaction Number"]),
        ),
        (
            "Smartwool",
            Field::InvoiceNumber,
            OverrideAction::extra_labels(&["Credit Note", "Credit Note No."]),
        ),
        (
            "Thule",
            Field::PoNumber,
            OverrideAction::extra_labels(&["Purchaser Order No."]),
        ),
        (
            "Osprey",
            Field::InvoiceNumber,
            OverrideAction::replace_labels(&["Document No."]),
        ),
        ("Osprey", Field::InvoiceNumber, OverrideAction::Validator(osprey_invoice)),
        ("Chaco", Field::PoNumber, OverrideAction::Validator(chaco_po)),
        (
            "Yeti",
            Field::InvoiceDate,
            OverrideAction::extra_labels(&["Document Date"]),
        ),
        (
            "Stanley",
            Field::TotalAmount,
            OverrideAction::extra_labels(&["Net Amount"]),
        ),
        (
            "Hydro Flask",
            Field::DiscountTerms,
            OverrideAction::default_value("NET 30"),
        ),
        ("Darn Tough", Field::DiscountTerms, OverrideAction::Custom(memo_terms)),
        ("Black Diamond", Field::PoNumber, OverrideAction::Custom(split_po)),
        ("Prana", Field::ShippingCost, OverrideAction::default_value("0.00")),
    ]
}
