//! Generic field validators.
//!
//! Validators are pure predicates over a candidate's text. Vendor-specific
//! predicates live with the vendor rules and replace these wholesale.

use regex::Regex;

use super::patterns::*;

/// Function-pointer form shared by generic and vendor validators.
pub type Validator = fn(&str) -> bool;

/// Trim punctuation that tokenizers leave around values.
pub fn clean_value(text: &str) -> &str {
    text.trim()
        .trim_start_matches(':')
        .trim_end_matches([':', ',', ';'])
        .trim()
}

/// [`clean_value`] plus a leading `#` removed.
pub fn clean_identifier(text: &str) -> String {
    clean_value(text).trim_start_matches('#').trim().to_string()
}

/// Generic invoice number shape.
///
/// Optional `#`, optional 1-4 letters and a hyphen, at least two digits,
/// then letters, digits, hyphens or slashes. Tokens starting `XD-` are PO
/// numbers; phone numbers and dates are rejected.
pub fn is_invoice_number(text: &str) -> bool {
    let text = clean_value(text);
    INVOICE_NUMBER.is_match(text)
        && !PO_RESERVED_PREFIX.is_match(text)
        && !PHONE_NUMBER.is_match(text)
        && !DATE_SHAPE.is_match(text)
}

enum Verdict {
    Accept,
    Reject,
    /// Accept unless the text is an excluded word.
    NameLike,
}

/// Words that look like names but never are PO numbers.
const NAME_EXCLUSIONS: &[&str] = &[
    "sale", "freeman", "net", "date", "terms", "page", "number", "order", "none", "invoice",
    "total", "ship", "via", "customer", "ups", "fedex", "prepaid", "collect",
];

fn po_shapes() -> [(&'static Regex, Verdict); 13] {
    [
        (&*DATE_SHAPE, Verdict::Reject),
        (&*PO_XD, Verdict::Accept),
        (&*PO_SE, Verdict::Accept),
        (&*PHONE_NUMBER, Verdict::Reject),
        (&*PO_ALPHA_HYPHEN_NUMERIC, Verdict::Accept),
        (&*PO_SLASH_DELIMITED, Verdict::Accept),
        (&*PO_NUMERIC, Verdict::Accept),
        (&*PO_NUMERIC_HYPHENATED, Verdict::Accept),
        (&*PO_ALPHA_PREFIX, Verdict::Accept),
        (&*PO_NUMERIC_SUFFIX, Verdict::Accept),
        (&*PO_UNDERSCORE, Verdict::Accept),
        (&*PO_EMBEDDED, Verdict::Accept),
        (&*PO_NAME_LIKE, Verdict::NameLike),
    ]
}

/// Generic PO number shape: shape families evaluated top to bottom, the
/// first family matching decides.
pub fn is_po_number(text: &str) -> bool {
    let text = clean_value(text);
    if text.is_empty() {
        return false;
    }

    for (pattern, verdict) in po_shapes() {
        if !pattern.is_match(text) {
            continue;
        }
        return match verdict {
            Verdict::Accept => true,
            Verdict::Reject => false,
            Verdict::NameLike => {
                let lower = text.to_lowercase();
                !(NAME_EXCLUSIONS.contains(&lower.as_str())
                    || lower.contains("sale")
                    || lower.contains("freeman"))
            }
        };
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_shapes() {
        assert!(is_invoice_number("A-4591"));
        assert!(is_invoice_number("#123456"));
        assert!(is_invoice_number("INV-00123/B"));
        assert!(is_invoice_number("12"));
        assert!(is_invoice_number("98765:"));

        assert!(!is_invoice_number("XD-5521"));
        assert!(!is_invoice_number("800-555-1234"));
        assert!(!is_invoice_number("(800) 555-1234"));
        assert!(!is_invoice_number("01/02/2024"));
        assert!(!is_invoice_number("INVOICE"));
        assert!(!is_invoice_number("ABCDE-123"));
        assert!(!is_invoice_number("7"));
    }

    #[test]
    fn test_po_number_shapes() {
        assert!(is_po_number("XD-5521"));
        assert!(is_po_number("#SE10442"));
        assert!(is_po_number("BADFISH-425"));
        assert!(is_po_number("FALL/24/SHOP"));
        assert!(is_po_number("77812"));
        assert!(is_po_number("2024-118"));
        assert!(is_po_number("PO4471"));
        assert!(is_po_number("4471B"));
        assert!(is_po_number("SPRING_RESTOCK"));
        assert!(is_po_number("Jenkins"));

        assert!(!is_po_number("01/15/2024"));
        assert!(!is_po_number("555-867-5309"));
        assert!(!is_po_number("Sale"));
        assert!(!is_po_number("Freeman"));
        assert!(!is_po_number("Garage-Sale"));
        assert!(!is_po_number("Net"));
        assert!(!is_po_number("1234"));
        assert!(!is_po_number(""));
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier(" #A-4591: "), "A-4591");
        assert_eq!(clean_value(":77812,"), "77812");
    }
}
