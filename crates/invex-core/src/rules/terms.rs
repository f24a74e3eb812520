//! Discount terms recognition.

use super::patterns::TERMS_SHAPE;

/// Terms values marking a credit, return or warranty document.
pub const CREDIT_LABELS: &[&str] = &[
    "CREDIT MEMO",
    "CREDIT NOTE",
    "RETURN",
    "RETURN AUTHORIZATION",
    "WARRANTY",
    "DEFECTIVE",
];

/// Title phrases that mark the whole document as a credit memo.
pub const CREDIT_TITLES: &[&str] = &["credit memo", "credit note", "credit invoice"];

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the terms equal one of the [`CREDIT_LABELS`] (case-insensitive).
pub fn is_credit_label(terms: &str) -> bool {
    let upper = collapse(terms).to_uppercase();
    CREDIT_LABELS.contains(&upper.as_str())
}

/// Whether a page line is a credit document title.
///
/// The line must be a [`CREDIT_TITLES`] phrase on its own, or followed only
/// by a document number (`Credit Memo #4471`, `Credit Note No. 12`).
pub fn is_credit_title(line: &str) -> bool {
    let lower = collapse(line).to_lowercase();
    CREDIT_TITLES.iter().any(|title| {
        let Some(rest) = lower.strip_prefix(title) else {
            return false;
        };
        let rest = rest.trim_start_matches([':', ' ']);
        if rest.is_empty() || rest.starts_with('#') {
            return true;
        }
        let first = rest.split_whitespace().next().unwrap_or_default();
        let word = first.trim_end_matches(['.', ':', '#']);
        matches!(word, "no" | "number" | "nbr")
            || first.chars().next().is_some_and(|c| c.is_ascii_digit())
    })
}

/// Validate a discount terms value and return it upper-cased with single spaces.
///
/// Accepts anything carrying a terms shape (`NET 30`, `2%`, `DUE ON RECEIPT`,
/// `COD`, `PREPAID`, `30 DAYS`) or a credit label.
pub fn normalize_terms(text: &str) -> Option<String> {
    let cleaned = collapse(text.trim_start_matches([':', '#', ' ']));
    if cleaned.is_empty() {
        return None;
    }

    let upper = cleaned.to_uppercase();
    if CREDIT_LABELS.contains(&upper.as_str()) || TERMS_SHAPE.is_match(&cleaned) {
        Some(upper)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_terms() {
        assert_eq!(normalize_terms("Net 30").as_deref(), Some("NET 30"));
        assert_eq!(normalize_terms(":  2%  10 Net 30").as_deref(), Some("2% 10 NET 30"));
        assert_eq!(normalize_terms("Due upon receipt").as_deref(), Some("DUE UPON RECEIPT"));
        assert_eq!(normalize_terms("C.O.D.").as_deref(), Some("C.O.D."));
        assert_eq!(normalize_terms("credit memo").as_deref(), Some("CREDIT MEMO"));
        assert_eq!(normalize_terms("UPS Ground"), None);
        assert_eq!(normalize_terms(""), None);
    }

    #[test]
    fn test_credit_titles() {
        assert!(is_credit_title("CREDIT MEMO"));
        assert!(is_credit_title("Credit  Note"));
        assert!(is_credit_title("Credit Memo # 4471"));
        assert!(is_credit_title("Credit Memo No. 12"));
        assert!(is_credit_title("CREDIT INVOICE: 8812"));
        assert!(!is_credit_title("Credit memo requests must be made within 30 days."));
        assert!(!is_credit_title("Please apply any credit memo to the next order"));
        assert!(!is_credit_title("Invoice"));
    }

    #[test]
    fn test_credit_labels() {
        assert!(is_credit_label("CREDIT MEMO"));
        assert!(is_credit_label(" credit  memo "));
        assert!(is_credit_label("Warranty"));
        assert!(!is_credit_label("NET 30"));
        assert!(!is_credit_label("CREDIT CARD"));
    }
}
