//! Label location: single-token, two-token and custom phrase labels.

use serde::{Deserialize, Serialize};

use super::normalize::{next_on_line, normalize_text, prev_on_line};
use super::{LabelPosition, NormalizedToken};

/// Vertical tolerance for tokens forming one label phrase.
const LABEL_LINE_TOLERANCE: f32 = 5.0;

/// Max horizontal gap between words of one label phrase.
const LABEL_WORD_GAP: f32 = 30.0;

/// Kinds of field labels with built-in keyword rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    Invoice,
    Po,
    InvoiceDate,
    Terms,
    Total,
    Shipping,
}

struct LabelRule {
    keyword: &'static str,
    /// Second words forming a two-token label with `keyword`.
    continuations: &'static [&'static str],
    /// Whether `keyword` alone is a label.
    single: bool,
    /// Single-token match is dropped when preceded by one of these.
    exclude_prev: &'static [&'static str],
    /// Single-token match is dropped when followed by one of these.
    exclude_next: &'static [&'static str],
}

const NUMBER_WORDS: &[&str] = &["#", "no", "number", "num", "nbr"];

const INVOICE_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "invoice",
        continuations: NUMBER_WORDS,
        single: true,
        exclude_prev: &["original"],
        exclude_next: &["date", "total", "amount", "to"],
    },
    LabelRule {
        keyword: "inv",
        continuations: NUMBER_WORDS,
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
];

const PO_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "po",
        continuations: NUMBER_WORDS,
        single: true,
        exclude_prev: &[],
        exclude_next: &["box"],
    },
    LabelRule {
        keyword: "p.o",
        continuations: NUMBER_WORDS,
        single: true,
        exclude_prev: &[],
        exclude_next: &["box"],
    },
    LabelRule {
        keyword: "purchase",
        continuations: &["order"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "customer",
        continuations: &["po", "order"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
];

const DATE_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "invoice",
        continuations: &["date"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "inv",
        continuations: &["date"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "date",
        continuations: &[],
        single: true,
        exclude_prev: &[
            "due", "ship", "shipped", "order", "delivery", "cancel", "print", "payment", "discount",
        ],
        exclude_next: &["shipped", "due"],
    },
];

const TERMS_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "terms",
        continuations: &[],
        single: true,
        exclude_prev: &["shipping", "delivery", "freight"],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "payment",
        continuations: &["terms"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "term",
        continuations: &[],
        single: true,
        exclude_prev: &[],
        exclude_next: &[],
    },
];

const TOTAL_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "total",
        continuations: &["due", "amount"],
        single: true,
        exclude_prev: &["sub", "line", "tax", "merchandise", "item", "qty", "units"],
        exclude_next: &["qty", "units", "weight", "tax", "discount", "pieces"],
    },
    LabelRule {
        keyword: "invoice",
        continuations: &["total", "amount"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "amount",
        continuations: &["due"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "balance",
        continuations: &["due"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
    LabelRule {
        keyword: "grand",
        continuations: &["total"],
        single: false,
        exclude_prev: &[],
        exclude_next: &[],
    },
];

const SHIPPING_RULES: &[LabelRule] = &[
    LabelRule {
        keyword: "shipping",
        continuations: &["handling", "charges", "&", "and"],
        single: true,
        exclude_prev: &[],
        exclude_next: &["address", "method", "date", "via", "to", "point", "terms"],
    },
    LabelRule {
        keyword: "freight",
        continuations: &["charges", "out"],
        single: true,
        exclude_prev: &[],
        exclude_next: &["terms"],
    },
    LabelRule {
        keyword: "s&h",
        continuations: &[],
        single: true,
        exclude_prev: &[],
        exclude_next: &[],
    },
];

impl LabelType {
    fn rules(self) -> &'static [LabelRule] {
        match self {
            LabelType::Invoice => INVOICE_RULES,
            LabelType::Po => PO_RULES,
            LabelType::InvoiceDate => DATE_RULES,
            LabelType::Terms => TERMS_RULES,
            LabelType::Total => TOTAL_RULES,
            LabelType::Shipping => SHIPPING_RULES,
        }
    }
}

fn neighbour_in(word: Option<&str>, set: &[&str]) -> bool {
    word.is_some_and(|w| set.contains(&w))
}

/// Locate generic labels of one type, in reading order.
///
/// Two-token and single-token matches are both collected and unioned.
pub fn find_labels(tokens: &[NormalizedToken], label_type: LabelType) -> Vec<LabelPosition> {
    let mut found = Vec::new();

    for rule in label_type.rules() {
        for (i, token) in tokens.iter().enumerate() {
            if token.label_word() != rule.keyword {
                continue;
            }

            let next = next_on_line(tokens, i, LABEL_LINE_TOLERANCE, LABEL_WORD_GAP);
            let next_word = next.map(|n| tokens[n].label_word());

            if let Some(n) = next {
                if rule.continuations.contains(&tokens[n].label_word()) {
                    let text = format!("{} {}", token.label_word(), tokens[n].label_word());
                    found.push(LabelPosition::spanning(token, &tokens[n], text));
                }
            }

            if rule.single {
                let prev_word = prev_on_line(tokens, i, LABEL_LINE_TOLERANCE, LABEL_WORD_GAP)
                    .map(|p| tokens[p].label_word());
                if neighbour_in(prev_word, rule.exclude_prev)
                    || neighbour_in(next_word, rule.exclude_next)
                {
                    continue;
                }
                found.push(LabelPosition::spanning(token, token, rule.keyword.to_string()));
            }
        }
    }

    sort_and_dedup(found)
}

/// Locate an arbitrary label phrase such as `Purchaser Order No.`.
pub fn find_custom_labels(tokens: &[NormalizedToken], phrase: &str) -> Vec<LabelPosition> {
    let words: Vec<String> = phrase
        .split_whitespace()
        .map(|w| {
            let n = normalize_text(w);
            if n.is_empty() && w.contains('#') {
                "#".to_string()
            } else {
                n.trim_end_matches('.').to_string()
            }
        })
        .filter(|w| !w.is_empty())
        .collect();

    let Some(first_word) = words.first() else {
        return Vec::new();
    };

    let mut found = Vec::new();
    'start: for (i, token) in tokens.iter().enumerate() {
        if token.label_word() != first_word {
            continue;
        }

        let mut last = i;
        for word in &words[1..] {
            match next_on_line(tokens, last, LABEL_LINE_TOLERANCE, LABEL_WORD_GAP) {
                Some(n) if tokens[n].label_word() == word => last = n,
                _ => continue 'start,
            }
        }

        found.push(LabelPosition::spanning(token, &tokens[last], words.join(" ")));
    }

    sort_and_dedup(found)
}

fn sort_and_dedup(mut labels: Vec<LabelPosition>) -> Vec<LabelPosition> {
    labels.sort_by(|a, b| {
        a.page_num
            .cmp(&b.page_num)
            .then(a.top.total_cmp(&b.top))
            .then(a.x0.total_cmp(&b.x0))
            .then(a.x1.total_cmp(&b.x1))
    });
    labels.dedup_by(|a, b| {
        a.page_num == b.page_num && a.x0 == b.x0 && a.x1 == b.x1 && a.top == b.top
    });
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::normalize_tokens;
    use crate::testing::{phrase, tok, tok_at};

    #[test]
    fn test_two_token_invoice_label() {
        let words = vec![
            tok_at("invoice", 100.0, 130.0, 50.0),
            tok_at("#", 131.0, 138.0, 50.0),
            tok_at("A-4591", 145.0, 180.0, 51.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Invoice);

        let two = labels.iter().find(|l| l.label_text == "invoice #").unwrap();
        assert_eq!(two.x0, 100.0);
        assert_eq!(two.x1, 138.0);
        assert_eq!(two.top, 50.0);
        // The single-token match is kept alongside the two-token one.
        assert!(labels.iter().any(|l| l.label_text == "invoice" && l.x1 == 130.0));
    }

    #[test]
    fn test_invoice_date_is_not_invoice_number_label() {
        let tokens = normalize_tokens(&phrase("Invoice Date: 01/02/2024", 10.0, 10.0), true);
        assert!(find_labels(&tokens, LabelType::Invoice).is_empty());

        let dates = find_labels(&tokens, LabelType::InvoiceDate);
        assert!(dates.iter().any(|l| l.label_text == "invoice date"));
    }

    #[test]
    fn test_original_invoice_excluded() {
        let tokens = normalize_tokens(&phrase("Original Invoice", 10.0, 10.0), true);
        assert!(find_labels(&tokens, LabelType::Invoice).is_empty());
    }

    #[test]
    fn test_hash_suffix_token_is_single_label() {
        let tokens = normalize_tokens(&[tok("Invoice#:", 10.0, 10.0)], true);
        let labels = find_labels(&tokens, LabelType::Invoice);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label_text, "invoice");
    }

    #[test]
    fn test_purchase_order_requires_continuation() {
        let tokens = normalize_tokens(&phrase("Purchase Order: 77812", 10.0, 10.0), true);
        let labels = find_labels(&tokens, LabelType::Po);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label_text, "purchase order");

        let tokens = normalize_tokens(&phrase("Purchase history", 10.0, 10.0), true);
        assert!(find_labels(&tokens, LabelType::Po).is_empty());
    }

    #[test]
    fn test_subtotal_words_excluded_from_total() {
        let mut words = phrase("Sub Total 90.00", 10.0, 10.0);
        words.extend(phrase("Total 100.00", 10.0, 40.0));
        let tokens = normalize_tokens(&words, true);

        let labels = find_labels(&tokens, LabelType::Total);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].top, 40.0);
    }

    #[test]
    fn test_custom_phrase() {
        let tokens = normalize_tokens(&phrase("Purchaser Order No. 4471", 10.0, 10.0), true);
        let labels = find_custom_labels(&tokens, "Purchaser Order No.");

        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].label_text, "purchaser order no");
        assert_eq!(labels[0].x0, 10.0);
        assert!(labels[0].x1 < tokens[3].x0);
    }

    #[test]
    fn test_custom_phrase_must_be_contiguous() {
        let mut words = phrase("Transaction", 10.0, 10.0);
        words.extend(phrase("Number", 10.0, 60.0));
        let tokens = normalize_tokens(&words, true);
        assert!(find_custom_labels(&tokens, "Transaction Number").is_empty());
    }
}
