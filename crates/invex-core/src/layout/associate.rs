//! Value association: finding a label's value by geometry.

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use super::normalize::line_from;
use super::{Candidate, LabelPosition, NormalizedToken, reading_order};

/// Vertical tolerance used when assembling a multi-token value line.
const VALUE_LINE_TOLERANCE: f32 = 5.0;

/// Association strategies, in the order fields try them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RightStrict,
    RightLoose,
    Below,
    Pattern,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::RightStrict => "right-strict",
            Strategy::RightLoose => "right-loose",
            Strategy::Below => "below",
            Strategy::Pattern => "pattern",
        };
        f.write_str(name)
    }
}

fn candidate_text(tokens: &[NormalizedToken], index: usize, line_gap: Option<f32>) -> String {
    match line_gap {
        Some(gap) => line_from(tokens, index, VALUE_LINE_TOLERANCE, gap).0,
        None => tokens[index].orig.trim().to_string(),
    }
}

fn keep_best(best: &mut Option<Candidate>, candidate: Candidate) {
    let better = match best {
        Some(current) => candidate.rank(current) == Ordering::Less,
        None => true,
    };
    if better {
        *best = Some(candidate);
    }
}

/// Search to the right of each label, on the same visual line.
///
/// Labels are tried in the given order and the first label owning a valid
/// value wins. Within one label the candidate with the smallest vertical
/// distance wins, then the smallest horizontal distance.
///
/// With `line_gap` set, a candidate's value is the whole line starting at
/// that token (joined while gaps stay within `line_gap`).
pub fn right_of<F>(
    tokens: &[NormalizedToken],
    labels: &[LabelPosition],
    tolerance: f32,
    line_gap: Option<f32>,
    accept: F,
) -> Option<Candidate>
where
    F: Fn(&str) -> Option<String>,
{
    for (li, label) in labels.iter().enumerate() {
        let mut best: Option<Candidate> = None;

        for (ti, token) in tokens.iter().enumerate() {
            if token.page_num != label.page_num || token.x0 <= label.x1 {
                continue;
            }
            let v_dist = (token.top - label.top).abs();
            if v_dist > tolerance {
                continue;
            }

            let text = candidate_text(tokens, ti, line_gap);
            if let Some(value) = accept(&text) {
                keep_best(
                    &mut best,
                    Candidate::new(ti, li, value, token.x0 - label.x1, v_dist),
                );
            }
        }

        if best.is_some() {
            return best;
        }
    }

    None
}

/// Search below the labels.
///
/// A token qualifies when its horizontal midpoint lies within the label's
/// span and it sits `0 < dy <= max_distance` under the label. The single
/// closest qualifying value across all labels wins.
pub fn below<F>(
    tokens: &[NormalizedToken],
    labels: &[LabelPosition],
    max_distance: f32,
    line_gap: Option<f32>,
    accept: F,
) -> Option<Candidate>
where
    F: Fn(&str) -> Option<String>,
{
    let mut best: Option<Candidate> = None;

    for (li, label) in labels.iter().enumerate() {
        for (ti, token) in tokens.iter().enumerate() {
            if token.page_num != label.page_num {
                continue;
            }
            let mid = token.mid_x();
            if mid < label.x0 || mid > label.x1 {
                continue;
            }
            let dy = token.top - label.top;
            if dy <= 0.0 || dy > max_distance {
                continue;
            }

            let text = candidate_text(tokens, ti, line_gap);
            if let Some(value) = accept(&text) {
                keep_best(
                    &mut best,
                    Candidate::new(ti, li, value, (mid - label.mid_x()).abs(), dy),
                );
            }
        }
    }

    best
}

/// Scan every token's original text against anchored patterns.
///
/// Patterns are tried in priority order; within a pattern tokens are read
/// in reading order. Returns the token index and capture group 1 (or the
/// whole match when the pattern has no group).
pub fn pattern_search(tokens: &[NormalizedToken], patterns: &[&Regex]) -> Option<(usize, String)> {
    let mut order: Vec<usize> = (0..tokens.len()).collect();
    order.sort_by(|&a, &b| reading_order(&tokens[a], &tokens[b]));

    for pattern in patterns {
        for &i in &order {
            if let Some(caps) = pattern.captures(tokens[i].orig.trim()) {
                let value = caps
                    .get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                if !value.is_empty() {
                    return Some((i, value));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LabelType, find_labels, normalize_tokens};
    use crate::testing::{tok, tok_at};

    fn any_value(text: &str) -> Option<String> {
        Some(text.to_string())
    }

    fn digits(text: &str) -> Option<String> {
        text.chars()
            .all(|c| c.is_ascii_digit())
            .then(|| text.to_string())
    }

    #[test]
    fn test_right_strict_scenario() {
        let words = vec![
            tok_at("invoice", 100.0, 130.0, 50.0),
            tok_at("#", 131.0, 138.0, 50.0),
            tok_at("A-4591", 145.0, 180.0, 51.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Invoice);

        let found = right_of(&tokens, &labels, 5.0, None, |t| {
            (t != "#").then(|| t.to_string())
        })
        .unwrap();
        assert_eq!(found.value, "A-4591");
        assert_eq!(found.v_dist, 1.0);
    }

    #[test]
    fn test_right_prefers_smaller_vertical_distance() {
        let words = vec![
            tok("PO", 10.0, 100.0),
            tok("1111", 60.0, 104.0),
            tok("2222", 200.0, 101.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);

        let found = right_of(&tokens, &labels, 5.0, None, digits).unwrap();
        assert_eq!(found.value, "2222");
    }

    #[test]
    fn test_right_equal_vertical_prefers_nearer() {
        let words = vec![
            tok("PO", 10.0, 100.0),
            tok("2222", 200.0, 100.0),
            tok("1111", 60.0, 100.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);

        for _ in 0..3 {
            let found = right_of(&tokens, &labels, 5.0, None, digits).unwrap();
            assert_eq!(found.value, "1111");
        }
    }

    #[test]
    fn test_right_skips_invalid_candidates() {
        let words = vec![
            tok("PO", 10.0, 100.0),
            tok("n/a", 40.0, 100.0),
            tok("5555", 90.0, 100.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);

        let found = right_of(&tokens, &labels, 5.0, None, digits).unwrap();
        assert_eq!(found.value, "5555");
    }

    #[test]
    fn test_loose_tolerance() {
        let words = vec![tok("PO", 10.0, 100.0), tok("7777", 60.0, 115.0)];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);

        assert!(right_of(&tokens, &labels, 5.0, None, digits).is_none());
        assert_eq!(
            right_of(&tokens, &labels, 20.0, None, digits).unwrap().value,
            "7777"
        );
    }

    #[test]
    fn test_below_global_best_across_labels() {
        // The first label has a distant value; the later label has a close one.
        let words = vec![
            tok_at("PO", 10.0, 40.0, 10.0),
            tok_at("1111", 12.0, 38.0, 140.0),
            tok_at("PO", 300.0, 330.0, 60.0),
            tok_at("2222", 302.0, 328.0, 80.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);
        assert_eq!(labels.len(), 2);

        let found = below(&tokens, &labels, 150.0, None, digits).unwrap();
        assert_eq!(found.value, "2222");
        assert_eq!(found.v_dist, 20.0);
    }

    #[test]
    fn test_below_requires_midpoint_within_label() {
        let words = vec![tok_at("PO", 10.0, 40.0, 10.0), tok_at("1111", 60.0, 90.0, 30.0)];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);
        assert!(below(&tokens, &labels, 150.0, None, any_value).is_none());
    }

    #[test]
    fn test_below_respects_max_distance() {
        let words = vec![tok_at("PO", 10.0, 40.0, 10.0), tok_at("1111", 12.0, 38.0, 70.0)];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Po);

        assert!(below(&tokens, &labels, 50.0, None, digits).is_none());
        assert!(below(&tokens, &labels, 150.0, None, digits).is_some());
    }

    #[test]
    fn test_labels_and_values_stay_on_their_page() {
        let words = vec![
            tok("PO", 10.0, 100.0),
            tok("9999", 60.0, 100.0).on_page(1),
        ];
        let tokens = normalize_tokens(&words, false);
        let labels = find_labels(&tokens, LabelType::Po);
        assert!(right_of(&tokens, &labels, 5.0, None, digits).is_none());
    }

    #[test]
    fn test_line_value() {
        let words = vec![
            tok("Terms", 10.0, 10.0),
            tok("2%", 80.0, 10.0),
            tok("10", 100.0, 10.0),
            tok("NET", 120.0, 10.0),
            tok("30", 145.0, 10.0),
        ];
        let tokens = normalize_tokens(&words, true);
        let labels = find_labels(&tokens, LabelType::Terms);

        let found = right_of(&tokens, &labels, 5.0, Some(40.0), any_value).unwrap();
        assert_eq!(found.value, "2% 10 NET 30");
    }

    #[test]
    fn test_pattern_search_reading_order() {
        let pattern = Regex::new(r"^PO#([A-Za-z0-9\-/]+)$").unwrap();
        let words = vec![
            tok("PO#SECOND-2", 10.0, 300.0),
            tok("PO#BADFISH-425", 10.0, 20.0),
        ];
        let tokens = normalize_tokens(&words, true);

        let (index, value) = pattern_search(&tokens, &[&pattern]).unwrap();
        assert_eq!(value, "BADFISH-425");
        assert_eq!(index, 1);
    }
}
