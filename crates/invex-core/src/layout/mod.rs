//! Spatial reasoning over positioned tokens.
//!
//! Tokens are normalized once per field search, labels are located by
//! keyword rules, and values are associated with labels purely by
//! coordinates. List order is only used as the final tie-break.

mod associate;
mod labels;
mod normalize;

pub use associate::{Strategy, below, pattern_search, right_of};
pub use labels::{LabelType, find_custom_labels, find_labels};
pub use normalize::{group_lines, line_from, normalize_text, normalize_tokens};

use std::cmp::Ordering;

/// A token with cleaned text, keeping the original text and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedToken {
    /// Position in the document's token list.
    pub index: usize,
    /// Lower-cased text with `:` and `#` removed.
    pub text: String,
    /// Text exactly as the tokenizer produced it.
    pub orig: String,
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: f32,
    pub page_num: u32,
}

impl NormalizedToken {
    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Text used when comparing against label keywords.
    ///
    /// A bare `#` normalizes to an empty string; it is reported as `#`.
    pub fn label_word(&self) -> &str {
        if self.text.is_empty() && self.orig.contains('#') {
            "#"
        } else {
            self.text.trim_end_matches('.')
        }
    }
}

/// Bounding region of a recognized label phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPosition {
    pub x0: f32,
    pub x1: f32,
    pub top: f32,
    pub bottom: Option<f32>,
    pub page_num: u32,
    /// The label phrase as matched, e.g. `invoice #`.
    pub label_text: String,
}

impl LabelPosition {
    fn spanning(first: &NormalizedToken, last: &NormalizedToken, label_text: String) -> Self {
        Self {
            x0: first.x0,
            x1: last.x1,
            top: last.top,
            bottom: Some(last.bottom),
            page_num: last.page_num,
            label_text,
        }
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }
}

/// A value token associated with a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Index (into the normalized token slice) of the value's first token.
    pub token: usize,
    /// Index of the label the value was found from.
    pub label: usize,
    /// Accepted, cleaned value.
    pub value: String,
    /// Horizontal distance from the label.
    pub h_dist: f32,
    /// Vertical distance from the label.
    pub v_dist: f32,
    /// Composite score; lower is better.
    pub score: f32,
}

impl Candidate {
    pub(crate) fn new(token: usize, label: usize, value: String, h_dist: f32, v_dist: f32) -> Self {
        Self {
            token,
            label,
            value,
            h_dist,
            v_dist,
            score: v_dist * 1000.0 + h_dist,
        }
    }

    /// Deterministic ordering: vertical distance, then horizontal, then token position.
    pub fn rank(&self, other: &Candidate) -> Ordering {
        self.v_dist
            .total_cmp(&other.v_dist)
            .then(self.h_dist.total_cmp(&other.h_dist))
            .then(self.token.cmp(&other.token))
    }
}

/// Reading order: page, then top, then left edge, then list position.
pub(crate) fn reading_order(a: &NormalizedToken, b: &NormalizedToken) -> Ordering {
    a.page_num
        .cmp(&b.page_num)
        .then(a.top.total_cmp(&b.top))
        .then(a.x0.total_cmp(&b.x0))
        .then(a.index.cmp(&b.index))
}
