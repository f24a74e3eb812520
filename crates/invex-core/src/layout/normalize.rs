//! Token normalization and line assembly.

use crate::models::Token;

use super::{NormalizedToken, reading_order};

/// Lower-case, strip `:` and `#`, and trim.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != ':' && *c != '#')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize tokens, optionally keeping only the first page.
pub fn normalize_tokens(words: &[Token], first_page_only: bool) -> Vec<NormalizedToken> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| !first_page_only || w.page_num == 0)
        .map(|(index, w)| NormalizedToken {
            index,
            text: normalize_text(&w.text),
            orig: w.text.clone(),
            x0: w.x0,
            x1: w.x1,
            top: w.top,
            bottom: w.bottom,
            page_num: w.page_num,
        })
        .collect()
}

/// Nearest token continuing the line to the right of `tokens[from]`.
pub(crate) fn next_on_line(
    tokens: &[NormalizedToken],
    from: usize,
    tolerance: f32,
    max_gap: f32,
) -> Option<usize> {
    let anchor = &tokens[from];
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            *i != from
                && t.page_num == anchor.page_num
                && (t.top - anchor.top).abs() <= tolerance
                && t.x0 >= anchor.x1 - 1.0
                && t.x0 - anchor.x1 <= max_gap
        })
        .min_by(|(_, a), (_, b)| a.x0.total_cmp(&b.x0).then(a.index.cmp(&b.index)))
        .map(|(i, _)| i)
}

/// Nearest token preceding `tokens[from]` on its line.
pub(crate) fn prev_on_line(
    tokens: &[NormalizedToken],
    from: usize,
    tolerance: f32,
    max_gap: f32,
) -> Option<usize> {
    let anchor = &tokens[from];
    tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            *i != from
                && t.page_num == anchor.page_num
                && (t.top - anchor.top).abs() <= tolerance
                && t.x1 <= anchor.x0 + 1.0
                && anchor.x0 - t.x1 <= max_gap
        })
        .max_by(|(_, a), (_, b)| a.x1.total_cmp(&b.x1).then(b.index.cmp(&a.index)))
        .map(|(i, _)| i)
}

/// Join `tokens[start]` with the tokens continuing its line.
///
/// Returns the original texts joined by single spaces, and the indices used.
pub fn line_from(
    tokens: &[NormalizedToken],
    start: usize,
    tolerance: f32,
    max_gap: f32,
) -> (String, Vec<usize>) {
    let mut used = vec![start];
    let mut current = start;

    while let Some(next) = next_on_line(tokens, current, tolerance, max_gap) {
        if used.contains(&next) {
            break;
        }
        used.push(next);
        current = next;
    }

    let text = used
        .iter()
        .map(|&i| tokens[i].orig.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (text, used)
}

/// Group tokens into visual lines, in reading order.
///
/// A token joins the current line while its top stays within `tolerance`
/// of the line's first token.
pub fn group_lines(tokens: &[NormalizedToken], tolerance: f32) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..tokens.len()).collect();
    order.sort_by(|&a, &b| reading_order(&tokens[a], &tokens[b]));

    let mut lines: Vec<Vec<usize>> = Vec::new();
    for i in order {
        let t = &tokens[i];
        match lines.last_mut() {
            Some(line)
                if tokens[line[0]].page_num == t.page_num
                    && (t.top - tokens[line[0]].top).abs() <= tolerance =>
            {
                line.push(i);
            }
            _ => lines.push(vec![i]),
        }
    }

    for line in &mut lines {
        line.sort_by(|&a, &b| tokens[a].x0.total_cmp(&tokens[b].x0));
    }

    lines
}
