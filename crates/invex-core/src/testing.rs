//! Token builders shared by unit tests.

use crate::models::{Document, Token};

/// Approximate glyph width used by [`tok`].
pub const CHAR_WIDTH: f32 = 7.0;

/// A first-page token whose width follows its text length.
pub fn tok(text: &str, x0: f32, top: f32) -> Token {
    let x1 = x0 + CHAR_WIDTH * text.chars().count() as f32;
    Token::new(text, x0, x1, top, top + 10.0)
}

/// A first-page token with explicit horizontal bounds.
pub fn tok_at(text: &str, x0: f32, x1: f32, top: f32) -> Token {
    Token::new(text, x0, x1, top, top + 10.0)
}

/// Lay out a phrase as consecutive tokens starting at `x0`.
pub fn phrase(text: &str, x0: f32, top: f32) -> Vec<Token> {
    let mut x = x0;
    text.split_whitespace()
        .map(|word| {
            let t = tok(word, x, top);
            x = t.x1 + 5.0;
            t
        })
        .collect()
}

/// A document built from token groups.
pub fn doc(groups: Vec<Vec<Token>>) -> Document {
    Document::new("test.pdf", groups.into_iter().flatten().collect())
}
