//! Tokenizer output consumed by the engine.

use serde::{Deserialize, Serialize};

/// A piece of text extracted from a page with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Text as produced by the tokenizer.
    pub text: String,

    /// Left edge.
    pub x0: f32,

    /// Right edge.
    pub x1: f32,

    /// Top edge (grows downwards).
    pub top: f32,

    /// Bottom edge.
    pub bottom: f32,

    /// Zero-based page index.
    #[serde(default)]
    pub page_num: u32,
}

impl Token {
    /// Create a token on the first page.
    pub fn new(text: impl Into<String>, x0: f32, x1: f32, top: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
            page_num: 0,
        }
    }

    /// Move the token to another page.
    pub fn on_page(mut self, page_num: u32) -> Self {
        self.page_num = page_num;
        self
    }
}

/// All tokens of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Source file name.
    pub file_name: String,

    /// Tokens across all pages, in no guaranteed order.
    #[serde(default)]
    pub words: Vec<Token>,

    /// Tokenizer failure, if the file could not be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Document {
    /// Create a document from its tokens.
    pub fn new(file_name: impl Into<String>, words: Vec<Token>) -> Self {
        Self {
            file_name: file_name.into(),
            words,
            error: None,
        }
    }

    /// Create a document for a file the tokenizer failed on.
    pub fn failed(file_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            words: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Number of pages spanned by the tokens.
    pub fn page_count(&self) -> u32 {
        self.words
            .iter()
            .map(|w| w.page_num + 1)
            .max()
            .unwrap_or(0)
    }
}
