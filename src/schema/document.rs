use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype wrapper for document identifiers.
///
/// Identifiers come from the input table as text; rows without one are
/// numbered by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl From<usize> for DocumentId {
    fn from(row: usize) -> Self {
        Self(row.to_string())
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A source document: identifier plus raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One candidate sentence produced from a template, one word per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSentence {
    pub document: DocumentId,
    pub words: Vec<String>,
}

impl GeneratedSentence {
    /// The sentence as a single space-joined string.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Whether the selected sentences reproduce the target bag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
    Exact,
    Partial,
}

/// The cover selector's result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub document: DocumentId,
    /// Accepted sentences, in acceptance order.
    pub sentences: Vec<String>,
    /// `sentences` joined by single spaces.
    pub combined: String,
    pub coverage: Coverage,
    /// Total words in the target bag.
    pub target_words: usize,
    /// Words accounted for by the accepted sentences.
    pub covered_words: usize,
}

impl Selection {
    pub fn is_exact(&self) -> bool {
        self.coverage == Coverage::Exact
    }
}
