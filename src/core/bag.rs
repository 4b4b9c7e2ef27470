//! Word bag extraction: tokenization and per-word counts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Split text into lowercase tokens.
///
/// A token is a maximal run of ASCII letters. Digits, punctuation,
/// whitespace and non-ASCII characters all act as separators.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            current.push(c.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// A multiset of normalized words.
///
/// Iteration follows first-seen order. Counts are always positive and
/// sum to the number of tokens the bag was built from. Equality ignores
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordBag {
    counts: IndexMap<String, usize>,
}

impl WordBag {
    /// Build the bag for a piece of raw text.
    pub fn extract(text: &str) -> Self {
        Self::from_tokens(tokenize(text))
    }

    /// Count an already tokenized sequence.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts = IndexMap::new();
        for token in tokens {
            *counts.entry(token.into()).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Occurrences of `word`, zero if absent.
    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// Total number of tokens.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct words.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// Distinct words in first-seen order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Re-expand into a token sequence: each word repeated `count` times,
    /// words in first-seen order.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.total());
        for (word, count) in &self.counts {
            tokens.extend(std::iter::repeat(word.clone()).take(*count));
        }
        tokens
    }
}

/// Shorthand for [`WordBag::extract`].
pub fn extract(text: &str) -> WordBag {
    WordBag::extract(text)
}
