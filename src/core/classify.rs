//! Grammatical classification. Tags tokens, applies ambiguity overrides
//! and groups words into slot pools.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::schema::category::GrammaticalCategory;

/// Static overrides: word → extra categories, in priority order.
pub type AmbiguityTable = IndexMap<String, Vec<GrammaticalCategory>>;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("tagging failed: {0}")]
    Failed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("tagger error: {0}")]
    Tagger(#[from] TaggerError),
    #[error("tagger returned {labels} labels for {tokens} tokens")]
    TaggerLength { tokens: usize, labels: usize },
}

/// A grammatical tagger.
///
/// Receives a whole document's token sequence at once (taggers may use
/// context) and returns exactly one label per token, in order. Labels are
/// Universal POS style (`NOUN`, `DET`, ...); anything else is kept as a
/// free-form category.
pub trait Tagger: Send + Sync {
    fn tag(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError>;
}

impl<F> Tagger for F
where
    F: Fn(&[String]) -> Result<Vec<String>, TaggerError> + Send + Sync,
{
    fn tag(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError> {
        self(tokens)
    }
}

/// Word → label table backing [`LexiconTagger`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "Lexicon")]
pub struct Lexicon {
    /// Label for words missing from `words`.
    #[serde(default = "default_label")]
    pub default: String,
    #[serde(default)]
    pub words: FxHashMap<String, String>,
}

fn default_label() -> String {
    "X".to_string()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            default: default_label(),
            words: FxHashMap::default(),
        }
    }
}

/// Context-free tagger that looks each token up in a [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    lexicon: Lexicon,
}

impl LexiconTagger {
    pub fn new(lexicon: Lexicon) -> Self {
        let words = lexicon
            .words
            .into_iter()
            .map(|(word, label)| (word.to_lowercase(), label))
            .collect();
        Self {
            lexicon: Lexicon {
                default: lexicon.default,
                words,
            },
        }
    }

    /// Load a lexicon from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<LexiconTagger, TaggerError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a lexicon from a RON string.
    pub fn parse_ron(input: &str) -> Result<LexiconTagger, TaggerError> {
        let lexicon: Lexicon = ron::from_str(input)?;
        Ok(Self::new(lexicon))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError> {
        Ok(tokens
            .iter()
            .map(|token| {
                self.lexicon
                    .words
                    .get(token)
                    .unwrap_or(&self.lexicon.default)
                    .clone()
            })
            .collect())
    }
}

/// A token with its categories: the tagger's primary category first,
/// then ambiguity-table extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedWord {
    pub word: String,
    pub categories: Vec<GrammaticalCategory>,
}

impl ClassifiedWord {
    pub fn primary(&self) -> Option<&GrammaticalCategory> {
        self.categories.first()
    }
}

/// Tag `tokens` in one tagger call and attach ambiguity extras.
///
/// Output has one entry per token, in token order, duplicates included.
pub fn classify(
    tokens: &[String],
    tagger: &dyn Tagger,
    ambiguous: &AmbiguityTable,
) -> Result<Vec<ClassifiedWord>, ClassifyError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let labels = tagger.tag(tokens)?;
    if labels.len() != tokens.len() {
        return Err(ClassifyError::TaggerLength {
            tokens: tokens.len(),
            labels: labels.len(),
        });
    }

    let classified = tokens
        .iter()
        .zip(labels)
        .map(|(token, label)| {
            let mut categories = vec![GrammaticalCategory::from_tag(&label)];
            if let Some(extras) = ambiguous.get(token) {
                for extra in extras {
                    if !categories.contains(extra) {
                        categories.push(extra.clone());
                    }
                }
            }
            ClassifiedWord {
                word: token.clone(),
                categories,
            }
        })
        .collect();

    Ok(classified)
}

/// Slot-filler pools: category → distinct words in first-seen order.
///
/// Only recognized categories are pooled; words whose only categories
/// are free-form never fill a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryGroups {
    groups: IndexMap<GrammaticalCategory, Vec<String>>,
}

impl CategoryGroups {
    /// Group classified words. Later occurrences of a word already pooled
    /// under a category are ignored.
    pub fn from_classified(classified: &[ClassifiedWord]) -> Self {
        let mut groups: IndexMap<GrammaticalCategory, Vec<String>> = GrammaticalCategory::RECOGNIZED
            .iter()
            .map(|category| (category.clone(), Vec::new()))
            .collect();

        for item in classified {
            for category in &item.categories {
                if let Some(words) = groups.get_mut(category) {
                    if !words.contains(&item.word) {
                        words.push(item.word.clone());
                    }
                }
            }
        }

        debug!(
            pooled = groups.values().filter(|w| !w.is_empty()).count(),
            "grouped words by category"
        );

        Self { groups }
    }

    /// Words pooled under `category`; empty for unknown categories.
    pub fn get(&self, category: &GrammaticalCategory) -> &[String] {
        self.groups.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `category` has at least one word.
    pub fn has(&self, category: &GrammaticalCategory) -> bool {
        !self.get(category).is_empty()
    }

    /// A copy keeping only the words in `keep`, order preserved.
    pub fn restrict(&self, keep: &FxHashSet<String>) -> Self {
        let groups: IndexMap<GrammaticalCategory, Vec<String>> = self
            .groups
            .iter()
            .map(|(category, words)| {
                let kept: Vec<String> = words.iter().filter(|w| keep.contains(*w)).cloned().collect();
                (category.clone(), kept)
            })
            .collect();
        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GrammaticalCategory, &[String])> {
        self.groups
            .iter()
            .map(|(category, words)| (category, words.as_slice()))
    }
}
