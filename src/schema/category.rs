use serde::{Deserialize, Serialize};
use std::fmt;

/// Grammatical category of a word, as used by template slots.
///
/// The eight named variants are the slot vocabulary. Tagger labels
/// outside that set survive as `Other` so nothing is lost, but no
/// template slot is ever filled from them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrammaticalCategory {
    Verb,
    Noun,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Determiner,
    Pronoun,
    /// Free-form lowercase label passed through from the tagger.
    Other(String),
}

impl GrammaticalCategory {
    /// The recognized categories, in the order groups are reported.
    pub const RECOGNIZED: [GrammaticalCategory; 8] = [
        Self::Verb,
        Self::Noun,
        Self::Adjective,
        Self::Adverb,
        Self::Preposition,
        Self::Conjunction,
        Self::Determiner,
        Self::Pronoun,
    ];

    /// Map a tagger label (Universal POS style, e.g. `NOUN`, `ADP`) to a
    /// category. Unknown labels become `Other` with the label lowercased.
    pub fn from_tag(label: &str) -> Self {
        match label {
            "VERB" => Self::Verb,
            "NOUN" => Self::Noun,
            "ADJ" => Self::Adjective,
            "ADV" => Self::Adverb,
            "ADP" => Self::Preposition,
            "CCONJ" => Self::Conjunction,
            "DET" => Self::Determiner,
            "PRON" => Self::Pronoun,
            other => Self::from(other.to_string()),
        }
    }

    /// Lowercase category name, e.g. `"determiner"`.
    pub fn name(&self) -> &str {
        match self {
            Self::Verb => "verb",
            Self::Noun => "noun",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
            Self::Preposition => "preposition",
            Self::Conjunction => "conjunction",
            Self::Determiner => "determiner",
            Self::Pronoun => "pronoun",
            Self::Other(label) => label,
        }
    }

    /// Returns true for every variant except `Other`.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for GrammaticalCategory {
    fn from(name: String) -> Self {
        let name = name.to_lowercase();
        match name.as_str() {
            "verb" => Self::Verb,
            "noun" => Self::Noun,
            "adjective" => Self::Adjective,
            "adverb" => Self::Adverb,
            "preposition" => Self::Preposition,
            "conjunction" => Self::Conjunction,
            "determiner" => Self::Determiner,
            "pronoun" => Self::Pronoun,
            _ => Self::Other(name),
        }
    }
}

impl From<&str> for GrammaticalCategory {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<GrammaticalCategory> for String {
    fn from(category: GrammaticalCategory) -> Self {
        match category {
            GrammaticalCategory::Other(label) => label,
            named => named.name().to_string(),
        }
    }
}

impl fmt::Display for GrammaticalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
