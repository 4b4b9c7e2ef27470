//! Statistical part-of-speech tagging with nlprule.
//!
//! nlprule tags English text with Penn Treebank tags; [`universal_from_penn`]
//! folds those onto the Universal POS labels the classifier understands.
//! The tagger itself needs a tokenizer binary (`en_tokenizer.bin`) and is
//! only built with the `nlprule` feature.

#[cfg(feature = "nlprule")]
use std::path::Path;
#[cfg(feature = "nlprule")]
use tracing::debug;

#[cfg(feature = "nlprule")]
use crate::core::classify::{Tagger, TaggerError};

/// Label for tokens nlprule did not tag, or tagged outside the mapping.
pub const UNTAGGED: &str = "X";

/// How many tagged tokens may be skipped while looking for the next input
/// token (sentence-start markers, split contractions).
const MAX_SKIP: usize = 3;

/// Map a Penn Treebank tag to a Universal POS label.
pub fn universal_from_penn(tag: &str) -> Option<&'static str> {
    match tag {
        "NN" | "NNS" | "NNP" | "NNPS" => Some("NOUN"),
        "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" | "MD" => Some("VERB"),
        "JJ" | "JJR" | "JJS" => Some("ADJ"),
        "RB" | "RBR" | "RBS" => Some("ADV"),
        "IN" => Some("ADP"),
        "DT" | "PDT" | "WDT" => Some("DET"),
        "CC" => Some("CCONJ"),
        "PRP" | "PRP$" | "WP" | "WP$" => Some("PRON"),
        _ => None,
    }
}

/// Line tagger output up with the input tokens.
///
/// `tagged` holds `(lowercased text, Penn tags)` per tagger token. Each
/// input token takes the first mappable tag of the next matching tagger
/// token; tokens with no match within [`MAX_SKIP`] get [`UNTAGGED`]. The
/// result always has one label per input token.
pub fn align(tokens: &[String], tagged: &[(String, Vec<String>)]) -> Vec<String> {
    let mut cursor = 0;

    tokens
        .iter()
        .map(|token| {
            let window = &tagged[cursor.min(tagged.len())..(cursor + MAX_SKIP + 1).min(tagged.len())];
            match window.iter().position(|(text, _)| text == token) {
                Some(offset) => {
                    let (_, tags) = &window[offset];
                    cursor += offset + 1;
                    tags.iter()
                        .find_map(|tag| universal_from_penn(tag))
                        .unwrap_or(UNTAGGED)
                        .to_string()
                }
                None => UNTAGGED.to_string(),
            }
        })
        .collect()
}

/// Context-aware tagger running nlprule's disambiguating tokenizer over
/// the whole document.
#[cfg(feature = "nlprule")]
pub struct NlpruleTagger {
    tokenizer: nlprule::Tokenizer,
}

#[cfg(feature = "nlprule")]
impl NlpruleTagger {
    pub fn new(tokenizer: nlprule::Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Load a tokenizer binary such as `en_tokenizer.bin`.
    pub fn load(path: &Path) -> Result<NlpruleTagger, TaggerError> {
        let tokenizer = nlprule::Tokenizer::new(path).map_err(|e| {
            TaggerError::Failed(format!("failed to load nlprule tokenizer {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded nlprule tokenizer");
        Ok(Self::new(tokenizer))
    }
}

#[cfg(feature = "nlprule")]
impl Tagger for NlpruleTagger {
    fn tag(&self, tokens: &[String]) -> Result<Vec<String>, TaggerError> {
        let text = tokens.join(" ");

        let mut tagged = Vec::with_capacity(tokens.len());
        for sentence in self.tokenizer.pipe(&text) {
            for token in sentence.tokens() {
                let word = token.word();
                let tags = word.tags().iter().map(|tag| tag.pos().as_str().to_string()).collect();
                tagged.push((word.text().as_str().to_lowercase(), tags));
            }
        }

        Ok(align(tokens, &tagged))
    }
}
