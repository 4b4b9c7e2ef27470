//! The reconstruction pipeline: Document → word bag → candidates → cover.
//!
//! Wires together tokenization, classification, template generation and
//! cover selection, and fans batches out over a thread pool.

use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::core::bag::{tokenize, WordBag};
use crate::core::classify::{
    classify, AmbiguityTable, CategoryGroups, ClassifyError, LexiconTagger, Tagger, TaggerError,
};
use crate::core::cover::select;
use crate::core::generate::generate;
use crate::core::template::{ReconstructionConfig, TemplateError};
use crate::schema::document::{Document, DocumentId, GeneratedSentence, Selection};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("classification error: {0}")]
    Classify(#[from] ClassifyError),
    #[error("tagger error: {0}")]
    Tagger(#[from] TaggerError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no tagger configured: set a lexicon path or provide one with with_tagger")]
    MissingTagger,
}

/// Everything produced for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub bag: WordBag,
    pub candidates: Vec<GeneratedSentence>,
    pub selection: Selection,
}

/// Coverage counts over a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub documents: usize,
    pub exact: usize,
    pub partial: usize,
    pub target_words: usize,
    pub covered_words: usize,
}

impl BatchSummary {
    pub fn from_selections<'a>(selections: impl IntoIterator<Item = &'a Selection>) -> Self {
        let mut summary = Self::default();
        for selection in selections {
            summary.documents += 1;
            if selection.is_exact() {
                summary.exact += 1;
            } else {
                summary.partial += 1;
            }
            summary.target_words += selection.target_words;
            summary.covered_words += selection.covered_words;
        }
        summary
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents: {} exact, {} partial ({}/{} words covered)",
            self.documents, self.exact, self.partial, self.covered_words, self.target_words
        )
    }
}

/// The top-level reconstructor. Built via `Reconstructor::builder()`.
///
/// Holds only immutable configuration and a shared tagger, so one instance
/// can serve any number of threads.
pub struct Reconstructor {
    config: ReconstructionConfig,
    tagger: Arc<dyn Tagger>,
}

/// Builder for constructing a `Reconstructor`.
#[derive(Default)]
pub struct ReconstructorBuilder {
    config_path: Option<String>,
    lexicon_path: Option<String>,
    ambiguity_dir: Option<String>,
    max_combinations: Option<Option<usize>>,
    /// Directly provided config (for testing without files).
    config: Option<ReconstructionConfig>,
    /// Directly provided tagger (for testing without files).
    tagger: Option<Arc<dyn Tagger>>,
    ambiguous: AmbiguityTable,
}

impl Reconstructor {
    pub fn builder() -> ReconstructorBuilder {
        ReconstructorBuilder::default()
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct one document: extract its bag, generate candidates and
    /// select a cover.
    #[instrument(skip_all, fields(document = %document.id))]
    pub fn reconstruct(&self, document: &Document) -> Result<Reconstruction, PipelineError> {
        let tokens = tokenize(&document.text);
        let bag = WordBag::from_tokens(&tokens);
        debug!(tokens = tokens.len(), distinct = bag.distinct(), "extracted word bag");

        let candidates = self.generate_for(&document.id, &tokens)?;
        let selection = select(&document.id, &bag, &candidates);

        Ok(Reconstruction {
            bag,
            candidates,
            selection,
        })
    }

    /// Candidate sentences for one document, without cover selection.
    #[instrument(skip_all, fields(document = %document.id))]
    pub fn candidates(&self, document: &Document) -> Result<Vec<GeneratedSentence>, PipelineError> {
        self.generate_for(&document.id, &tokenize(&document.text))
    }

    /// Reconstruct a batch in parallel. Results keep input order; the first
    /// hard failure aborts the batch.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn reconstruct_all(&self, documents: &[Document]) -> Result<Vec<Reconstruction>, PipelineError> {
        let results = documents
            .par_iter()
            .map(|document| self.reconstruct(document))
            .collect::<Result<Vec<_>, _>>()?;

        let summary = BatchSummary::from_selections(results.iter().map(|r| &r.selection));
        info!(
            documents = summary.documents,
            exact = summary.exact,
            partial = summary.partial,
            "reconstructed batch"
        );

        Ok(results)
    }

    fn generate_for(&self, id: &DocumentId, tokens: &[String]) -> Result<Vec<GeneratedSentence>, PipelineError> {
        let classified = classify(tokens, self.tagger.as_ref(), &self.config.ambiguous)?;
        let groups = CategoryGroups::from_classified(&classified);
        Ok(generate(id, &groups, tokens, &self.config))
    }
}

impl ReconstructorBuilder {
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn lexicon_path(mut self, path: &str) -> Self {
        self.lexicon_path = Some(path.to_string());
        self
    }

    /// Every `.ron` file in `path` is read as an extra ambiguity table.
    pub fn ambiguity_dir(mut self, path: &str) -> Self {
        self.ambiguity_dir = Some(path.to_string());
        self
    }

    /// Override the config's per-expansion cap. `None` removes it.
    pub fn max_combinations(mut self, cap: Option<usize>) -> Self {
        self.max_combinations = Some(cap);
        self
    }

    /// Provide the config directly (for testing without files).
    pub fn with_config(mut self, config: ReconstructionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provide a tagger directly (for testing without files).
    pub fn with_tagger<T: Tagger + 'static>(mut self, tagger: T) -> Self {
        self.tagger = Some(Arc::new(tagger));
        self
    }

    /// Extra ambiguity entries, applied after everything loaded from disk.
    /// Words are lowercased like every other ambiguity source.
    pub fn with_ambiguous(mut self, ambiguous: AmbiguityTable) -> Self {
        self.ambiguous.extend(
            ambiguous
                .into_iter()
                .map(|(word, categories)| (word.to_lowercase(), categories)),
        );
        self
    }

    pub fn build(self) -> Result<Reconstructor, PipelineError> {
        let mut config = match (self.config, &self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => ReconstructionConfig::load_from_ron(Path::new(path))?,
            (None, None) => ReconstructionConfig::default(),
        };

        // Ambiguity files override the config's own table
        if let Some(ref dir) = self.ambiguity_dir {
            if Path::new(dir).exists() {
                load_ron_files_from_dir(dir, |path| {
                    let contents = std::fs::read_to_string(path)?;
                    let table: AmbiguityTable = ron::from_str(&contents)?;
                    config.merge_ambiguous(
                        table
                            .into_iter()
                            .map(|(word, categories)| (word.to_lowercase(), categories))
                            .collect(),
                    );
                    Ok(())
                })?;
            }
        }
        config.merge_ambiguous(self.ambiguous);

        if let Some(cap) = self.max_combinations {
            config.max_combinations = cap;
        }
        config.validate()?;

        let tagger: Arc<dyn Tagger> = match (self.tagger, &self.lexicon_path) {
            (Some(tagger), _) => tagger,
            (None, Some(path)) => Arc::new(LexiconTagger::load_from_ron(Path::new(path))?),
            (None, None) => return Err(PipelineError::MissingTagger),
        };

        debug!(
            primary = config.primary.len(),
            fallback = config.fallback.len(),
            ambiguous = config.ambiguous.len(),
            max_combinations = ?config.max_combinations,
            "built reconstructor"
        );

        Ok(Reconstructor { config, tagger })
    }
}

/// Load all .ron files from a directory in file name order, calling
/// `loader` for each.
fn load_ron_files_from_dir<F>(dir: &str, mut loader: F) -> Result<(), PipelineError>
where
    F: FnMut(&Path) -> Result<(), PipelineError>,
{
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in &paths {
        loader(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::Template;
    use crate::schema::category::GrammaticalCategory;
    use crate::schema::document::Coverage;

    fn test_tagger() -> LexiconTagger {
        LexiconTagger::parse_ron(
            r#"Lexicon(
                default: "X",
                words: {
                    "the": "DET",
                    "big": "ADJ",
                    "cat": "NOUN",
                    "cats": "NOUN",
                    "dog": "NOUN",
                    "fish": "NOUN",
                    "sees": "VERB",
                    "eat": "VERB",
                },
            )"#,
        )
        .unwrap()
    }

    fn build_test_reconstructor() -> Reconstructor {
        Reconstructor::builder().with_tagger(test_tagger()).build().unwrap()
    }

    #[test]
    fn builder_requires_a_tagger() {
        let result = Reconstructor::builder().build();
        assert!(matches!(result, Err(PipelineError::MissingTagger)));
    }

    #[test]
    fn builder_rejects_slotless_templates() {
        let mut config = ReconstructionConfig::default();
        config.fallback.push(Template::new(Vec::new()));
        let result = Reconstructor::builder()
            .with_config(config)
            .with_tagger(test_tagger())
            .build();
        assert!(matches!(
            result,
            Err(PipelineError::Template(TemplateError::EmptyTemplate { catalog: "fallback", index: 4 }))
        ));
    }

    #[test]
    fn builder_overrides_cap_and_ambiguity() {
        let mut extra = AmbiguityTable::new();
        extra.insert("sees".to_string(), vec![GrammaticalCategory::Noun]);

        let reconstructor = Reconstructor::builder()
            .with_tagger(test_tagger())
            .max_combinations(Some(2))
            .with_ambiguous(extra)
            .build()
            .unwrap();

        assert_eq!(reconstructor.config().max_combinations, Some(2));
        assert_eq!(
            reconstructor.config().ambiguous.get("sees"),
            Some(&vec![GrammaticalCategory::Noun])
        );
        assert!(reconstructor.config().ambiguous.contains_key("unwrap"));
    }

    #[test]
    fn builder_rejects_zero_cap() {
        let result = Reconstructor::builder()
            .with_tagger(test_tagger())
            .max_combinations(Some(0))
            .build();
        assert!(matches!(result, Err(PipelineError::Template(TemplateError::ZeroCap))));

        let config =
            ReconstructionConfig::parse_ron(r#"(primary: ["determiner noun"], max_combinations: Some(0))"#).unwrap();
        let result = Reconstructor::builder()
            .with_config(config)
            .with_tagger(test_tagger())
            .build();
        assert!(matches!(result, Err(PipelineError::Template(TemplateError::ZeroCap))));
    }

    #[test]
    fn injected_ambiguity_is_lowercased() {
        let mut extra = AmbiguityTable::new();
        extra.insert("Sees".to_string(), vec![GrammaticalCategory::Noun]);

        let reconstructor = Reconstructor::builder()
            .with_tagger(test_tagger())
            .with_ambiguous(extra)
            .build()
            .unwrap();
        assert!(!reconstructor.config().ambiguous.contains_key("Sees"));
        assert_eq!(
            reconstructor.config().ambiguous.get("sees"),
            Some(&vec![GrammaticalCategory::Noun])
        );

        // "sees" now also fills noun slots, so "noun verb noun" matches.
        let result = reconstructor.reconstruct(&Document::new(5, "sees")).unwrap();
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].text(), "sees sees sees");
    }

    #[test]
    fn cat_example_yields_partial_cover() {
        let reconstructor = build_test_reconstructor();
        let result = reconstructor
            .reconstruct(&Document::new(0, "The cat sees the cat."))
            .unwrap();

        assert_eq!(result.bag.total(), 5);
        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.selection.combined, "the cat sees cat");
        assert_eq!(result.selection.coverage, Coverage::Partial);
    }

    #[test]
    fn adjective_phrase_is_covered_exactly() {
        let reconstructor = build_test_reconstructor();
        let result = reconstructor.reconstruct(&Document::new(1, "The big dog")).unwrap();
        assert_eq!(result.selection.combined, "the big dog");
        assert!(result.selection.is_exact());
    }

    #[test]
    fn ambiguous_word_fills_noun_and_verb_slots() {
        let reconstructor = build_test_reconstructor();
        let document = Document::new(2, "cats eat fish");

        let candidates: Vec<String> = reconstructor
            .candidates(&document)
            .unwrap()
            .iter()
            .map(GeneratedSentence::text)
            .collect();
        assert_eq!(candidates.len(), 9);
        assert_eq!(&candidates[..3], ["cats eat cats", "cats eat eat", "cats eat fish"]);

        let result = reconstructor.reconstruct(&document).unwrap();
        assert_eq!(result.selection.combined, "cats eat fish");
        assert!(result.selection.is_exact());
    }

    #[test]
    fn empty_document_never_calls_the_tagger() {
        let reconstructor = Reconstructor::builder()
            .with_tagger(|_: &[String]| -> Result<Vec<String>, TaggerError> {
                Err(TaggerError::Failed("unreachable".to_string()))
            })
            .build()
            .unwrap();

        let result = reconstructor.reconstruct(&Document::new(3, "")).unwrap();
        assert!(result.candidates.is_empty());
        assert_eq!(result.selection.combined, "");
        assert!(result.selection.is_exact());
    }

    #[test]
    fn tagger_failure_is_fatal() {
        let reconstructor = Reconstructor::builder()
            .with_tagger(|_: &[String]| -> Result<Vec<String>, TaggerError> {
                Err(TaggerError::Failed("model unavailable".to_string()))
            })
            .build()
            .unwrap();

        let result = reconstructor.reconstruct(&Document::new(4, "anything"));
        assert!(matches!(
            result,
            Err(PipelineError::Classify(ClassifyError::Tagger(_)))
        ));
    }

    #[test]
    fn batch_keeps_input_order() {
        let reconstructor = build_test_reconstructor();
        let documents: Vec<Document> = (0..20)
            .map(|i| {
                let text = if i % 2 == 0 { "the big dog" } else { "the cat sees the cat" };
                Document::new(i, text)
            })
            .collect();

        let results = reconstructor.reconstruct_all(&documents).unwrap();
        assert_eq!(results.len(), 20);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.selection.document, DocumentId::from(i));
        }

        let summary = BatchSummary::from_selections(results.iter().map(|r| &r.selection));
        assert_eq!(summary.exact, 10);
        assert_eq!(summary.partial, 10);
        assert_eq!(summary.target_words, 10 * 3 + 10 * 5);
        assert_eq!(summary.covered_words, 10 * 3 + 10 * 4);
    }

    #[test]
    fn ambiguity_dir_is_merged_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ron"), r#"{ "Fish": ["verb"] }"#).unwrap();
        std::fs::write(dir.path().join("b.ron"), r#"{ "fish": ["verb", "adjective"] }"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let reconstructor = Reconstructor::builder()
            .with_tagger(test_tagger())
            .ambiguity_dir(dir.path().to_str().unwrap())
            .build()
            .unwrap();

        assert_eq!(
            reconstructor.config().ambiguous.get("fish"),
            Some(&vec![GrammaticalCategory::Verb, GrammaticalCategory::Adjective])
        );
    }

    #[test]
    fn summary_display() {
        let summary = BatchSummary {
            documents: 3,
            exact: 2,
            partial: 1,
            target_words: 12,
            covered_words: 11,
        };
        assert_eq!(summary.to_string(), "3 documents: 2 exact, 1 partial (11/12 words covered)");
    }
}
