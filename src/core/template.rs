//! Template catalogs and the reconstruction config: parsing, RON loading
//! and linting.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::core::classify::AmbiguityTable;
use crate::schema::category::GrammaticalCategory;

/// Default ceiling on sentences emitted by one template expansion.
pub const DEFAULT_MAX_COMBINATIONS: usize = 10_000;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("{catalog} template #{index} has no slots")]
    EmptyTemplate { catalog: &'static str, index: usize },
    #[error("max_combinations must be at least 1; use None to remove the cap")]
    ZeroCap,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A sentence shape: one grammatical category per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Template {
    pub slots: Vec<GrammaticalCategory>,
}

impl Template {
    pub fn new(slots: Vec<GrammaticalCategory>) -> Self {
        Self { slots }
    }

    /// Parse a whitespace-separated list of category names, e.g.
    /// `"determiner adjective noun"`. Names are case-insensitive; names
    /// outside the recognized set become `Other` slots.
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let slots: Vec<GrammaticalCategory> = input
            .split_whitespace()
            .map(GrammaticalCategory::from)
            .collect();

        if slots.is_empty() {
            return Err(TemplateError::TemplateParse(format!(
                "template '{}' has no slots",
                input
            )));
        }

        Ok(Template { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Distinct categories used by this template.
    pub fn categories(&self) -> FxHashSet<&GrammaticalCategory> {
        self.slots.iter().collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// Everything that shapes reconstruction besides the tagger: the two
/// template catalogs, the ambiguity table, and the expansion ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructionConfig {
    /// Tried in order; the first fully satisfiable template is expanded.
    pub primary: Vec<Template>,
    /// Run in order over words the primary expansion left unused.
    pub fallback: Vec<Template>,
    pub ambiguous: AmbiguityTable,
    /// Per-expansion sentence cap. `None` expands the full product.
    pub max_combinations: Option<usize>,
}

// RON deserialization helper: templates are written as strings and the
// ambiguity table as plain category names.

#[derive(Debug, Deserialize)]
#[serde(rename = "Reconstruction")]
struct RonConfig {
    primary: Vec<String>,
    #[serde(default)]
    fallback: Vec<String>,
    #[serde(default)]
    ambiguous: IndexMap<String, Vec<String>>,
    #[serde(default = "default_max_combinations")]
    max_combinations: Option<usize>,
}

fn default_max_combinations() -> Option<usize> {
    Some(DEFAULT_MAX_COMBINATIONS)
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        let parse = |slots: &[&str]| Template::new(slots.iter().copied().map(GrammaticalCategory::from).collect());

        let primary = vec![
            parse(&["determiner", "adjective", "noun", "verb", "preposition", "determiner", "noun"]),
            parse(&["determiner", "adjective", "noun"]),
            parse(&["determiner", "noun", "verb", "noun"]),
            parse(&["noun", "verb", "noun"]),
            parse(&["determiner", "noun"]),
            parse(&["noun", "verb"]),
            parse(&["noun", "noun"]),
        ];

        let fallback = vec![
            parse(&["noun", "verb", "noun"]),
            parse(&["determiner", "noun"]),
            parse(&["noun", "verb"]),
            parse(&["noun", "noun"]),
        ];

        let noun_verb = [GrammaticalCategory::Noun, GrammaticalCategory::Verb];
        let mut ambiguous = AmbiguityTable::new();
        for word in ["drive", "sing", "cheer", "sleep", "jump", "bake", "laugh", "wish", "eat"] {
            ambiguous.insert(word.to_string(), noun_verb.to_vec());
        }
        ambiguous.insert(
            "unwrap".to_string(),
            vec![
                GrammaticalCategory::Noun,
                GrammaticalCategory::Verb,
                GrammaticalCategory::Adjective,
            ],
        );

        Self {
            primary,
            fallback,
            ambiguous,
            max_combinations: default_max_combinations(),
        }
    }
}

impl ReconstructionConfig {
    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ReconstructionConfig, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string.
    pub fn parse_ron(input: &str) -> Result<ReconstructionConfig, TemplateError> {
        let raw: RonConfig = ron::from_str(input)?;

        let primary = raw
            .primary
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<Vec<_>, _>>()?;
        let fallback = raw
            .fallback
            .iter()
            .map(|t| Template::parse(t))
            .collect::<Result<Vec<_>, _>>()?;

        let ambiguous: AmbiguityTable = raw
            .ambiguous
            .into_iter()
            .map(|(word, categories)| {
                let categories: Vec<GrammaticalCategory> =
                    categories.into_iter().map(GrammaticalCategory::from).collect();
                (word.to_lowercase(), categories)
            })
            .collect();

        Ok(ReconstructionConfig {
            primary,
            fallback,
            ambiguous,
            max_combinations: raw.max_combinations,
        })
    }

    /// Reject catalogs with slotless templates and a cap of zero, which
    /// would expand to nothing. Everything else is left to [`lint`], which
    /// only advises.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.max_combinations == Some(0) {
            return Err(TemplateError::ZeroCap);
        }
        for (catalog, templates) in [("primary", &self.primary), ("fallback", &self.fallback)] {
            if let Some(index) = templates.iter().position(Template::is_empty) {
                return Err(TemplateError::EmptyTemplate { catalog, index });
            }
        }
        Ok(())
    }

    /// Add ambiguity entries from `other`. Entries in `other` replace
    /// entries in `self` for the same word.
    pub fn merge_ambiguous(&mut self, other: AmbiguityTable) {
        for (word, categories) in other {
            self.ambiguous.insert(word, categories);
        }
    }
}

/// Findings from [`lint`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Check a configuration for templates that can never produce output.
pub fn lint(config: &ReconstructionConfig) -> LintReport {
    let mut report = LintReport::default();

    for (catalog, templates) in [("primary", &config.primary), ("fallback", &config.fallback)] {
        let mut seen: FxHashSet<&Template> = FxHashSet::default();

        for (index, template) in templates.iter().enumerate() {
            if template.is_empty() {
                report
                    .errors
                    .push(format!("{} template #{} has no slots", catalog, index));
                continue;
            }

            for slot in template.slots.iter().filter(|s| !s.is_recognized()) {
                report.errors.push(format!(
                    "{} template #{} ({}) has slot '{}' which no word can fill",
                    catalog, index, template, slot
                ));
            }

            if !seen.insert(template) {
                report.warnings.push(format!(
                    "{} template #{} ({}) is a duplicate",
                    catalog, index, template
                ));
            }
        }
    }

    // An earlier primary template whose categories are a subset of a later
    // one's is satisfiable whenever the later one is, so the later one is
    // never selected.
    for (later, template) in config.primary.iter().enumerate() {
        let categories = template.categories();
        let shadow = config.primary[..later]
            .iter()
            .position(|earlier| !earlier.is_empty() && earlier.categories().is_subset(&categories));
        if let Some(earlier) = shadow {
            if config.primary[earlier] != *template {
                report.warnings.push(format!(
                    "primary template #{} ({}) is never selected: #{} ({}) always matches first",
                    later, template, earlier, config.primary[earlier]
                ));
            }
        }
    }

    if config.fallback.is_empty() {
        report
            .warnings
            .push("fallback catalog is empty; leftover words are never retried".to_string());
    }

    for (word, categories) in &config.ambiguous {
        for category in categories.iter().filter(|c| !c.is_recognized()) {
            report.warnings.push(format!(
                "ambiguous word '{}' lists category '{}' which no slot uses",
                word, category
            ));
        }
    }

    match config.max_combinations {
        None => report
            .warnings
            .push("max_combinations is unset; expansions are unbounded".to_string()),
        Some(0) => report
            .errors
            .push("max_combinations is 0; every expansion would be empty".to_string()),
        Some(_) => {}
    }

    report
}
