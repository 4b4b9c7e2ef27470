//! Template sentence generation. Picks the primary template, expands slot
//! pools into sentences and runs fallback passes over leftover words.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::core::classify::CategoryGroups;
use crate::core::template::{ReconstructionConfig, Template};
use crate::schema::document::{DocumentId, GeneratedSentence};

/// True if every slot of `template` has at least one candidate word.
pub fn is_satisfiable(template: &Template, groups: &CategoryGroups) -> bool {
    template.slots.iter().all(|slot| groups.has(slot))
}

/// The first template in `catalog` that `groups` can fill.
pub fn select_template<'t>(catalog: &'t [Template], groups: &CategoryGroups) -> Option<&'t Template> {
    catalog.iter().find(|template| is_satisfiable(template, groups))
}

/// Cartesian product of the slot pools, in slot order, rightmost slot
/// varying fastest.
///
/// Returns nothing if any slot pool is empty. With `cap` set, stops after
/// `cap` combinations.
pub fn expand(template: &Template, groups: &CategoryGroups, cap: Option<usize>) -> Vec<Vec<String>> {
    let pools: Vec<&[String]> = template.slots.iter().map(|slot| groups.get(slot)).collect();
    if pools.is_empty() || pools.iter().any(|pool| pool.is_empty()) {
        return Vec::new();
    }

    let total = pools
        .iter()
        .try_fold(1usize, |acc, pool| acc.checked_mul(pool.len()));
    let limit = match (total, cap) {
        (Some(total), Some(cap)) => total.min(cap),
        (Some(total), None) => total,
        (None, Some(cap)) => cap,
        // The product overflows usize; it could never be materialized anyway.
        (None, None) => usize::MAX,
    };

    if total.map_or(true, |total| total > limit) {
        warn!(
            template = %template,
            combinations = ?total,
            cap = limit,
            "template expansion truncated"
        );
    }

    let mut sentences: Vec<Vec<String>> = Vec::with_capacity(limit.min(4096));
    let mut indices = vec![0usize; pools.len()];

    while sentences.len() < limit {
        sentences.push(
            indices
                .iter()
                .zip(&pools)
                .map(|(&i, pool)| pool[i].clone())
                .collect(),
        );

        // Advance the odometer from the rightmost slot.
        let mut slot = pools.len();
        loop {
            if slot == 0 {
                return sentences;
            }
            slot -= 1;
            indices[slot] += 1;
            if indices[slot] < pools[slot].len() {
                break;
            }
            indices[slot] = 0;
        }
    }

    sentences
}

/// Generate candidate sentences for one document.
///
/// Expands the first satisfiable primary template, then runs the fallback
/// catalog in order over the words the primary sentences did not use,
/// keeping only fallback sentences that use at least one such word.
/// Primary sentences come first, fallback sentences after in catalog order.
pub fn generate(
    document: &DocumentId,
    groups: &CategoryGroups,
    all_words: &[String],
    config: &ReconstructionConfig,
) -> Vec<GeneratedSentence> {
    let mut sentences: Vec<Vec<String>> = Vec::new();
    let mut used: FxHashSet<String> = FxHashSet::default();

    match select_template(&config.primary, groups) {
        Some(template) => {
            sentences = expand(template, groups, config.max_combinations);
            for words in &sentences {
                used.extend(words.iter().cloned());
            }
            debug!(
                %document,
                template = %template,
                sentences = sentences.len(),
                "expanded primary template"
            );
        }
        None => debug!(%document, "no primary template is satisfiable"),
    }

    let mut unused = unused_words(all_words, &used);
    if !unused.is_empty() {
        let leftover = groups.restrict(&unused);

        for template in &config.fallback {
            let mut kept = 0;
            for words in expand(template, &leftover, config.max_combinations) {
                if words.iter().any(|w| unused.contains(w)) {
                    used.extend(words.iter().cloned());
                    sentences.push(words);
                    kept += 1;
                }
            }
            debug!(%document, template = %template, sentences = kept, "ran fallback template");

            unused = unused_words(all_words, &used);
            if unused.is_empty() {
                break;
            }
        }
    }

    if !unused.is_empty() {
        debug!(%document, unused = unused.len(), "words left out of every template");
    }

    sentences
        .into_iter()
        .map(|words| GeneratedSentence {
            document: document.clone(),
            words,
        })
        .collect()
}

fn unused_words(all_words: &[String], used: &FxHashSet<String>) -> FxHashSet<String> {
    all_words
        .iter()
        .filter(|w| !used.contains(*w))
        .cloned()
        .collect()
}
