//! Multiset cover selection.
//!
//! Greedy: longest candidates first, each accepted only while every word
//! stays within its count in the target bag.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::core::bag::WordBag;
use crate::schema::document::{Coverage, DocumentId, GeneratedSentence, Selection};

/// Pick candidate sentences whose combined word counts fit inside `target`.
///
/// Candidates are tried longest first; ties keep their input order. A
/// candidate is accepted only if, for every word, the running count plus
/// the candidate's count stays within the target's count. Selection stops
/// as soon as the whole bag is used. Anything short of that is reported as
/// [`Coverage::Partial`] and logged, never returned as an error.
pub fn select(document: &DocumentId, target: &WordBag, candidates: &[GeneratedSentence]) -> Selection {
    let target_words = target.total();

    let mut ordered: Vec<&GeneratedSentence> = candidates.iter().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut used: FxHashMap<&str, usize> = FxHashMap::default();
    let mut covered_words = 0;
    let mut sentences = Vec::new();

    for candidate in ordered {
        if covered_words == target_words {
            break;
        }

        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for word in &candidate.words {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }

        let fits = counts
            .iter()
            .all(|(word, count)| used.get(word).copied().unwrap_or(0) + count <= target.get(word));
        if !fits {
            continue;
        }

        for (word, count) in counts {
            *used.entry(word).or_insert(0) += count;
        }
        covered_words += candidate.len();
        sentences.push(candidate.text());
    }

    let coverage = if covered_words == target_words {
        Coverage::Exact
    } else {
        warn!(
            %document,
            covered = covered_words,
            target = target_words,
            "could not cover all words"
        );
        Coverage::Partial
    };

    debug!(%document, accepted = sentences.len(), ?coverage, "selected cover");

    Selection {
        document: document.clone(),
        combined: sentences.join(" "),
        sentences,
        coverage,
        target_words,
        covered_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(texts: &[&str]) -> Vec<GeneratedSentence> {
        texts
            .iter()
            .map(|t| GeneratedSentence {
                document: DocumentId::from(0),
                words: t.split(' ').map(str::to_string).collect(),
            })
            .collect()
    }

    #[test]
    fn cat_sentence_is_a_partial_cover() {
        let target = WordBag::extract("The cat sees the cat.");
        let selection = select(&DocumentId::from(0), &target, &candidates(&["the cat sees cat"]));

        assert_eq!(selection.combined, "the cat sees cat");
        assert_eq!(selection.coverage, Coverage::Partial);
        assert_eq!(selection.covered_words, 4);
        assert_eq!(selection.target_words, 5);
    }

    #[test]
    fn exact_cover_stops_early() {
        let target = WordBag::extract("the cat the dog");
        let selection = select(
            &DocumentId::from(1),
            &target,
            &candidates(&["the cat", "the dog", "cat"]),
        );

        assert!(selection.is_exact());
        assert_eq!(selection.sentences, vec!["the cat", "the dog"]);
        assert_eq!(selection.combined, "the cat the dog");
    }

    #[test]
    fn over_budget_candidates_are_skipped() {
        let target = WordBag::extract("a b");
        let selection = select(&DocumentId::from(2), &target, &candidates(&["a a", "a b"]));
        assert_eq!(selection.sentences, vec!["a b"]);
        assert!(selection.is_exact());
    }

    #[test]
    fn longer_candidates_are_tried_first() {
        let target = WordBag::extract("x y z");
        let selection = select(&DocumentId::from(3), &target, &candidates(&["x", "x y z", "y"]));
        assert_eq!(selection.sentences, vec!["x y z"]);
    }

    #[test]
    fn equal_lengths_keep_input_order() {
        let target = WordBag::extract("p q r s");
        let selection = select(
            &DocumentId::from(4),
            &target,
            &candidates(&["r s", "p q", "q r"]),
        );
        assert_eq!(selection.sentences, vec!["r s", "p q"]);
        assert!(selection.is_exact());
    }

    #[test]
    fn no_candidates_is_partial_unless_bag_is_empty() {
        let target = WordBag::extract("lonely words");
        let selection = select(&DocumentId::from(5), &target, &[]);
        assert_eq!(selection.coverage, Coverage::Partial);
        assert_eq!(selection.combined, "");

        let empty = select(&DocumentId::from(6), &WordBag::default(), &candidates(&["a"]));
        assert!(empty.is_exact());
        assert!(empty.sentences.is_empty());
    }

    #[test]
    fn selection_carries_document_id() {
        let target = WordBag::extract("a");
        let selection = select(&DocumentId::from("doc-9"), &target, &candidates(&["a"]));
        assert_eq!(selection.document, DocumentId::from("doc-9"));
    }
}
