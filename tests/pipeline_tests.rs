/// Pipeline integration tests: end-to-end document reconstruction with
/// the shipped data files.

use bag_reconstruct::core::bag::WordBag;
use bag_reconstruct::core::classify::TaggerError;
use bag_reconstruct::core::pipeline::{BatchSummary, PipelineError, Reconstructor};
use bag_reconstruct::core::template::TemplateError;
use bag_reconstruct::schema::document::{Coverage, Document};

fn shipped_reconstructor() -> Reconstructor {
    Reconstructor::builder()
        .config_path("data/reconstruction.ron")
        .lexicon_path("data/lexicon.ron")
        .build()
        .unwrap()
}

#[test]
fn cat_example_with_shipped_data() {
    let reconstructor = shipped_reconstructor();
    let result = reconstructor
        .reconstruct(&Document::new(0, "The cat sees the cat."))
        .unwrap();

    assert_eq!(result.bag, WordBag::extract("the the cat cat sees"));
    let candidates: Vec<String> = result.candidates.iter().map(|c| c.text()).collect();
    assert_eq!(candidates, vec!["the cat sees cat"]);
    assert_eq!(result.selection.combined, "the cat sees cat");
    assert_eq!(result.selection.coverage, Coverage::Partial);
    assert_eq!(result.selection.covered_words, 4);
}

#[test]
fn ambiguous_word_takes_adjective_slot() {
    let reconstructor = shipped_reconstructor();
    let result = reconstructor
        .reconstruct(&Document::new(
            "holiday",
            "The family sings songs and the children unwrap gifts.",
        ))
        .unwrap();

    let candidates: Vec<String> = result.candidates.iter().map(|c| c.text()).collect();
    assert_eq!(
        candidates,
        vec![
            "the unwrap family",
            "the unwrap songs",
            "the unwrap children",
            "the unwrap unwrap",
            "the unwrap gifts",
        ]
    );
    assert_eq!(result.selection.sentences, vec!["the unwrap family"]);
    assert_eq!(result.selection.target_words, 9);
    assert!(!result.selection.is_exact());
}

#[test]
fn fallback_templates_cover_leftover_words() {
    let reconstructor = Reconstructor::builder()
        .config_path("tests/fixtures/test_config.ron")
        .lexicon_path("data/lexicon.ron")
        .build()
        .unwrap();

    // No primary template fits without a verb or adjective, so both
    // sentences come from the "determiner noun" fallback.
    let result = reconstructor
        .reconstruct(&Document::new(1, "the dog the cat"))
        .unwrap();
    let candidates: Vec<String> = result.candidates.iter().map(|c| c.text()).collect();
    assert_eq!(candidates, vec!["the dog", "the cat"]);
    assert_eq!(result.selection.combined, "the dog the cat");
    assert!(result.selection.is_exact());
}

#[test]
fn fixture_ambiguity_is_lowercased() {
    let reconstructor = Reconstructor::builder()
        .config_path("tests/fixtures/test_config.ron")
        .lexicon_path("data/lexicon.ron")
        .build()
        .unwrap();

    // "fish" is a noun in the lexicon and gains a verb reading.
    let result = reconstructor
        .reconstruct(&Document::new(2, "cat fish dog"))
        .unwrap();
    assert_eq!(result.candidates.len(), 9);
    assert_eq!(result.candidates[0].text(), "cat fish cat");
    assert_eq!(result.selection.sentences, vec!["cat fish dog"]);
    assert!(result.selection.is_exact());
}

#[test]
fn exact_cover_reproduces_the_bag() {
    let reconstructor = shipped_reconstructor();
    let texts = [
        "The big dog",
        "dog sees cat",
        "the fox",
        "cat sleeps",
        "",
        "Snow!",
    ];

    for (i, text) in texts.iter().enumerate() {
        let result = reconstructor.reconstruct(&Document::new(i, *text)).unwrap();
        if result.selection.is_exact() {
            assert_eq!(WordBag::extract(&result.selection.combined), result.bag, "{}", text);
        }
    }
}

#[test]
fn batch_matches_sequential_results() {
    let reconstructor = shipped_reconstructor();
    let documents: Vec<Document> = [
        "The cat sees the cat.",
        "The big dog",
        "a quick fox jumps over the lazy dog",
        "children laugh in the garden",
        "",
        "Alice and Bob",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| Document::new(i, *text))
    .collect();

    let batch = reconstructor.reconstruct_all(&documents).unwrap();
    for (document, result) in documents.iter().zip(&batch) {
        assert_eq!(&reconstructor.reconstruct(document).unwrap(), result);
    }

    let summary = BatchSummary::from_selections(batch.iter().map(|r| &r.selection));
    assert_eq!(summary.documents, 6);
    assert_eq!(summary.exact + summary.partial, 6);
}

#[test]
fn missing_config_file_is_an_error() {
    let result = Reconstructor::builder()
        .config_path("tests/fixtures/does_not_exist.ron")
        .lexicon_path("data/lexicon.ron")
        .build();
    assert!(matches!(result, Err(PipelineError::Template(TemplateError::Io(_)))));
}

#[test]
fn missing_lexicon_file_is_an_error() {
    let result = Reconstructor::builder()
        .lexicon_path("tests/fixtures/does_not_exist.ron")
        .build();
    assert!(matches!(result, Err(PipelineError::Tagger(TaggerError::Io(_)))));
}
