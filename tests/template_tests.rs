/// Template config integration tests: the shipped config and lint fixtures.

use bag_reconstruct::core::template::{lint, ReconstructionConfig};
use std::path::Path;

#[test]
fn shipped_config_equals_builtin_defaults() {
    let config = ReconstructionConfig::load_from_ron(Path::new("data/reconstruction.ron")).unwrap();
    assert_eq!(config, ReconstructionConfig::default());
}

#[test]
fn shipped_config_lints_with_one_shadow_warning() {
    let config = ReconstructionConfig::load_from_ron(Path::new("data/reconstruction.ron")).unwrap();
    let report = lint(&config);

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.warnings.len(), 1, "{:?}", report.warnings);
    assert!(report.warnings[0].contains("#5 (noun verb)"));
}

#[test]
fn test_fixture_config_loads() {
    let config = ReconstructionConfig::load_from_ron(Path::new("tests/fixtures/test_config.ron")).unwrap();
    assert_eq!(config.primary.len(), 3);
    assert_eq!(config.fallback.len(), 2);
    assert!(config.ambiguous.contains_key("fish"));
    assert_eq!(config.max_combinations, Some(100));
}

#[test]
fn broken_config_lint_report() {
    let config = ReconstructionConfig::load_from_ron(Path::new("tests/fixtures/broken_config.ron")).unwrap();
    let report = lint(&config);

    assert_eq!(report.errors.len(), 1, "{:?}", report.errors);
    assert!(report.errors[0].contains("'number'"));

    assert_eq!(report.warnings.len(), 3, "{:?}", report.warnings);
    assert!(report.warnings.iter().any(|w| w.contains("duplicate")));
    assert!(report.warnings.iter().any(|w| w.contains("fallback catalog is empty")));
    assert!(report.warnings.iter().any(|w| w.contains("unbounded")));
}
