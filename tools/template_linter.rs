/// Template Linter: validates template catalogs and ambiguity tables.
///
/// Usage: template_linter <config.ron | config_dir> [--lexicon <path>]

use bag_reconstruct::core::classify::LexiconTagger;
use bag_reconstruct::core::template::{lint, LintReport, ReconstructionConfig};
use bag_reconstruct::schema::category::GrammaticalCategory;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <config.ron | config_dir> [--lexicon <path>]");
        process::exit(0);
    }

    let config_arg = &args[1];
    let mut lexicon_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--lexicon" && i + 1 < args.len() {
            i += 1;
            lexicon_path = Some(args[i].clone());
        }
        i += 1;
    }

    let config_path = Path::new(config_arg);
    let files = if config_path.is_file() {
        vec![config_path.to_path_buf()]
    } else if config_path.is_dir() {
        let mut files = Vec::new();
        collect_ron_files(config_path, &mut files);
        files.sort();
        files
    } else {
        eprintln!("ERROR: Path '{}' does not exist", config_arg);
        process::exit(1);
    };

    // Categories the lexicon can ever produce
    let lexicon_categories = lexicon_path.as_deref().map(|path| match LexiconTagger::load_from_ron(Path::new(path)) {
        Ok(tagger) => {
            let lexicon = tagger.lexicon();
            lexicon
                .words
                .values()
                .chain(std::iter::once(&lexicon.default))
                .map(|label| GrammaticalCategory::from_tag(label))
                .collect::<BTreeSet<_>>()
        }
        Err(e) => {
            eprintln!("ERROR: Failed to load lexicon: {}", e);
            process::exit(1);
        }
    });

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        println!("\n=== {} ===\n", file.display());

        let config = match ReconstructionConfig::load_from_ron(file) {
            Ok(config) => config,
            Err(e) => {
                println!("ERROR: Failed to load config: {}", e);
                total_errors += 1;
                continue;
            }
        };

        let mut report = lint(&config);
        if let Some(ref categories) = lexicon_categories {
            check_lexicon(&config, categories, &mut report);
        }

        if report.is_clean() {
            println!("All checks passed!");
        }
        for warning in &report.warnings {
            println!("WARNING: {}", warning);
        }
        for error in &report.errors {
            println!("ERROR: {}", error);
        }

        total_errors += report.errors.len();
        total_warnings += report.warnings.len();
    }

    println!(
        "\nSummary: {} files, {} errors, {} warnings",
        files.len(),
        total_errors,
        total_warnings
    );

    if total_errors == 0 {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn collect_ron_files(dir: &Path, files: &mut Vec<PathBuf>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                collect_ron_files(&path, files);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                files.push(path);
            }
        }
    }
}

/// Slots that the lexicon never labels can only be filled through the
/// ambiguity table.
fn check_lexicon(config: &ReconstructionConfig, categories: &BTreeSet<GrammaticalCategory>, report: &mut LintReport) {
    let ambiguous: BTreeSet<&GrammaticalCategory> = config.ambiguous.values().flatten().collect();

    let slots: BTreeSet<&GrammaticalCategory> = config
        .primary
        .iter()
        .chain(&config.fallback)
        .flat_map(|template| &template.slots)
        .filter(|slot| slot.is_recognized())
        .collect();

    for slot in slots {
        if !categories.contains(slot) && !ambiguous.contains(slot) {
            report.warnings.push(format!(
                "no lexicon label maps to '{}', so its slots can never be filled",
                slot
            ));
        } else if !categories.contains(slot) {
            report.warnings.push(format!(
                "'{}' slots can only be filled by ambiguity table words",
                slot
            ));
        }
    }
}
