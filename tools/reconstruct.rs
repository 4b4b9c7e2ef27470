//! Reconstruct: rebuilds every document of a CSV file from templates.
//!
//! Reads a text column, writes `id,combined_sentence` rows and prints a
//! coverage summary. Logging follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use bag_reconstruct::core::pipeline::{BatchSummary, Reconstructor};
use bag_reconstruct::table::{read_documents, write_candidates, write_selections};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reconstruct", version, about = "Rebuild documents from grammar templates")]
struct Cli {
    /// Input CSV with a header row.
    #[arg(long)]
    input: PathBuf,
    /// Output CSV of combined sentences.
    #[arg(long)]
    output: PathBuf,
    #[arg(long, default_value = "text")]
    text_column: String,
    /// Rows are numbered when this column is missing.
    #[arg(long, default_value = "id")]
    id_column: String,
    /// Reconstruction config (RON). Built-in templates when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tagger lexicon (RON).
    #[arg(long, default_value = "data/lexicon.ron")]
    lexicon: PathBuf,
    /// nlprule tokenizer binary (en_tokenizer.bin). Replaces the lexicon tagger.
    #[cfg(feature = "nlprule")]
    #[arg(long)]
    tokenizer: Option<PathBuf>,
    /// Also write every candidate sentence to this CSV.
    #[arg(long)]
    candidates: Option<PathBuf>,
    /// Per-template expansion cap; 0 removes it.
    #[arg(long)]
    max_combinations: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut builder = Reconstructor::builder().lexicon_path(&cli.lexicon.to_string_lossy());
    if let Some(ref config) = cli.config {
        builder = builder.config_path(&config.to_string_lossy());
    }
    #[cfg(feature = "nlprule")]
    if let Some(ref path) = cli.tokenizer {
        let tagger = bag_reconstruct::core::postag::NlpruleTagger::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        builder = builder.with_tagger(tagger);
    }
    if let Some(cap) = cli.max_combinations {
        builder = builder.max_combinations((cap > 0).then_some(cap));
    }
    let reconstructor = Arc::new(builder.build().context("failed to build reconstructor")?);

    let documents = read_documents(&cli.input, &cli.text_column, &cli.id_column)
        .await
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    let worker = Arc::clone(&reconstructor);
    let results = tokio::task::spawn_blocking(move || worker.reconstruct_all(&documents))
        .await
        .context("reconstruction task panicked")??;

    let selections: Vec<_> = results.iter().map(|r| r.selection.clone()).collect();
    write_selections(&cli.output, &selections)
        .await
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    if let Some(ref path) = cli.candidates {
        let candidates: Vec<_> = results.iter().flat_map(|r| r.candidates.iter().cloned()).collect();
        write_candidates(path, &candidates)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let summary = BatchSummary::from_selections(&selections);
    println!("{}", summary);
    for selection in selections.iter().filter(|s| !s.is_exact()) {
        println!(
            "  partial: {} ({}/{} words)",
            selection.document, selection.covered_words, selection.target_words
        );
    }

    Ok(())
}
