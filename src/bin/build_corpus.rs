use clap::Parser;
use oneseed::services::corpus_builder::build_corpus;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

/// Build per-chapter verse files and a manifest from a source text.
#[derive(Parser, Debug)]
#[command(name = "oneseed-build-corpus", version)]
struct Args {
    /// Directory holding one event-list JSON file per book
    #[arg(long, value_name = "DIR")]
    src: PathBuf,

    /// Output directory for the translation, e.g. public/bible/web
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// Translation identifier written into the manifest
    #[arg(long, default_value = "WEB")]
    translation: String,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let report = build_corpus(&args.src, &args.out, &args.translation)?;
    if !report.skipped.is_empty() {
        tracing::warn!("Skipped {} books: {}", report.skipped.len(), report.skipped.join(", "));
    }
    println!(
        "{}: {} books, {} verses",
        report.manifest.translation,
        report.manifest.books.len(),
        report.manifest.total_verses
    );
    Ok(())
}
