use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ircore::persist::{open_retriever, save_build, save_meta, IndexPaths, MetaFile};
use ircore::{BuildConfig, IndexBuilder, QueryMode};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

mod source;

use source::DirectorySource;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a boolean inverted index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every file under a directory
    Index {
        /// Directory holding the document collection
        #[arg(long)]
        input: PathBuf,
        /// Static stop list, one word per line
        #[arg(long, default_value = "stoplist.txt")]
        stoplist: PathBuf,
        /// Percentage of distinct terms, most frequent first, treated as stop words
        #[arg(long, default_value_t = 1.0)]
        threshold: f64,
        /// Directory receiving the index artifacts
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Run an AND or OR query against a saved index
    Search {
        /// Directory holding the index artifacts
        #[arg(long, default_value = ".")]
        index: PathBuf,
        /// Static stop list used when the index was built
        #[arg(long, default_value = "stoplist.txt")]
        stoplist: PathBuf,
        /// and | or
        mode: QueryMode,
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { input, stoplist, threshold, output } => {
            build_index(&input, stoplist, threshold, &output)
        }
        Commands::Search { index, stoplist, mode, query } => search(&index, &stoplist, mode, &query.join(" ")),
    }
}

fn build_index(input: &Path, stoplist: PathBuf, threshold: f64, output: &Path) -> Result<()> {
    if !input.is_dir() {
        bail!("input '{}' is not a directory", input.display());
    }
    if !threshold.is_finite() || threshold < 0.0 {
        bail!("threshold must be a non-negative percentage, got {threshold}");
    }
    let source = DirectorySource::scan(input)?;
    if source.is_empty() {
        tracing::warn!(input = %input.display(), "no files to index");
    } else {
        tracing::info!(input = %input.display(), files = source.len(), "scanned input");
    }
    let config = BuildConfig { stoplist_path: Some(stoplist), threshold_percent: threshold };
    let out = IndexBuilder::from_config(&config)?.build(&source)?;

    let paths = IndexPaths::new(output);
    save_build(&paths, &out)?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    save_meta(&paths, &MetaFile::for_build(&out, threshold, created_at))?;

    tracing::info!(output = %output.display(), "index build complete");
    println!("Indexing complete. Terms in dictionary: {}", out.num_terms());
    Ok(())
}

fn search(index_dir: &Path, stoplist: &Path, mode: QueryMode, query: &str) -> Result<()> {
    let paths = IndexPaths::new(index_dir);
    let retriever = open_retriever(&paths, stoplist)?;
    let results = retriever.search(query, mode);
    tracing::debug!(%mode, query, hits = results.len(), "search complete");

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }
    println!("DocIDs ({}):", results.len());
    for doc_id in results {
        println!("{}\t{}", doc_id, retriever.resolve(doc_id).unwrap_or("?"));
    }
    Ok(())
}
