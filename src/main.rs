//! # Cellar Digest CLI (`cellar`)
//!
//! The `cellar` binary is the primary interface for Cellar Digest. It
//! provides commands for corpus inspection, review selection, summary
//! generation, and offline summary evaluation.
//!
//! ## Usage
//!
//! ```bash
//! cellar --config ./config/cellar.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cellar stats` | Load the corpus and print record/column coverage |
//! | `cellar reviewers` | Print the most engaged reviewer profiles |
//! | `cellar reviews "<query>"` | Print the selection for a category (or `--name` wine) |
//! | `cellar summarize "<query>"` | Select reviews and generate a summary |
//! | `cellar eval <dataset.jsonl>` | Score generated summaries against references |
//!
//! ## Examples
//!
//! ```bash
//! # Corpus health check
//! cellar stats --config ./config/cellar.toml
//!
//! # Inspect what would be summarized, without a generation call
//! cellar reviews "Cabernet Sauvignon" --max-reviews 10
//!
//! # Summarize a category
//! cellar summarize "Cabernet Sauvignon" --length medium
//!
//! # Summarize one specific wine instead of a category
//! cellar summarize "Duckhorn Three Palms Merlot" --name --length short
//! ```

mod compose;
mod config;
mod corpus;
mod eval;
mod generation;
mod models;
mod profiles;
mod rouge;
mod select;
mod stats;
mod table;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cellar Digest CLI — review selection and LLM summarization for wine
/// tasting corpora.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/cellar.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cellar",
    about = "Cellar Digest — review selection and LLM summarization for wine tasting corpora",
    version,
    long_about = "Cellar Digest loads a flat-file corpus of customer wine reviews, ranks them by \
    reviewer engagement, selects a bounded one-per-reviewer sample for a requested wine category, \
    and produces a narrative summary via an external text-generation service with a locally \
    computed average-rating sentence."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cellar.toml`. Corpus, selection, and generation
    /// settings are read from this file.
    #[arg(long, global = true, default_value = "./config/cellar.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Print corpus statistics.
    ///
    /// Loads the corpus and reports record counts, per-column parse
    /// coverage, distinct variants and reviewers, and the review time span.
    Stats,

    /// Print the most engaged reviewer profiles.
    ///
    /// Profiles are ordered by review count, ties broken by weeks of
    /// reviewing activity.
    Reviewers {
        /// Maximum number of profiles to print.
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Print the review selection for a query, without generating a summary.
    ///
    /// Shows exactly the rows `summarize` would feed the model: ranked by
    /// reviewer experience, at most one review per reviewer for category
    /// queries, truncated to the result bound.
    Reviews {
        /// Wine category to select for (or a specific wine name with `--name`).
        query: String,

        /// Treat the query as a specific wine name instead of a category.
        /// Name queries keep every matching review rather than one per
        /// reviewer.
        #[arg(long)]
        name: bool,

        /// Override the configured maximum number of selected reviews.
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Override the configured sampling seed.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Select reviews and generate a summary.
    ///
    /// Runs the full pipeline: load, profile, select, then one generation
    /// call. Fails before the call when the selection is empty or the
    /// length selector is invalid.
    Summarize {
        /// Wine category to summarize (or a specific wine name with `--name`).
        query: String,

        /// Treat the query as a specific wine name instead of a category.
        #[arg(long)]
        name: bool,

        /// Summary length: `short` (3 sentences), `medium` (6), or `long` (9).
        #[arg(long, default_value = "medium")]
        length: String,

        /// Override the configured maximum number of selected reviews.
        #[arg(long)]
        max_reviews: Option<usize>,

        /// Override the configured sampling seed.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Score generated summaries against reference texts.
    ///
    /// Reads a JSONL dataset of `{"prediction", "references"}` pairs and
    /// prints recall-oriented unigram, bigram, and LCS overlap scores.
    /// Offline only — no generation calls.
    Eval {
        /// Path to the JSONL evaluation dataset.
        dataset: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Eval doesn't read the corpus or call any provider; run it without
    // requiring a config file.
    if let Commands::Eval { dataset } = &cli.command {
        eval::run_eval(dataset).await?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Reviewers { limit } => {
            profiles::run_reviewers(&cfg, limit).await?;
        }
        Commands::Reviews {
            query,
            name,
            max_reviews,
            seed,
        } => {
            select::run_reviews(&cfg, &query, name, max_reviews, seed).await?;
        }
        Commands::Summarize {
            query,
            name,
            length,
            max_reviews,
            seed,
        } => {
            compose::run_summarize(&cfg, &query, name, &length, max_reviews, seed).await?;
        }
        Commands::Eval { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
