//! dtexplain CLI: explain individual decision-tree predictions.
//!
//! Loads a model bundle, runs the rule-based or LLM explainer for one or
//! more records, and persists each report next to its probing questions.

mod commands;

use anyhow::Context;
use clap::Parser;
use dtexplain_core::Strategy;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// dtexplain: plain-language explanations for decision-tree predictions
#[derive(Parser, Debug)]
#[command(name = "dtexplain", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (config lookup and relative output paths)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Explain records from a model bundle and save the reports
    Explain(ExplainArgs),
    /// Print the decision path and value ranges for one record
    Path {
        /// Model bundle (JSON)
        bundle: PathBuf,
        /// Record index within the bundle
        #[arg(short, long)]
        index: usize,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct ExplainArgs {
    /// Model bundle (JSON)
    bundle: PathBuf,

    /// Record index within the bundle
    #[arg(short, long, required_unless_present = "all", conflicts_with = "all")]
    index: Option<usize>,

    /// Explain every record in the bundle
    #[arg(long)]
    all: bool,

    /// Explanation strategy: rule or llm
    #[arg(short, long, default_value = "rule")]
    strategy: Strategy,

    /// Output subdirectory (defaults to the strategy name)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Output root directory (overrides `output.dir`)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write JSON reports instead of text
    #[arg(long)]
    json: bool,

    /// Seed for sanity-question sampling
    #[arg(long)]
    seed: Option<u64>,

    /// LLM model to use (overrides `llm.model`)
    #[arg(short, long)]
    model: Option<String>,

    /// Skip the two "was this feature considered" questions
    #[arg(long)]
    no_sanity: bool,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "dtexplain", "dtexplain")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "dtexplain.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = resolve_workspace(&cli.workspace)?;

    commands::handle_command(cli.command, &workspace).await
}

/// Canonicalize the workspace directory; a missing directory is an error.
fn resolve_workspace(path: &Path) -> anyhow::Result<PathBuf> {
    let workspace = path
        .canonicalize()
        .with_context(|| format!("Workspace {} not found", path.display()))?;
    if !workspace.is_dir() {
        anyhow::bail!("Workspace {} is not a directory", path.display());
    }
    Ok(workspace)
}
