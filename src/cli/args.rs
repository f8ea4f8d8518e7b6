//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, deps::DepsArgs, graph::GraphArgs, init::InitArgs,
    list::ListArgs, new::NewArgs, search::SearchArgs, show::ShowArgs, step::StepCommands,
    validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "mfgdocs")]
#[command(author, version, about = "Manufacturing process documentation toolkit")]
#[command(
    long_about = "Keeps manufacturing steps, parts and resources as plain JSON records and answers dependency and part-flow questions about them."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .mfgdocs/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new mfgdocs project
    Init(InitArgs),

    /// Create a new entity with a generated key
    New(NewArgs),

    /// List the entities of one kind
    List(ListArgs),

    /// Show one entity in full
    Show(ShowArgs),

    /// Show what a step waits on and what waits on it
    Deps(DepsArgs),

    /// Export the part-flow or bill-of-materials graph
    Graph(GraphArgs),

    /// Search across all entity kinds
    Search(SearchArgs),

    /// Check references, duplicate keys and dependency cycles
    Validate(ValidateArgs),

    /// Edit a step's parts and dependencies
    #[command(subcommand)]
    Step(StepCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just keys, one per line
    Id,
    /// Graphviz DOT (graph command)
    Dot,
}
