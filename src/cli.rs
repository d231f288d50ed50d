use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "feedsmith",
    about = "Relevance, engagement and home-feed ranking for video and post catalogs",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Flags shared by every command that prints ranked items.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,

    /// Write output to file
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write to stdout
    #[arg(long)]
    pub stdout: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default feedsmith.toml
    Init {
        /// Directory to create the config in
        #[arg(long)]
        root: Option<PathBuf>,

        /// Path to write config file
        #[arg(long = "path")]
        path: Option<PathBuf>,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Rank items against a free-text query
    #[command(alias = "s")]
    Search {
        /// Search query (blank sorts by engagement)
        query: String,

        /// JSON array of content items
        #[arg(long)]
        items: PathBuf,

        /// Max results to print
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rank items for a category or label filter
    #[command(alias = "f")]
    Filter {
        /// Filter label
        label: String,

        /// JSON array of content items
        #[arg(long)]
        items: PathBuf,

        /// Max results to print
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Compose a home feed
    Feed {
        /// JSON array of content items, newest first
        #[arg(long)]
        items: PathBuf,

        /// Viewer id
        #[arg(long)]
        user: Option<String>,

        /// JSON preference profile for the viewer
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Number of recommendations
        #[arg(long)]
        limit: Option<usize>,

        /// Seed for shuffle and jitter (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Reference time, RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the per-item score breakdown for a query
    #[command(alias = "e")]
    Explain {
        /// Search query
        query: String,

        /// JSON array of content items
        #[arg(long)]
        items: PathBuf,

        /// Show top N items
        #[arg(long)]
        top: Option<usize>,

        /// Include items that did not match
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
    Plain,
}
