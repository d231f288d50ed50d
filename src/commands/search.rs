//! Handler for the `feedsmith search` command.
//!
//! Ranks a catalog against a free-text query. Matched items come first;
//! a blank query falls back to engagement order.

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::{self, FormatOptions, Listing, Row};
use crate::ranker;
use crate::relevance;
use crate::source;
use crate::utils;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

/// All inputs needed to run the search command.
#[derive(Debug)]
pub struct SearchCommandOptions {
    /// Free-text query.
    pub query: String,
    /// JSON array of content items.
    pub items: PathBuf,
    /// Max results to print.
    pub limit: Option<usize>,
    /// Output format.
    pub format: OutputFormat,
    /// Write output to file.
    pub out: Option<PathBuf>,
    /// Write to stdout.
    pub stdout: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Path to config file.
    pub config_path: Option<PathBuf>,
}

/// Run the search command.
pub fn run(options: SearchCommandOptions) -> Result<()> {
    let config = super::load_config(options.config_path.as_deref())?;
    let items = source::load_items(&options.items)?;
    let query = options.query.trim();

    let mut ranked = ranker::rank_search(&items, query);
    let matched = ranked
        .iter()
        .filter(|item| relevance::score(item, query).score > 0.0)
        .count();
    if let Some(limit) = utils::effective_limit(options.limit, config.search.max_results) {
        ranked.truncate(limit);
    }

    let rows = ranked
        .iter()
        .map(|item| {
            let note = if query.is_empty() {
                format!("engagement {:.1}", crate::engagement::score(item))
            } else {
                relevance::score(item, query).match_type.to_string()
            };
            Row::from_item(item, note)
        })
        .collect();

    let (heading, summary) = if query.is_empty() {
        (
            "Most engaging items".to_string(),
            format!("{} by engagement", utils::plural(items.len(), "item")),
        )
    } else {
        (
            format!("Search results for \"{query}\""),
            format!("{matched} of {} matched", utils::plural(items.len(), "item")),
        )
    };
    let listing = Listing::new(heading, summary.clone(), rows, &ranked)?;

    let format = utils::cli_format_to_output_format(&options.format);
    let formatted = output::format_listing(&listing, format)?;
    output::write_output(
        &formatted,
        &FormatOptions {
            format,
            stdout: options.stdout,
            out: options.out.clone(),
        },
    )?;

    if !options.quiet && !options.stdout {
        eprintln!("{} {summary}", "search:".green().bold());
    }
    Ok(())
}
