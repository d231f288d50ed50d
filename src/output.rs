//! Output formatting for ranking results.
//!
//! Every command builds a [`Listing`]: the human-readable rows plus the
//! JSON payload callers consume programmatically. The formatter picks one
//! of the two and [`write_output`] sends it to a file or stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::content::ContentItem;
use crate::error::{FeedSmithError, Result};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Controls where and how output is written.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Desired output format.
    pub format: Format,
    /// If true, write to stdout instead of a file.
    pub stdout: bool,
    /// File path to write to (ignored when `stdout` is true).
    pub out: Option<PathBuf>,
}

/// Supported output formats.
///
/// Mirrors [`crate::cli::OutputFormat`] but decoupled from clap so that
/// library code can use it without pulling in CLI dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Markdown,
    Json,
    Plain,
}

/// A ranked result set ready for formatting.
#[derive(Debug, Clone)]
pub struct Listing {
    /// Heading line (e.g. `Search results for "rust"`).
    pub heading: String,
    /// One-line summary (e.g. "3 of 10 items matched").
    pub summary: String,
    /// Rows in rank order.
    pub rows: Vec<Row>,
    /// Machine-readable form, emitted verbatim for JSON output.
    pub payload: serde_json::Value,
}

/// One ranked item as shown to a person.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub title: String,
    pub channel: String,
    /// Score breakdown or other per-row detail.
    pub note: String,
}

impl Row {
    pub fn from_item(item: &ContentItem, note: impl Into<String>) -> Self {
        let title = if item.title().is_empty() {
            "(untitled)".to_string()
        } else {
            item.title().to_string()
        };
        Self {
            id: item.id.clone(),
            title,
            channel: item.channel_name().to_string(),
            note: note.into(),
        }
    }
}

impl Listing {
    pub fn new(
        heading: impl Into<String>,
        summary: impl Into<String>,
        rows: Vec<Row>,
        payload: &impl Serialize,
    ) -> Result<Self> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| FeedSmithError::serialize("results as JSON", e))?;
        Ok(Self {
            heading: heading.into(),
            summary: summary.into(),
            rows,
            payload,
        })
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Render a listing to a string in the given format.
pub fn format_listing(listing: &Listing, format: Format) -> Result<String> {
    match format {
        Format::Markdown => Ok(format_markdown(listing)),
        Format::Json => format_json(listing),
        Format::Plain => Ok(format_plain(listing)),
    }
}

/// Markdown: numbered list under a heading.
fn format_markdown(listing: &Listing) -> String {
    let mut out = format!("# {}\n\n", listing.heading);
    if !listing.summary.is_empty() {
        out.push_str(&format!("> {}\n\n", listing.summary));
    }
    for (rank, row) in listing.rows.iter().enumerate() {
        out.push_str(&format!("{}. **{}** (`{}`)", rank + 1, row.title, row.id));
        if !row.channel.is_empty() {
            out.push_str(&format!(" by {}", row.channel));
        }
        if !row.note.is_empty() {
            out.push_str(&format!("  \n   *{}*", row.note));
        }
        out.push('\n');
    }
    out
}

/// JSON: the payload, pretty-printed.
fn format_json(listing: &Listing) -> Result<String> {
    let mut json = serde_json::to_string_pretty(&listing.payload)
        .map_err(|e| FeedSmithError::serialize("results as JSON", e))?;
    json.push('\n');
    Ok(json)
}

/// Plain text: one row per line, no decoration.
fn format_plain(listing: &Listing) -> String {
    let mut out = String::new();
    if !listing.summary.is_empty() {
        out.push_str(&listing.summary);
        out.push_str("\n\n");
    }
    for (rank, row) in listing.rows.iter().enumerate() {
        out.push_str(&format!("{:>3}. {} [{}]", rank + 1, row.title, row.id));
        if !row.channel.is_empty() {
            out.push_str(&format!(" {}", row.channel));
        }
        if !row.note.is_empty() {
            out.push_str(&format!("  ({})", row.note));
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Output writing
// ---------------------------------------------------------------------------

/// Write a formatted string to the appropriate destination.
///
/// If `options.stdout` is true, writes to stdout. Otherwise writes to the
/// file at `options.out` (creating parent directories as needed).
pub fn write_output(content: &str, options: &FormatOptions) -> Result<()> {
    match (&options.out, options.stdout) {
        (Some(path), false) => write_to_file(content, path),
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .map_err(|e| FeedSmithError::io("writing to stdout", e))
        }
    }
}

/// Write content to a file, creating parent directories if needed.
fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            FeedSmithError::io(format!("creating directory '{}'", parent.display()), e)
        })?;
    }
    std::fs::write(path, content)
        .map_err(|e| FeedSmithError::io(format!("writing output to '{}'", path.display()), e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
