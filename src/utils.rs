//! Shared helpers used across multiple commands.

use chrono::{DateTime, Utc};

use crate::cli::OutputFormat;
use crate::error::{FeedSmithError, Result};
use crate::output::Format;

// ---------------------------------------------------------------------------
// Format mapping
// ---------------------------------------------------------------------------

/// Map the clap [`OutputFormat`] to the library [`Format`].
pub fn cli_format_to_output_format(fmt: &OutputFormat) -> Format {
    match fmt {
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Json => Format::Json,
        OutputFormat::Plain => Format::Plain,
    }
}

// ---------------------------------------------------------------------------
// Reference time
// ---------------------------------------------------------------------------

/// Parse an RFC 3339 `--now` override, defaulting to the current time.
pub fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        None => Ok(Utc::now()),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| FeedSmithError::validation("--now", format!("'{raw}': {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Result limits
// ---------------------------------------------------------------------------

/// Pick the effective result cap: the CLI flag wins over config.
pub fn effective_limit(flag: Option<usize>, configured: Option<usize>) -> Option<usize> {
    flag.or(configured)
}

/// Count-plus-noun with a naive plural.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
