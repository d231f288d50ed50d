//! Handler for the `feedsmith explain` command.
//!
//! Prints the relevance tier, engagement and combined search score for
//! each item so a ranking can be debugged without reading the tables.

use std::path::PathBuf;

use colored::Colorize;

use crate::error::Result;
use crate::ranker::{self, ScoredItem};
use crate::source;

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

/// All inputs needed to run the explain command.
#[derive(Debug)]
pub struct ExplainCommandOptions {
    pub query: String,
    pub items: PathBuf,
    /// Limit to top N entries.
    pub top: Option<usize>,
    /// Include items with no textual match.
    pub all: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

/// Run the explain command.
pub fn run(options: ExplainCommandOptions) -> Result<()> {
    let items = source::load_items(&options.items)?;
    let entries = explain_entries(&items, &options.query, options.all, options.top);

    for entry in &entries {
        let title = if entry.item.title().is_empty() {
            entry.item.id.as_str()
        } else {
            entry.item.title()
        };
        let tier = if entry.match_type.is_none() {
            entry.match_type.to_string().dimmed().to_string()
        } else {
            entry.match_type.to_string().green().to_string()
        };
        println!("  {} ({})", title.bold(), tier);
        println!(
            "    relevance: {:.2}, engagement: {:.2}, combined: {:.2}",
            entry.relevance_score, entry.engagement_score, entry.combined_score,
        );
    }

    if !options.quiet {
        println!();
        let matched = items
            .iter()
            .filter(|i| crate::relevance::score(i, &options.query).score > 0.0)
            .count();
        println!(
            "{} {} of {} item{} matched \"{}\"",
            "summary:".green().bold(),
            matched,
            items.len(),
            if items.len() == 1 { "" } else { "s" },
            options.query.trim(),
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Scored items in search order, optionally without non-matches, capped at `top`.
pub fn explain_entries(
    items: &[crate::content::ContentItem],
    query: &str,
    include_unmatched: bool,
    top: Option<usize>,
) -> Vec<ScoredItem> {
    let order = ranker::rank_search(items, query);
    let mut scored = ranker::score_items(&order, query);
    if !include_unmatched {
        scored.retain(ScoredItem::is_relevant);
    }
    if let Some(top) = top {
        scored.truncate(top);
    }
    scored
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentItem;

    fn items() -> Vec<ContentItem> {
        vec![
            ContentItem::new("x").with_title("unrelated"),
            ContentItem::new("y").with_channel("SQL Weekly"),
            ContentItem::new("z").with_title("SQL in ten minutes"),
        ]
    }

    #[test]
    fn entries_follow_search_order() {
        let entries = explain_entries(&items(), "SQL", false, None);
        let ids: Vec<&str> = entries.iter().map(|e| e.item.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y"]);
        assert_eq!(entries[0].match_type.to_string(), "title-exact-case-sensitive");
        assert_eq!(entries[1].match_type.to_string(), "channel-case-sensitive");
    }

    #[test]
    fn all_flag_keeps_unmatched() {
        let entries = explain_entries(&items(), "SQL", true, None);
        assert_eq!(entries.len(), 3);
        assert!(!entries[2].is_relevant());
    }

    #[test]
    fn top_caps_entries() {
        let entries = explain_entries(&items(), "SQL", true, Some(1));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item.id, "z");
    }

    #[test]
    fn run_reads_items_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(&path, r#"[{"id": "a", "title": "SQL"}]"#).unwrap();
        run(ExplainCommandOptions {
            query: "SQL".into(),
            items: path,
            top: None,
            all: false,
            quiet: true,
        })
        .unwrap();
    }
}
