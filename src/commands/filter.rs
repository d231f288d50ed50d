//! Handler for the `feedsmith filter` command.
//!
//! Ranks a catalog for a category or label with the fixed 70/30
//! relevance/engagement mix. JSON output keeps the `_filterScore`,
//! `_relevanceScore`, `_engagementScore` and `_matchType` annotations.

use std::path::PathBuf;

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output::{self, FormatOptions, Listing, Row};
use crate::ranker;
use crate::source;
use crate::utils;

/// All inputs needed to run the filter command.
#[derive(Debug)]
pub struct FilterCommandOptions {
    pub label: String,
    pub items: PathBuf,
    pub limit: Option<usize>,
    pub format: OutputFormat,
    pub out: Option<PathBuf>,
    pub stdout: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

/// Run the filter command.
pub fn run(options: FilterCommandOptions) -> Result<()> {
    let config = super::load_config(options.config_path.as_deref())?;
    let items = source::load_items(&options.items)?;
    let label = options.label.trim();

    let mut ranked = ranker::rank_filter(&items, label);
    let matched = ranked.iter().filter(|f| f.relevance_score > 0.0).count();
    if let Some(limit) = utils::effective_limit(options.limit, config.search.max_results) {
        ranked.truncate(limit);
    }

    let rows = ranked
        .iter()
        .map(|f| {
            Row::from_item(
                &f.item,
                format!(
                    "score {:.1}, relevance {:.1}, engagement {:.1}, {}",
                    f.filter_score, f.relevance_score, f.engagement_score, f.match_type
                ),
            )
        })
        .collect();
    let summary = format!("{matched} of {} matched", utils::plural(items.len(), "item"));
    let listing = Listing::new(format!("Filter: {label}"), summary.clone(), rows, &ranked)?;

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
        eprintln!("{} {summary}", "filter:".green().bold());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_json_keeps_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let items = dir.path().join("items.json");
        std::fs::write(
            &items,
            r#"[
                {"id": "m", "specialization": "Music"},
                {"id": "g", "specialization": "Gaming", "viewCount": 10}
            ]"#,
        )
        .unwrap();
        let out = dir.path().join("out.json");
        run(FilterCommandOptions {
            label: "Gaming".into(),
            items,
            limit: None,
            format: OutputFormat::Json,
            out: Some(out.clone()),
            stdout: false,
            quiet: true,
            config_path: None,
        })
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "g");
        assert_eq!(first["_relevanceScore"], 200.0);
        assert_eq!(first["_matchType"], "specialization-case-sensitive");
        assert_eq!(value[1]["_matchType"], "none");
    }
}
