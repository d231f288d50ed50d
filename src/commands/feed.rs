//! Handler for the `feedsmith feed` command.
//!
//! Composes a home feed from a catalog file. The profile comes from
//! `--profile` when given, otherwise from the no-history provider.

use std::path::PathBuf;

use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::OutputFormat;
use crate::error::{FeedSmithError, Result};
use crate::feed::{self, FeedOptions, FeedResponse};
use crate::output::{self, FormatOptions, Listing, Row};
use crate::profile::{JsonProfileProvider, NoHistoryProvider, PreferenceProvider};
use crate::source::JsonFileSource;
use crate::utils;

/// All inputs needed to run the feed command.
#[derive(Debug)]
pub struct FeedCommandOptions {
    pub items: PathBuf,
    pub user: Option<String>,
    pub profile: Option<PathBuf>,
    pub limit: Option<usize>,
    pub seed: Option<u64>,
    pub now: Option<String>,
    pub format: OutputFormat,
    pub out: Option<PathBuf>,
    pub stdout: bool,
    pub quiet: bool,
    pub config_path: Option<PathBuf>,
}

/// Run the feed command.
///
/// On a collaborator failure the command still prints the empty response
/// with its `error` field, then returns the original error.
pub fn run(options: FeedCommandOptions) -> Result<()> {
    let config = super::load_config(options.config_path.as_deref())?;
    let now = utils::resolve_now(options.now.as_deref())?;
    if options.limit == Some(0) {
        return Err(FeedSmithError::validation("--limit", "must be greater than 0"));
    }

    let mut feed_options = FeedOptions::new(now);
    feed_options.limit = options.limit;
    feed_options.user_id = options.user.clone();

    let source = JsonFileSource::new(&options.items);
    let provider: Box<dyn PreferenceProvider> = match &options.profile {
        Some(path) => Box::new(JsonProfileProvider::new(path).with_balance(config.feed.balance)),
        None => Box::new(NoHistoryProvider {
            balance: config.feed.balance,
        }),
    };
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let outcome = feed::try_compose_feed(
        &source,
        provider.as_ref(),
        &config.feed,
        &feed_options,
        &mut rng,
    );
    let (response, failure) = match outcome {
        Ok(feed) => (FeedResponse::from(feed), None),
        Err(err) => (FeedResponse::failed(&err), Some(err)),
    };

    let listing = build_listing(&response)?;
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

    if let Some(err) = failure {
        return Err(err);
    }
    if !options.quiet && !options.stdout {
        eprintln!("{} {}", "feed:".green().bold(), listing.summary);
    }
    Ok(())
}

fn build_listing(response: &FeedResponse) -> Result<Listing> {
    let rows = response
        .recommendations
        .iter()
        .map(|item| Row::from_item(item, item.specialization()))
        .collect();
    let stats = &response.stats;
    let mut summary = format!(
        "{} from {}, {} fresh, {} personalized, {} categories",
        utils::plural(response.recommendations.len(), "recommendation"),
        utils::plural(stats.total_videos, "candidate"),
        stats.fresh_videos,
        stats.personalized_videos,
        stats.diverse_categories,
    );
    let breakdown = feed::category_breakdown(&response.recommendations);
    if !breakdown.is_empty() {
        let parts: Vec<String> = breakdown.iter().map(|(c, n)| format!("{c} {n}")).collect();
        summary.push_str(&format!(" ({})", parts.join(", ")));
    }
    Listing::new("Home feed", summary, rows, response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &std::path::Path) -> FeedCommandOptions {
        let items = dir.join("items.json");
        let docs: Vec<String> = (0..8)
            .map(|i| {
                format!(
                    r#"{{"id": "v{i}", "title": "Video {i}", "specialization": "Music", "viewCount": {}, "createdAt": "2024-05-3{}T00:00:00Z"}}"#,
                    i * 10,
                    i % 2
                )
            })
            .collect();
        std::fs::write(&items, format!("[{}]", docs.join(","))).unwrap();
        FeedCommandOptions {
            items,
            user: Some("u1".into()),
            profile: None,
            limit: Some(5),
            seed: Some(7),
            now: Some("2024-06-01T12:00:00Z".into()),
            format: OutputFormat::Json,
            out: Some(dir.join("feed.json")),
            stdout: false,
            quiet: true,
            config_path: None,
        }
    }

    fn read(path: &std::path::Path) -> serde_json::Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn feed_writes_limit_recommendations_with_stats() {
        let dir = tempfile::tempdir().unwrap();
        run(options(dir.path())).unwrap();
        let value = read(&dir.path().join("feed.json"));
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 5);
        assert_eq!(value["stats"]["totalVideos"], 8);
        assert_eq!(value["stats"]["hasPersonalization"], false);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn same_seed_same_feed() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        run(options(a.path())).unwrap();
        run(options(b.path())).unwrap();
        assert_eq!(
            read(&a.path().join("feed.json"))["recommendations"],
            read(&b.path().join("feed.json"))["recommendations"]
        );
    }

    #[test]
    fn missing_catalog_reports_error_with_empty_feed() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.items = dir.path().join("missing.json");
        let err = run(opts).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        let value = read(&dir.path().join("feed.json"));
        assert!(value["recommendations"].as_array().unwrap().is_empty());
        assert!(value["error"].is_string());
    }

    #[test]
    fn missing_catalog_keeps_user_error_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.items = dir.path().join("missing.json");
        let err = run(opts).unwrap_err();
        assert!(matches!(err, FeedSmithError::InvalidPath { .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn unreadable_profile_reports_profile_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.profile = Some(dir.path().join("nobody.json"));
        let err = run(opts).unwrap_err();
        assert!(matches!(err, FeedSmithError::Profile { .. }));
        assert!(!err.to_string().contains("content source failed"));
        let value = read(&dir.path().join("feed.json"));
        assert!(value["error"]
            .as_str()
            .unwrap()
            .starts_with("preference profile unavailable"));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path());
        opts.limit = Some(0);
        assert!(run(opts).unwrap_err().is_user_error());
    }
}
