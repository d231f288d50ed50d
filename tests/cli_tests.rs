use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("feedsmith").unwrap()
}

/// Helper: write a small catalog into a fresh temp dir.
fn setup_catalog() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("items.json"),
        r#"[
  {"id": "pop", "title": "Cooking pasta at home", "channelName": "Kitchen",
   "specialization": "Food", "viewCount": 90000, "comments": 400, "likes": 2000,
   "createdAt": "2024-05-20T00:00:00Z"},
  {"id": "exact", "title": "Rust", "channelName": "Ferris",
   "specialization": "Technology", "viewCount": 10, "createdAt": "2024-05-31T00:00:00Z"},
  {"id": "chan", "title": "Weekly update", "channelName": "Rust Weekly",
   "specialization": "Technology", "viewCount": 50, "createdAt": "2024-05-30T00:00:00Z"},
  {"id": "tag", "title": "Systems talk", "hashtags": ["rust", "systems"],
   "specialization": "Education", "viewCount": 5, "createdAt": "2024-05-29T00:00:00Z"},
  {"id": "old", "title": "Gardening basics", "specialization": "Lifestyle",
   "viewCount": 300, "comments": 3, "likes": 10, "createdAt": "2023-01-01T00:00:00Z"}
]"#,
    )
    .unwrap();
    dir
}

fn ids(stdout: &[u8], pointer: Option<&str>) -> Vec<String> {
    let json: serde_json::Value = serde_json::from_slice(stdout).unwrap();
    let arr = match pointer {
        Some(p) => json.pointer(p).unwrap().clone(),
        None => json,
    };
    arr.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

// -----------------------------------------------------------------------
// General CLI tests
// -----------------------------------------------------------------------

#[test]
fn help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("feed"))
        .stdout(predicate::str::contains("explain"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("feedsmith"));
}

#[test]
fn unknown_command_fails() {
    cmd().arg("rank").assert().failure();
}

// -----------------------------------------------------------------------
// init
// -----------------------------------------------------------------------

#[test]
fn init_creates_config() {
    let dir = tempdir().unwrap();
    cmd()
        .args(["init", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    let content = std::fs::read_to_string(dir.path().join("feedsmith.toml")).unwrap();
    assert!(content.contains("[feed]"));
    assert!(content.contains("default_limit = 20"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    cmd().args(["init", "--root"]).arg(dir.path()).assert().success();
    cmd()
        .args(["init", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    cmd()
        .args(["init", "--force", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Overwrote config"));
}

// -----------------------------------------------------------------------
// search / filter
// -----------------------------------------------------------------------

#[test]
fn search_puts_matches_before_popular_items() {
    let dir = setup_catalog();
    let out = cmd()
        .current_dir(dir.path())
        .args(["search", "Rust", "--items", "items.json"])
        .args(["--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let order = ids(&out, None);
    assert_eq!(order.len(), 5);
    assert_eq!(order[0], "exact");
    let pop = order.iter().position(|id| id == "pop").unwrap();
    for matched in ["exact", "chan", "tag"] {
        let pos = order.iter().position(|id| id == matched).unwrap();
        assert!(pos < pop, "{matched} should rank above unmatched items");
    }
}

#[test]
fn search_blank_query_orders_by_engagement() {
    let dir = setup_catalog();
    let out = cmd()
        .current_dir(dir.path())
        .args(["search", "", "--items", "items.json", "--limit", "2"])
        .args(["--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(ids(&out, None), vec!["pop", "old"]);
}

#[test]
fn search_plain_output_shows_match_type() {
    let dir = setup_catalog();
    cmd()
        .current_dir(dir.path())
        .args(["search", "Rust", "--items", "items.json", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title-exact-case-sensitive"));
}

#[test]
fn search_writes_to_out_file() {
    let dir = setup_catalog();
    let out_path = dir.path().join("results").join("search.md");
    cmd()
        .current_dir(dir.path())
        .args(["search", "rust", "--items", "items.json", "--format", "markdown", "-o"])
        .arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("search:"));
    let content = std::fs::read_to_string(&out_path).unwrap();
    assert!(content.starts_with("# Search results for \"rust\""));
}

#[test]
fn filter_keeps_score_annotations() {
    let dir = setup_catalog();
    let out = cmd()
        .current_dir(dir.path())
        .args(["filter", "Technology", "--items", "items.json"])
        .args(["--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let first = &json.as_array().unwrap()[0];
    assert!(first.get("_filterScore").is_some());
    assert!(first.get("_relevanceScore").is_some());
    assert!(first.get("_engagementScore").is_some());
}

#[test]
fn missing_items_file_fails() {
    let dir = tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["search", "rust", "--items", "nope.json", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn malformed_records_do_not_sink_the_catalog() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("items.json"),
        r#"[
  {"_id": {"$oid": "65f0"}, "title": "Rust", "createdAt": {"$date": "2024-05-01T12:00:00Z"}},
  {"id": "bad", "title": 42, "viewCount": "1200", "hashtags": "rust", "kind": "short"},
  17
]"#,
    )
    .unwrap();
    let out = cmd()
        .current_dir(dir.path())
        .args(["search", "Rust", "--items", "items.json"])
        .args(["--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(ids(&out, None), vec!["65f0", "bad"]);
}

#[test]
fn malformed_items_file_fails() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("items.json"), "{not json").unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["filter", "Music", "--items", "items.json", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// -----------------------------------------------------------------------
// feed
// -----------------------------------------------------------------------

#[test]
fn feed_returns_requested_count_with_stats() {
    let dir = setup_catalog();
    let out = cmd()
        .current_dir(dir.path())
        .args(["feed", "--items", "items.json", "--limit", "3", "--seed", "42"])
        .args(["--now", "2024-06-01T00:00:00Z", "--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 3);
    assert_eq!(json["stats"]["totalVideos"], 5);
    assert_eq!(json["stats"]["hasPersonalization"], false);
    assert!(json.get("error").is_none());
}

#[test]
fn feed_is_reproducible_with_seed() {
    let dir = setup_catalog();
    let run = || {
        cmd()
            .current_dir(dir.path())
            .args(["feed", "--items", "items.json", "--seed", "9"])
            .args(["--now", "2024-06-01T00:00:00Z", "--format", "json", "--stdout"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    let first = ids(&run(), Some("/recommendations"));
    let second = ids(&run(), Some("/recommendations"));
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}

#[test]
fn feed_uses_profile_file() {
    let dir = setup_catalog();
    std::fs::write(
        dir.path().join("profile.json"),
        r#"{"hasData": true, "topCategories": ["Technology"], "topChannels": ["Ferris"],
            "recentSearchTerms": [], "categoryDistribution": {"Technology": 8}}"#,
    )
    .unwrap();
    let out = cmd()
        .current_dir(dir.path())
        .args(["feed", "--items", "items.json", "--profile", "profile.json"])
        .args(["--user", "u1", "--seed", "1", "--now", "2024-06-01T00:00:00Z"])
        .args(["--format", "json", "--stdout"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["stats"]["hasPersonalization"], true);
    assert!(json["stats"]["personalizedVideos"].as_u64().unwrap() >= 1);
}

#[test]
fn feed_rejects_bad_now() {
    let dir = setup_catalog();
    cmd()
        .current_dir(dir.path())
        .args(["feed", "--items", "items.json", "--now", "yesterday", "--stdout"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--now"));
}

#[test]
fn feed_with_missing_items_reports_error_but_prints_response() {
    let dir = tempdir().unwrap();
    cmd()
        .current_dir(dir.path())
        .args(["feed", "--items", "missing.json", "--format", "json", "--stdout"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"recommendations\": []"))
        .stderr(predicate::str::contains("error:"));
}

// -----------------------------------------------------------------------
// explain
// -----------------------------------------------------------------------

#[test]
fn explain_prints_breakdown() {
    let dir = setup_catalog();
    cmd()
        .current_dir(dir.path())
        .args(["--color", "never", "explain", "Rust", "--items", "items.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title-exact-case-sensitive"))
        .stdout(predicate::str::contains("relevance:"))
        .stdout(predicate::str::contains("3 of 5 items matched"));
}

#[test]
fn explain_all_includes_unmatched() {
    let dir = setup_catalog();
    cmd()
        .current_dir(dir.path())
        .args(["--color", "never", "explain", "Rust", "--items", "items.json", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gardening basics (none)"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = setup_catalog();
    cmd()
        .current_dir(dir.path())
        .args(["--config", "absent.toml", "search", "rust", "--items", "items.json"])
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file does not exist"));
}
