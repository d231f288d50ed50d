use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{FeedSmithError, Result};
use crate::profile::PersonalizationBalance;

/// Top-level configuration for feedsmith.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub search: SearchConfig,
}

/// Home-feed composition settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Number of recommendations when the caller does not ask for a size.
    pub default_limit: usize,
    /// How many preceding items count toward creator variety.
    pub variety_window: usize,
    /// Categories that earn the broad-interest boost.
    pub broad_categories: Vec<String>,
    /// Beginner/guide keywords that earn the title and description boosts.
    pub appeal_keywords: Vec<String>,
    /// Balance used when the preference provider has no data.
    pub balance: PersonalizationBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Cap on search and filter output. `None` returns everything.
    pub max_results: Option<usize>,
}

// --- Defaults ---

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            variety_window: 10,
            broad_categories: vec![
                "Technology".into(),
                "Education".into(),
                "Entertainment".into(),
                "Music".into(),
                "Gaming".into(),
                "Science".into(),
                "Lifestyle".into(),
                "Travel".into(),
                "Food".into(),
                "Sports".into(),
            ],
            appeal_keywords: vec![
                "beginner".into(),
                "beginners".into(),
                "guide".into(),
                "tutorial".into(),
                "introduction".into(),
                "basics".into(),
                "how to".into(),
                "tips".into(),
                "explained".into(),
                "getting started".into(),
            ],
            balance: PersonalizationBalance::default(),
        }
    }
}

// --- Config methods ---

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeedSmithError::io(format!("reading config from '{}'", path.display()), e)
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FeedSmithError::config_with_source("failed to parse config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the discovered config file, or defaults when there is none.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match find_config_file(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(&path)
            }
            None => match explicit {
                Some(p) => Err(FeedSmithError::invalid_path(
                    p.display().to_string(),
                    "config file does not exist",
                )),
                None => Ok(Self::default()),
            },
        }
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| FeedSmithError::config_with_source("failed to serialize config", e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FeedSmithError::io(
                    format!("creating config directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        std::fs::write(path, content)
            .map_err(|e| FeedSmithError::io(format!("writing config to '{}'", path.display()), e))
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if self.feed.default_limit == 0 {
            return Err(FeedSmithError::validation(
                "feed.default_limit",
                "must be greater than 0",
            ));
        }
        if self.feed.variety_window == 0 {
            return Err(FeedSmithError::validation(
                "feed.variety_window",
                "must be greater than 0",
            ));
        }
        if self.search.max_results == Some(0) {
            return Err(FeedSmithError::validation(
                "search.max_results",
                "must be greater than 0 when set",
            ));
        }
        self.feed.balance.validate()
    }

    /// Merge overrides on top of this config (non-default fields win).
    pub fn merge(&mut self, overrides: Config) {
        let defaults = FeedConfig::default();
        if overrides.feed.default_limit != defaults.default_limit {
            self.feed.default_limit = overrides.feed.default_limit;
        }
        if overrides.feed.variety_window != defaults.variety_window {
            self.feed.variety_window = overrides.feed.variety_window;
        }
        if overrides.feed.broad_categories != defaults.broad_categories {
            self.feed.broad_categories = overrides.feed.broad_categories;
        }
        if overrides.feed.appeal_keywords != defaults.appeal_keywords {
            self.feed.appeal_keywords = overrides.feed.appeal_keywords;
        }
        if overrides.feed.balance != defaults.balance {
            self.feed.balance = overrides.feed.balance;
        }
        if overrides.search.max_results.is_some() {
            self.search.max_results = overrides.search.max_results;
        }
    }
}

/// Builder for constructing Config with selective overrides.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_feed_limit(mut self, limit: usize) -> Self {
        self.config.feed.default_limit = limit;
        self
    }

    pub fn with_variety_window(mut self, window: usize) -> Self {
        self.config.feed.variety_window = window;
        self
    }

    pub fn with_balance(mut self, balance: PersonalizationBalance) -> Self {
        self.config.feed.balance = balance;
        self
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.config.search.max_results = Some(max);
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the config file using standard search order:
/// 1. Explicit path (if provided)
/// 2. ./feedsmith.toml
/// 3. ~/.feedsmith.toml
/// 4. XDG config dir
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        return None;
    }

    let local = PathBuf::from("feedsmith.toml");
    if local.exists() {
        return Some(local);
    }

    if let Some(home) = dirs_home() {
        let home_config = home.join(".feedsmith.toml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "feedsmith") {
        let xdg = proj_dirs.config_dir().join("feedsmith.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
