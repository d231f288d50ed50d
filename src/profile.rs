//! User preference profiles and the providers that supply them.
//!
//! Behavioural tracking does not exist yet, so the default provider always
//! reports `hasData: false` and the feed degrades to non-personalized
//! ranking. The [`PreferenceProvider`] seam lets a real implementation slot
//! in later without touching the scoring math.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FeedSmithError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Relative share of the feed given to each selection bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalizationBalance {
    pub history: f64,
    pub searches: f64,
    pub general: f64,
    pub discovery: f64,
}

impl Default for PersonalizationBalance {
    fn default() -> Self {
        Self {
            history: 0.3,
            searches: 0.2,
            general: 0.3,
            discovery: 0.2,
        }
    }
}

impl PersonalizationBalance {
    pub fn weights(&self) -> [f64; 4] {
        [self.history, self.searches, self.general, self.discovery]
    }

    pub fn validate(&self) -> Result<()> {
        let weights = self.weights();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FeedSmithError::validation(
                "balance",
                "weights must be finite and non-negative",
            ));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(FeedSmithError::validation(
                "balance",
                "at least one weight must be positive",
            ));
        }
        Ok(())
    }
}

/// What the platform knows about a viewer's tastes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferenceProfile {
    pub has_data: bool,
    /// Most-preferred first.
    pub top_categories: Vec<String>,
    pub top_channels: Vec<String>,
    /// Most recent first.
    pub recent_search_terms: Vec<String>,
    pub category_distribution: HashMap<String, u64>,
    pub personalization_balance: PersonalizationBalance,
}

impl UserPreferenceProfile {
    /// The profile used when nothing is known about the viewer.
    pub fn empty(balance: PersonalizationBalance) -> Self {
        Self {
            personalization_balance: balance,
            ..Self::default()
        }
    }

    /// Share of `category` in the viewer's recent history, in `[0, 1]`.
    pub fn category_share(&self, category: &str) -> f64 {
        let total: u64 = self.category_distribution.values().sum();
        if total == 0 {
            return 0.0;
        }
        let count = self.category_distribution.get(category).copied().unwrap_or(0);
        count as f64 / total as f64
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Supplies the preference profile for a viewer.
pub trait PreferenceProvider {
    fn profile(&self, user_id: Option<&str>) -> Result<UserPreferenceProfile>;
}

/// Provider for deployments without behavioural tracking.
#[derive(Debug, Clone, Default)]
pub struct NoHistoryProvider {
    pub balance: PersonalizationBalance,
}

impl PreferenceProvider for NoHistoryProvider {
    fn profile(&self, _user_id: Option<&str>) -> Result<UserPreferenceProfile> {
        Ok(UserPreferenceProfile::empty(self.balance))
    }
}

/// Reads a single profile document from disk, used by the CLI.
///
/// A document without `personalizationBalance` gets the provider's
/// balance, the same one [`NoHistoryProvider`] reports.
#[derive(Debug, Clone)]
pub struct JsonProfileProvider {
    path: PathBuf,
    balance: PersonalizationBalance,
}

impl JsonProfileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            balance: PersonalizationBalance::default(),
        }
    }

    pub fn with_balance(mut self, balance: PersonalizationBalance) -> Self {
        self.balance = balance;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceProvider for JsonProfileProvider {
    fn profile(&self, user_id: Option<&str>) -> Result<UserPreferenceProfile> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            FeedSmithError::profile(format!(
                "reading profile '{}' for user {}: {e}",
                self.path.display(),
                user_id.unwrap_or("<anonymous>")
            ))
        })?;
        let parse_err = |e: serde_json::Error| {
            FeedSmithError::parse(self.path.display().to_string(), e.to_string())
        };
        let document: serde_json::Value = serde_json::from_str(&content).map_err(parse_err)?;
        let has_balance = document
            .get("personalizationBalance")
            .is_some_and(|b| !b.is_null());

        let mut profile: UserPreferenceProfile =
            serde_json::from_value(document).map_err(parse_err)?;
        if !has_balance {
            profile.personalization_balance = self.balance;
        }
        profile.personalization_balance.validate()?;
        Ok(profile)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
