//! Home-feed composition.
//!
//! [`FeedComposer::compose`] is the pure core: it scores an already-fetched
//! catalog against a preference profile and picks the feed. [`compose_feed`]
//! is the boundary used by callers that still have to fetch the catalog and
//! profile. A failure there degrades to an empty feed carrying the error
//! message, so ranking code never sees a collaborator error.

pub mod select;
pub mod signals;

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::content::ContentItem;
use crate::error::{FeedSmithError, Result};
use crate::profile::{PreferenceProvider, UserPreferenceProfile};
use crate::source::ContentSource;

use self::select::Candidate;
use self::signals::{AppealRules, Signals};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Per-call feed options.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Feed size. Falls back to the configured default.
    pub limit: Option<usize>,
    pub user_id: Option<String>,
    /// Reference time for item ages.
    pub now: DateTime<Utc>,
}

impl FeedOptions {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            limit: None,
            user_id: None,
            now,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Summary counts reported next to the recommendations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub total_videos: usize,
    pub fresh_videos: usize,
    pub personalized_videos: usize,
    pub diverse_categories: usize,
    pub has_personalization: bool,
}

/// A composed feed.
#[derive(Debug, Clone, Serialize)]
pub struct Feed {
    pub recommendations: Vec<ContentItem>,
    pub stats: FeedStats,
}

/// What the boundary hands back: a feed, or an empty one with an error.
#[derive(Debug, Clone, Serialize)]
pub struct FeedResponse {
    pub recommendations: Vec<ContentItem>,
    pub stats: FeedStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeedResponse {
    /// The empty fallback reported when a collaborator fails.
    pub fn failed(err: &FeedSmithError) -> Self {
        Self {
            recommendations: Vec::new(),
            stats: FeedStats::default(),
            error: Some(err.to_string()),
        }
    }
}

impl From<Feed> for FeedResponse {
    fn from(feed: Feed) -> Self {
        Self {
            recommendations: feed.recommendations,
            stats: feed.stats,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Scores and selects home-feed items.
#[derive(Debug, Clone)]
pub struct FeedComposer {
    rules: AppealRules,
    variety_window: usize,
    default_limit: usize,
}

impl FeedComposer {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        Ok(Self {
            rules: AppealRules::from_config(config)?,
            variety_window: config.variety_window,
            default_limit: config.default_limit,
        })
    }

    /// Compute every signal and the final score for each item, in input order.
    ///
    /// Creator variety looks back over the preceding `variety_window` items,
    /// so callers should pass the catalog newest first.
    pub fn score_candidates<'a, R: Rng + ?Sized>(
        &self,
        items: &'a [ContentItem],
        profile: &UserPreferenceProfile,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<Candidate<'a>> {
        let discovery = profile.personalization_balance.discovery;
        let mut recent: VecDeque<&str> = VecDeque::with_capacity(self.variety_window);
        let mut candidates = Vec::with_capacity(items.len());

        for item in items {
            let age = signals::age_hours(item.created_at, now);
            let channel = item.channel_key();
            let times_seen = if channel.is_empty() {
                0
            } else {
                recent.iter().filter(|c| **c == channel).count()
            };

            let s = Signals {
                age_hours: age,
                freshness: signals::freshness(age),
                engagement: signals::engagement(item),
                personalization: signals::personalization(item, profile),
                general_appeal: signals::general_appeal(item, &self.rules),
                variety: signals::creator_variety(times_seen),
                trending: signals::trending(item, age),
            };
            let jitter = if s.is_new_release() {
                rng.gen::<f64>()
            } else {
                0.0
            };
            candidates.push(Candidate {
                item,
                signals: s,
                score: signals::final_score(&s, discovery, jitter),
            });

            recent.push_back(channel);
            if recent.len() > self.variety_window {
                recent.pop_front();
            }
        }

        candidates
    }

    /// Score `items` and select the feed. Never fails.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        items: &[ContentItem],
        profile: &UserPreferenceProfile,
        options: &FeedOptions,
        rng: &mut R,
    ) -> Feed {
        let start = Instant::now();
        let limit = options.limit.unwrap_or(self.default_limit);
        let candidates = self.score_candidates(items, profile, options.now, &mut *rng);
        let picked = select::select(
            &candidates,
            limit,
            &profile.personalization_balance,
            rng,
        );

        let chosen: Vec<&Candidate> = picked.iter().map(|&i| &candidates[i]).collect();
        let stats = FeedStats {
            total_videos: items.len(),
            fresh_videos: chosen.iter().filter(|c| c.signals.freshness > 0.0).count(),
            personalized_videos: chosen
                .iter()
                .filter(|c| c.signals.personalization > 0.0)
                .count(),
            diverse_categories: chosen
                .iter()
                .map(|c| c.item.specialization())
                .filter(|s| !s.is_empty())
                .collect::<HashSet<_>>()
                .len(),
            has_personalization: profile.has_data,
        };

        tracing::debug!(
            user = options.user_id.as_deref().unwrap_or("<anonymous>"),
            candidates = items.len(),
            selected = chosen.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "composed feed"
        );

        Feed {
            recommendations: chosen.iter().map(|c| c.item.clone()).collect(),
            stats,
        }
    }
}

/// Fetch the catalog and profile, then compose the feed.
///
/// Collaborator failures are returned unchanged so callers can still
/// classify them. See [`compose_feed`] for the non-failing boundary.
pub fn try_compose_feed<R: Rng + ?Sized>(
    source: &dyn ContentSource,
    provider: &dyn PreferenceProvider,
    config: &FeedConfig,
    options: &FeedOptions,
    rng: &mut R,
) -> Result<Feed> {
    let composer = FeedComposer::new(config)?;
    let profile = provider.profile(options.user_id.as_deref())?;
    let items = source.fetch()?;
    Ok(composer.compose(&items, &profile, options, rng))
}

/// Like [`try_compose_feed`], but failures are logged and returned as an
/// empty feed with an `error` message instead of propagating.
pub fn compose_feed<R: Rng + ?Sized>(
    source: &dyn ContentSource,
    provider: &dyn PreferenceProvider,
    config: &FeedConfig,
    options: &FeedOptions,
    rng: &mut R,
) -> FeedResponse {
    match try_compose_feed(source, provider, config, options, rng) {
        Ok(feed) => feed.into(),
        Err(err) => {
            tracing::warn!(
                user = options.user_id.as_deref().unwrap_or("<anonymous>"),
                error = %err,
                "feed unavailable, returning empty recommendations"
            );
            FeedResponse::failed(&err)
        }
    }
}

/// Count selected items per category, most frequent first.
pub fn category_breakdown(items: &[ContentItem]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        let category = item.specialization();
        if !category.is_empty() {
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    let mut breakdown: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(c, n)| (c.to_string(), n))
        .collect();
    breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    breakdown
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
