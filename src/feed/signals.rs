//! Per-item signals for the home feed.
//!
//! Each signal is a pure function of the item, the viewer's profile and the
//! item's age. [`final_score`] blends them with one of two weight regimes
//! depending on whether the item is still in its first week.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::content::ContentItem;
use crate::error::{FeedSmithError, Result};
use crate::profile::UserPreferenceProfile;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `(max age in hours, points)`, checked in order. Anything older scores 0.
pub const FRESHNESS_STEPS: [(f64, f64); 5] = [
    (1.0, 300.0),
    (6.0, 280.0),
    (24.0, 250.0),
    (72.0, 200.0),
    (168.0, 150.0),
];

pub const VIEW_POINTS: f64 = 1.0;
pub const LIKE_POINTS: f64 = 10.0;
pub const COMMENT_POINTS: f64 = 15.0;
pub const WATCH_TIME_POINTS: f64 = 0.1;
pub const ENGAGEMENT_RATE_POINTS: f64 = 500.0;

pub const CHANNEL_MATCH: f64 = 500.0;
pub const CHANNEL_RANK_DECAY: f64 = 50.0;
pub const CATEGORY_MATCH: f64 = 300.0;
pub const CATEGORY_RANK_DECAY: f64 = 30.0;
pub const SEARCH_TITLE_MATCH: f64 = 200.0;
pub const SEARCH_DESCRIPTION_MATCH: f64 = 100.0;
pub const SEARCH_RECENCY_DECAY: f64 = 0.1;
pub const CATEGORY_VARIETY_MAX: f64 = 150.0;
pub const CATEGORY_OVERREPRESENTED_SHARE: f64 = 0.5;

pub const BROAD_CATEGORY_BOOST: f64 = 200.0;
pub const KEYWORD_TITLE_BOOST: f64 = 50.0;
pub const KEYWORD_DESCRIPTION_BOOST: f64 = 25.0;
pub const POPULAR_VIEWS: f64 = 1000.0;
pub const POPULAR_LIKES: f64 = 50.0;
pub const POPULAR_BOOST: f64 = 100.0;
pub const DISCUSSED_COMMENTS: f64 = 20.0;
pub const DISCUSSED_BOOST: f64 = 50.0;

pub const VARIETY_UNSEEN: f64 = 150.0;
pub const VARIETY_SEEN_ONCE: f64 = 75.0;

pub const TRENDING_MAX_AGE_HOURS: f64 = 720.0;
/// `(velocity strictly above, points)`, checked in order.
pub const TRENDING_STEPS: [(f64, f64); 3] = [(50.0, 300.0), (20.0, 200.0), (10.0, 100.0)];

pub const NEW_RELEASE_MAX_AGE_HOURS: f64 = 168.0;
pub const DISCOVERY_JITTER_SCALE: f64 = 100.0;

/// Blend weights for one age regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeWeights {
    pub freshness: f64,
    pub engagement: f64,
    pub personalization: f64,
    pub general_appeal: f64,
    pub variety: f64,
    pub trending: f64,
}

/// Items older than a week: engagement and personalization lead.
pub const ESTABLISHED: RegimeWeights = RegimeWeights {
    freshness: 0.05,
    engagement: 0.5,
    personalization: 0.3,
    general_appeal: 0.1,
    variety: 0.05,
    trending: 0.1,
};

/// Items in their first week: freshness leads, plus discovery jitter.
pub const NEW_RELEASE: RegimeWeights = RegimeWeights {
    freshness: 0.4,
    engagement: 0.25,
    personalization: 0.15,
    general_appeal: 0.1,
    variety: 0.05,
    trending: 0.05,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Every signal computed for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    /// `None` when the item has no creation time.
    pub age_hours: Option<f64>,
    pub freshness: f64,
    pub engagement: f64,
    pub personalization: f64,
    pub general_appeal: f64,
    pub variety: f64,
    pub trending: f64,
}

impl Signals {
    pub fn is_new_release(&self) -> bool {
        self.age_hours
            .is_some_and(|age| age <= NEW_RELEASE_MAX_AGE_HOURS)
    }
}

/// Broad-interest categories and beginner keywords, compiled once per composer.
#[derive(Debug, Clone)]
pub struct AppealRules {
    categories: HashSet<String>,
    keywords: Option<Regex>,
}

impl AppealRules {
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let categories = config
            .broad_categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();

        let alternatives: Vec<String> = config
            .appeal_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        let keywords = if alternatives.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
            Some(Regex::new(&pattern).map_err(|e| {
                FeedSmithError::config_with_source("invalid feed.appeal_keywords", e)
            })?)
        };

        Ok(Self {
            categories,
            keywords,
        })
    }

    pub fn is_broad_category(&self, category: &str) -> bool {
        self.categories.contains(&category.trim().to_lowercase())
    }

    pub fn has_keyword(&self, text: &str) -> bool {
        self.keywords.as_ref().is_some_and(|re| re.is_match(text))
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Hours between `created_at` and `now`, clamped at zero.
pub fn age_hours(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<f64> {
    created_at.map(|t| ((now - t).num_milliseconds() as f64 / 3_600_000.0).max(0.0))
}

pub fn freshness(age_hours: Option<f64>) -> f64 {
    let Some(age) = age_hours else {
        return 0.0;
    };
    FRESHNESS_STEPS
        .iter()
        .find(|(max_age, _)| age <= *max_age)
        .map_or(0.0, |(_, points)| *points)
}

pub fn engagement(item: &ContentItem) -> f64 {
    let likes = item.like_count();
    let comments = item.comment_count();
    let mut points = item.views() * VIEW_POINTS
        + likes * LIKE_POINTS
        + comments * COMMENT_POINTS
        + item.watch_time() * WATCH_TIME_POINTS;

    let impressions = item.impressions();
    if impressions > 0.0 {
        points += (likes + comments) / impressions * ENGAGEMENT_RATE_POINTS;
    }
    points
}

pub fn personalization(item: &ContentItem, profile: &UserPreferenceProfile) -> f64 {
    if !profile.has_data {
        return 0.0;
    }
    let mut points = 0.0;

    let channel = item.channel_key();
    if let Some(rank) = profile.top_channels.iter().position(|c| c == channel) {
        points += (CHANNEL_MATCH - CHANNEL_RANK_DECAY * rank as f64).max(0.0);
    }

    let category = item.specialization();
    if !category.is_empty() {
        if let Some(rank) = profile.top_categories.iter().position(|c| c == category) {
            points += (CATEGORY_MATCH - CATEGORY_RANK_DECAY * rank as f64).max(0.0);
        }
    }

    let title = item.title().to_lowercase();
    let description = item.description().to_lowercase();
    for (index, term) in profile.recent_search_terms.iter().enumerate() {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            continue;
        }
        let decay = (1.0 - SEARCH_RECENCY_DECAY * index as f64).max(0.0);
        if title.contains(&term) {
            points += SEARCH_TITLE_MATCH * decay;
        } else if description.contains(&term) {
            points += SEARCH_DESCRIPTION_MATCH * decay;
        }
    }

    if !category.is_empty() {
        let share = profile.category_share(category);
        if share > 0.0 && share < CATEGORY_OVERREPRESENTED_SHARE {
            points += CATEGORY_VARIETY_MAX * (1.0 - share / CATEGORY_OVERREPRESENTED_SHARE);
        }
    }

    points
}

pub fn general_appeal(item: &ContentItem, rules: &AppealRules) -> f64 {
    let mut points = 0.0;
    if rules.is_broad_category(item.specialization()) {
        points += BROAD_CATEGORY_BOOST;
    }
    if rules.has_keyword(item.title()) {
        points += KEYWORD_TITLE_BOOST;
    }
    if rules.has_keyword(item.description()) {
        points += KEYWORD_DESCRIPTION_BOOST;
    }
    if item.views() > POPULAR_VIEWS && item.like_count() > POPULAR_LIKES {
        points += POPULAR_BOOST;
    }
    if item.comment_count() > DISCUSSED_COMMENTS {
        points += DISCUSSED_BOOST;
    }
    points
}

/// Bonus by how often the creator already appeared in the recent window.
pub fn creator_variety(times_seen: usize) -> f64 {
    match times_seen {
        0 => VARIETY_UNSEEN,
        1 => VARIETY_SEEN_ONCE,
        _ => 0.0,
    }
}

pub fn trending(item: &ContentItem, age_hours: Option<f64>) -> f64 {
    let Some(age) = age_hours.filter(|a| *a <= TRENDING_MAX_AGE_HOURS) else {
        return 0.0;
    };
    let velocity = (item.views() + item.like_count() * 5.0 + item.comment_count() * 10.0)
        / age.max(1.0);
    TRENDING_STEPS
        .iter()
        .find(|(above, _)| velocity > *above)
        .map_or(0.0, |(_, points)| *points)
}

/// Blend signals into the feed score.
///
/// `jitter` is a uniform draw in `[0, 1)`. It only applies to new
/// releases and is scaled by the viewer's discovery weight.
pub fn final_score(signals: &Signals, discovery: f64, jitter: f64) -> f64 {
    if signals.is_new_release() {
        blend(signals, &NEW_RELEASE) + jitter * DISCOVERY_JITTER_SCALE * discovery
    } else {
        blend(signals, &ESTABLISHED)
    }
}

fn blend(s: &Signals, w: &RegimeWeights) -> f64 {
    s.freshness * w.freshness
        + s.engagement * w.engagement
        + s.personalization * w.personalization
        + s.general_appeal * w.general_appeal
        + s.variety * w.variety
        + s.trending * w.trending
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
