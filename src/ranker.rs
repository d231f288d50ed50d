//! Search and filter ranking.
//!
//! Two blending policies live here and are kept apart on purpose:
//!
//! - **Search** ([`rank_search`]): any textual match outranks every
//!   non-match; engagement only orders items inside each group. The
//!   transient scores are dropped before returning.
//! - **Filter** ([`rank_filter`]): a flat 70/30 relevance/engagement mix
//!   with no match gate. The scores stay on the returned records because
//!   downstream consumers read them.

use std::cmp::Ordering;

use serde::Serialize;

use crate::content::ContentItem;
use crate::engagement;
use crate::relevance::{self, MatchType};

pub const SEARCH_ENGAGEMENT_BOOST: f64 = 0.1;
pub const SEARCH_UNMATCHED_ENGAGEMENT: f64 = 0.01;
pub const FILTER_RELEVANCE_WEIGHT: f64 = 0.7;
pub const FILTER_ENGAGEMENT_WEIGHT: f64 = 0.3;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// An item annotated with its scores for a single ranking call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ContentItem,
    pub relevance_score: f64,
    pub engagement_score: f64,
    pub match_type: MatchType,
    pub combined_score: f64,
}

impl ScoredItem {
    pub fn is_relevant(&self) -> bool {
        self.relevance_score > 0.0
    }
}

/// A filter result. Field names match what existing consumers read.
#[derive(Debug, Clone, Serialize)]
pub struct FilteredItem {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(rename = "_filterScore")]
    pub filter_score: f64,
    #[serde(rename = "_relevanceScore")]
    pub relevance_score: f64,
    #[serde(rename = "_engagementScore")]
    pub engagement_score: f64,
    #[serde(rename = "_matchType")]
    pub match_type: MatchType,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score every item against `query` using the search blend, in input order.
pub fn score_items(items: &[ContentItem], query: &str) -> Vec<ScoredItem> {
    items
        .iter()
        .map(|item| {
            let relevance = relevance::score(item, query);
            let engagement = engagement::score(item);
            ScoredItem {
                item: item.clone(),
                relevance_score: relevance.score,
                engagement_score: engagement,
                match_type: relevance.match_type,
                combined_score: search_blend(relevance.score, engagement),
            }
        })
        .collect()
}

/// Search blend: relevance plus a small engagement nudge, or a much smaller
/// engagement-only score for items that did not match.
pub fn search_blend(relevance: f64, engagement: f64) -> f64 {
    if relevance > 0.0 {
        relevance + engagement * SEARCH_ENGAGEMENT_BOOST
    } else {
        engagement * SEARCH_UNMATCHED_ENGAGEMENT
    }
}

/// Filter blend: fixed 70/30 mix, no match gate.
pub fn filter_blend(relevance: f64, engagement: f64) -> f64 {
    relevance * FILTER_RELEVANCE_WEIGHT + engagement * FILTER_ENGAGEMENT_WEIGHT
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank items for a free-text search.
///
/// A blank query sorts purely by engagement. Otherwise matched items come
/// first ordered by combined score, then unmatched items ordered by raw
/// engagement. Ties keep input order.
pub fn rank_search(items: &[ContentItem], query: &str) -> Vec<ContentItem> {
    if query.trim().is_empty() {
        let mut scored: Vec<(f64, &ContentItem)> =
            items.iter().map(|i| (engagement::score(i), i)).collect();
        scored.sort_by(|a, b| descending(a.0, b.0));
        return scored.into_iter().map(|(_, i)| i.clone()).collect();
    }

    let mut scored = score_items(items, query);
    scored.sort_by(compare_search);
    tracing::debug!(
        query,
        total = scored.len(),
        matched = scored.iter().filter(|s| s.is_relevant()).count(),
        "ranked search results"
    );
    scored.into_iter().map(|s| s.item).collect()
}

/// Rank items for a category/label filter, keeping the score annotations.
pub fn rank_filter(items: &[ContentItem], label: &str) -> Vec<FilteredItem> {
    let mut filtered: Vec<FilteredItem> = items
        .iter()
        .map(|item| {
            let relevance = relevance::score(item, label);
            let engagement = engagement::score(item);
            FilteredItem {
                item: item.clone(),
                filter_score: filter_blend(relevance.score, engagement),
                relevance_score: relevance.score,
                engagement_score: engagement,
                match_type: relevance.match_type,
            }
        })
        .collect();
    filtered.sort_by(|a, b| descending(a.filter_score, b.filter_score));
    tracing::debug!(label, total = filtered.len(), "ranked filter results");
    filtered
}

fn compare_search(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    match (a.is_relevant(), b.is_relevant()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => descending(a.combined_score, b.combined_score),
        (false, false) => descending(a.engagement_score, b.engagement_score),
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[ContentItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn empty_query_sorts_by_engagement() {
        let items = vec![
            ContentItem::new("a").with_counts(100, 0, 0),
            ContentItem::new("b").with_counts(50, 0, 0),
            ContentItem::new("c").with_counts(200, 0, 0),
        ];
        let ranked = rank_search(&items, "");
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
    }

    #[test]
    fn python_scenario_orders_by_tier_and_case() {
        let items = vec![
            ContentItem::new("desc").with_description("Learn python here"),
            ContentItem::new("lower").with_title("python tutorial"),
            ContentItem::new("exact").with_title("Python Basics"),
        ];
        let ranked = rank_search(&items, "Python");
        assert_eq!(ids(&ranked), vec!["exact", "lower", "desc"]);
    }

    #[test]
    fn any_match_beats_any_engagement() {
        let items = vec![
            ContentItem::new("popular").with_counts(1_000_000, 1_000, 1_000),
            ContentItem::new("weak")
                .with_channel("obscure rustacean")
                .with_counts(0, 0, 0),
        ];
        let ranked = rank_search(&items, "rustacean");
        assert_eq!(ids(&ranked), vec!["weak", "popular"]);
    }

    #[test]
    fn title_match_outranks_description_match() {
        let items = vec![
            ContentItem::new("b")
                .with_description("all about borrowck")
                .with_counts(10_000, 500, 500),
            ContentItem::new("a").with_title("borrowck explained"),
        ];
        let ranked = rank_search(&items, "borrowck");
        assert_eq!(ids(&ranked), vec!["a", "b"]);
    }

    #[test]
    fn unmatched_group_orders_by_engagement() {
        let items = vec![
            ContentItem::new("low").with_counts(1, 0, 0),
            ContentItem::new("hit").with_title("needle"),
            ContentItem::new("high").with_counts(10, 0, 0),
        ];
        let ranked = rank_search(&items, "needle");
        assert_eq!(ids(&ranked), vec!["hit", "high", "low"]);
    }

    #[test]
    fn engagement_breaks_ties_between_matches() {
        let items = vec![
            ContentItem::new("quiet").with_title("Rust"),
            ContentItem::new("loud").with_title("Rust").with_counts(100, 0, 0),
        ];
        let ranked = rank_search(&items, "Rust");
        assert_eq!(ids(&ranked), vec!["loud", "quiet"]);
    }

    #[test]
    fn filter_uses_flat_mix_and_keeps_scores() {
        let items = vec![
            ContentItem::new("match").with_specialization("Gaming"),
            ContentItem::new("viral").with_counts(10_000, 0, 0),
        ];
        let ranked = rank_filter(&items, "Gaming");
        // 4000 × 0.3 = 1200 beats 200 × 0.7 = 140: no match gate on filters.
        assert_eq!(ranked[0].item.id, "viral");
        assert_eq!(ranked[0].relevance_score, 0.0);
        assert_eq!(ranked[1].relevance_score, 200.0);
        assert!((ranked[1].filter_score - 140.0).abs() < 1e-9);

        let json = serde_json::to_value(&ranked[1]).unwrap();
        assert_eq!(json["id"], "match");
        assert_eq!(json["_matchType"], "specialization-case-sensitive");
        assert!(json.get("_filterScore").is_some());
        assert!(json.get("_engagementScore").is_some());
    }

    #[test]
    fn score_items_keeps_input_order() {
        let items = vec![
            ContentItem::new("x").with_title("zzz"),
            ContentItem::new("y").with_title("Query"),
        ];
        let scored = score_items(&items, "Query");
        assert_eq!(scored[0].item.id, "x");
        assert!(!scored[0].is_relevant());
        assert!(scored[1].is_relevant());
    }

    #[test]
    fn empty_input() {
        assert!(rank_search(&[], "x").is_empty());
        assert!(rank_filter(&[], "x").is_empty());
    }
}
