//! Text relevance between a query (or filter label) and a content item.
//!
//! Matching walks a fixed priority cascade of fields. The first tier that
//! produces a non-zero score wins outright, so a weak title hit always
//! beats a strong description hit. Within every tier a case-sensitive match
//! scores above the case-insensitive match of the same literal, which lets
//! exact-cased queries (acronyms, product names) rank first.
//!
//! The point values live in the tables below. Their ranges overlap across
//! tiers on purpose; do not retune one tier without the others.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::content::ContentItem;

// ---------------------------------------------------------------------------
// Point tables
// ---------------------------------------------------------------------------

/// A point value for the case-sensitive and case-insensitive variant of a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Points {
    pub sensitive: f64,
    pub insensitive: f64,
}

impl Points {
    const fn new(sensitive: f64, insensitive: f64) -> Self {
        Self {
            sensitive,
            insensitive,
        }
    }

    pub fn pick(self, case_sensitive: bool) -> f64 {
        if case_sensitive {
            self.sensitive
        } else {
            self.insensitive
        }
    }
}

/// Points for a multi-word tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordTable {
    /// Scaled by matched words / query words.
    pub base: Points,
    /// Added when every query word matched.
    pub all_words_bonus: Points,
    /// Bonus for adjacent matches, shrinking with positional distance.
    pub proximity_max: f64,
}

pub const TITLE_PHRASE_BASE: Points = Points::new(2500.0, 1500.0);
pub const TITLE_EQUAL_BONUS: Points = Points::new(400.0, 200.0);
pub const TITLE_PREFIX_BONUS: Points = Points::new(200.0, 100.0);
pub const TITLE_CONTAINS_BONUS: Points = Points::new(100.0, 50.0);

pub const TITLE_WORDS: WordTable = WordTable {
    base: Points::new(1800.0, 1000.0),
    all_words_bonus: Points::new(600.0, 300.0),
    proximity_max: 100.0,
};

pub const DESCRIPTION_PHRASE_BASE: Points = Points::new(1000.0, 500.0);
pub const DESCRIPTION_FREQUENCY_CAP: f64 = 50.0;

pub const DESCRIPTION_WORDS: WordTable = WordTable {
    base: Points::new(650.0, 300.0),
    all_words_bonus: Points::new(200.0, 100.0),
    proximity_max: 50.0,
};

pub const HASHTAG_EXACT: Points = Points::new(400.0, 300.0);
pub const HASHTAG_PARTIAL: f64 = 150.0;
pub const HASHTAG_EXTRA_MATCH: f64 = 25.0;

pub const SPECIALIZATION_EQUAL: Points = Points::new(200.0, 150.0);
pub const SPECIALIZATION_PARTIAL: f64 = 50.0;

pub const CHANNEL_CONTAINS: Points = Points::new(130.0, 80.0);
pub const CHANNEL_EQUAL_INSENSITIVE: f64 = 100.0;

/// Average gap (in words) at which the proximity bonus reaches zero is
/// `1 + PROXIMITY_FALLOFF`.
const PROXIMITY_FALLOFF: f64 = 5.0;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The cascade tier that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    None,
    TitleExact,
    TitleWords,
    DescriptionExact,
    DescriptionWords,
    HashtagExact,
    HashtagPartial,
    Specialization,
    Channel,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::TitleExact => "title-exact",
            Tier::TitleWords => "title-words",
            Tier::DescriptionExact => "description-exact",
            Tier::DescriptionWords => "description-words",
            Tier::HashtagExact => "hashtag-exact",
            Tier::HashtagPartial => "hashtag-partial",
            Tier::Specialization => "specialization",
            Tier::Channel => "channel",
        }
    }
}

/// Which field matched and whether it matched with exact casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchType {
    pub tier: Tier,
    pub case_sensitive: bool,
}

impl MatchType {
    pub const NONE: MatchType = MatchType {
        tier: Tier::None,
        case_sensitive: false,
    };

    fn new(tier: Tier, case_sensitive: bool) -> Self {
        Self {
            tier,
            case_sensitive,
        }
    }

    pub fn is_none(&self) -> bool {
        self.tier == Tier::None
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tier.as_str())?;
        if self.case_sensitive {
            f.write_str("-case-sensitive")?;
        }
        Ok(())
    }
}

impl Serialize for MatchType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of scoring one item against one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relevance {
    pub score: f64,
    pub match_type: MatchType,
}

impl Relevance {
    pub const NONE: Relevance = Relevance {
        score: 0.0,
        match_type: MatchType::NONE,
    };

    fn hit(score: f64, tier: Tier, case_sensitive: bool) -> Self {
        Self {
            score,
            match_type: MatchType::new(tier, case_sensitive),
        }
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// Score `item` against `query`. Blank queries never match.
pub fn score(item: &ContentItem, query: &str) -> Relevance {
    let query = query.trim();
    if query.is_empty() {
        return Relevance::NONE;
    }
    let words: Vec<&str> = query.split_whitespace().collect();
    let multi_word = words.len() >= 2;

    if let Some((points, cs)) = title_phrase(item.title(), query) {
        return Relevance::hit(points, Tier::TitleExact, cs);
    }
    if multi_word {
        if let Some((points, cs)) = best_word_match(item.title(), &words, &TITLE_WORDS) {
            return Relevance::hit(points, Tier::TitleWords, cs);
        }
    }
    if let Some((points, cs)) = description_phrase(item.description(), query) {
        return Relevance::hit(points, Tier::DescriptionExact, cs);
    }
    if multi_word {
        if let Some((points, cs)) =
            best_word_match(item.description(), &words, &DESCRIPTION_WORDS)
        {
            return Relevance::hit(points, Tier::DescriptionWords, cs);
        }
    }
    if let Some(hit) = hashtag_match(item.hashtags(), query) {
        return hit;
    }
    if let Some((points, cs)) = specialization_match(item.specialization(), query) {
        return Relevance::hit(points, Tier::Specialization, cs);
    }
    if let Some((points, cs)) = channel_match(item.channel_name(), query) {
        return Relevance::hit(points, Tier::Channel, cs);
    }

    Relevance::NONE
}

fn title_phrase(title: &str, query: &str) -> Option<(f64, bool)> {
    let (haystack, needle, cs) = if title.contains(query) {
        (title.to_string(), query.to_string(), true)
    } else {
        let title_lower = title.to_lowercase();
        let query_lower = query.to_lowercase();
        if !title_lower.contains(&query_lower) {
            return None;
        }
        (title_lower, query_lower, false)
    };

    let bonus = if haystack == needle {
        TITLE_EQUAL_BONUS
    } else if haystack.starts_with(&needle) {
        TITLE_PREFIX_BONUS
    } else {
        TITLE_CONTAINS_BONUS
    };
    Some((TITLE_PHRASE_BASE.pick(cs) + bonus.pick(cs), cs))
}

fn description_phrase(description: &str, query: &str) -> Option<(f64, bool)> {
    let word_count = description.split_whitespace().count().max(1) as f64;

    let occurrences = description.matches(query).count();
    if occurrences > 0 {
        return Some((phrase_with_frequency(occurrences, word_count, true), true));
    }

    let occurrences = description
        .to_lowercase()
        .matches(&query.to_lowercase())
        .count();
    if occurrences > 0 {
        return Some((phrase_with_frequency(occurrences, word_count, false), false));
    }
    None
}

fn phrase_with_frequency(occurrences: usize, word_count: f64, cs: bool) -> f64 {
    let boost = (occurrences as f64 / word_count * 100.0).min(DESCRIPTION_FREQUENCY_CAP);
    DESCRIPTION_PHRASE_BASE.pick(cs) + boost
}

/// Run a word tier in both case modes and keep the better result.
fn best_word_match(field: &str, words: &[&str], table: &WordTable) -> Option<(f64, bool)> {
    let sensitive = word_match(field, words, table, true);
    let insensitive = word_match(field, words, table, false);
    if sensitive <= 0.0 && insensitive <= 0.0 {
        None
    } else if sensitive >= insensitive {
        Some((sensitive, true))
    } else {
        Some((insensitive, false))
    }
}

fn word_match(field: &str, words: &[&str], table: &WordTable, case_sensitive: bool) -> f64 {
    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let field_words: Vec<String> = field.split_whitespace().map(fold).collect();
    if field_words.is_empty() || words.is_empty() {
        return 0.0;
    }

    let positions: Vec<usize> = words
        .iter()
        .filter_map(|w| {
            let w = fold(w);
            field_words.iter().position(|fw| fw.contains(&w))
        })
        .collect();
    if positions.is_empty() {
        return 0.0;
    }

    let ratio = positions.len() as f64 / words.len() as f64;
    let mut points = table.base.pick(case_sensitive) * ratio;
    if positions.len() == words.len() {
        points += table.all_words_bonus.pick(case_sensitive);
    }
    points + proximity_bonus(positions, table.proximity_max)
}

/// Linear falloff on the average gap between consecutive matched words.
pub fn proximity_bonus(mut positions: Vec<usize>, max: f64) -> f64 {
    if positions.len() < 2 {
        return 0.0;
    }
    positions.sort_unstable();
    let gaps: f64 = positions.windows(2).map(|w| (w[1] - w[0]) as f64).sum();
    let avg_gap = gaps / (positions.len() - 1) as f64;
    (max * (1.0 - (avg_gap - 1.0) / PROXIMITY_FALLOFF)).clamp(0.0, max)
}

fn hashtag_match(tags: &[String], query: &str) -> Option<Relevance> {
    let query = query.trim_start_matches('#');
    if query.is_empty() {
        return None;
    }
    let query_lower = query.to_lowercase();

    let mut exact_cs = 0usize;
    let mut exact_ci = 0usize;
    let mut partial = 0usize;
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#');
        if tag.is_empty() {
            continue;
        }
        let tag_lower = tag.to_lowercase();
        if tag == query {
            exact_cs += 1;
        } else if tag_lower == query_lower {
            exact_ci += 1;
        } else if tag_lower.contains(&query_lower) || query_lower.contains(&tag_lower) {
            partial += 1;
        }
    }

    let total = exact_cs + exact_ci + partial;
    if total == 0 {
        return None;
    }
    let extra = (total - 1) as f64 * HASHTAG_EXTRA_MATCH;
    let hit = if exact_cs > 0 {
        Relevance::hit(HASHTAG_EXACT.sensitive + extra, Tier::HashtagExact, true)
    } else if exact_ci > 0 {
        Relevance::hit(HASHTAG_EXACT.insensitive + extra, Tier::HashtagExact, false)
    } else {
        Relevance::hit(HASHTAG_PARTIAL + extra, Tier::HashtagPartial, false)
    };
    Some(hit)
}

fn specialization_match(specialization: &str, query: &str) -> Option<(f64, bool)> {
    let specialization = specialization.trim();
    if specialization.is_empty() {
        return None;
    }
    if specialization == query {
        return Some((SPECIALIZATION_EQUAL.sensitive, true));
    }
    let spec_lower = specialization.to_lowercase();
    let query_lower = query.to_lowercase();
    if spec_lower == query_lower {
        Some((SPECIALIZATION_EQUAL.insensitive, false))
    } else if spec_lower.contains(&query_lower) || query_lower.contains(&spec_lower) {
        Some((SPECIALIZATION_PARTIAL, false))
    } else {
        None
    }
}

fn channel_match(channel: &str, query: &str) -> Option<(f64, bool)> {
    if channel.is_empty() {
        return None;
    }
    if channel.contains(query) {
        return Some((CHANNEL_CONTAINS.sensitive, true));
    }
    let channel_lower = channel.to_lowercase();
    let query_lower = query.to_lowercase();
    if channel_lower == query_lower {
        Some((CHANNEL_EQUAL_INSENSITIVE, false))
    } else if channel_lower.contains(&query_lower) {
        Some((CHANNEL_CONTAINS.insensitive, false))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
