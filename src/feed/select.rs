//! Quota-based selection of the final feed.
//!
//! Instead of one global sort, the feed is filled from four buckets sized
//! by the viewer's personalization balance. Shortfalls are backfilled from
//! the globally best-scored leftovers, and the result is shuffled so the
//! feed does not read as a strict ranking.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::content::ContentItem;
use crate::profile::PersonalizationBalance;

use super::signals::Signals;

pub const HISTORY_MIN_PERSONALIZATION: f64 = 100.0;
pub const SEARCH_MIN_PERSONALIZATION: f64 = 50.0;
pub const GENERAL_MIN_APPEAL: f64 = 100.0;
pub const DISCOVERY_MIN_FRESHNESS: f64 = 400.0;

/// Absorbs float error so a 0.3 share of 10 floors to 3, not 2.
const SHARE_EPSILON: f64 = 1e-9;

/// A scored item awaiting selection.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub item: &'a ContentItem,
    pub signals: Signals,
    pub score: f64,
}

/// Selection buckets, filled in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    History,
    Searches,
    General,
    Discovery,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::History,
        Bucket::Searches,
        Bucket::General,
        Bucket::Discovery,
    ];

    pub fn qualifies(self, s: &Signals) -> bool {
        match self {
            Bucket::History => s.personalization > HISTORY_MIN_PERSONALIZATION,
            Bucket::Searches => {
                s.personalization > SEARCH_MIN_PERSONALIZATION
                    && s.personalization <= HISTORY_MIN_PERSONALIZATION
            }
            Bucket::General => s.general_appeal > GENERAL_MIN_APPEAL,
            Bucket::Discovery => s.freshness > DISCOVERY_MIN_FRESHNESS,
        }
    }

    fn weight(self, balance: &PersonalizationBalance) -> f64 {
        match self {
            Bucket::History => balance.history,
            Bucket::Searches => balance.searches,
            Bucket::General => balance.general,
            Bucket::Discovery => balance.discovery,
        }
    }
}

/// `floor(limit × weight)` per bucket, with weights normalised to sum to 1.
pub fn bucket_targets(limit: usize, balance: &PersonalizationBalance) -> [usize; 4] {
    let total: f64 = balance.weights().iter().sum();
    let mut targets = [0usize; 4];
    if total <= 0.0 || !total.is_finite() {
        return targets;
    }
    for (slot, bucket) in targets.iter_mut().zip(Bucket::ALL) {
        let share = bucket.weight(balance).max(0.0) / total;
        *slot = (limit as f64 * share + SHARE_EPSILON).floor() as usize;
    }
    targets
}

/// Pick up to `limit` distinct candidates and shuffle them.
///
/// Returns indices into `candidates`. Items sharing a non-empty id are
/// treated as the same item and selected at most once.
pub fn select<R: Rng + ?Sized>(
    candidates: &[Candidate<'_>],
    limit: usize,
    balance: &PersonalizationBalance,
    rng: &mut R,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .score
            .partial_cmp(&candidates[a].score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut picker = Picker::new(candidates, limit);
    for (bucket, target) in Bucket::ALL.into_iter().zip(bucket_targets(limit, balance)) {
        let mut taken = 0;
        for &idx in &order {
            if taken == target || picker.is_full() {
                break;
            }
            if bucket.qualifies(&candidates[idx].signals) && picker.take(idx) {
                taken += 1;
            }
        }
        tracing::trace!(?bucket, target, taken, "filled bucket");
    }

    for &idx in &order {
        if picker.is_full() {
            break;
        }
        picker.take(idx);
    }

    let mut selected = picker.selected;
    selected.shuffle(rng);
    selected
}

struct Picker<'c, 'a> {
    candidates: &'c [Candidate<'a>],
    limit: usize,
    taken: HashSet<usize>,
    ids: HashSet<&'a str>,
    selected: Vec<usize>,
}

impl<'c, 'a> Picker<'c, 'a> {
    fn new(candidates: &'c [Candidate<'a>], limit: usize) -> Self {
        Self {
            candidates,
            limit,
            taken: HashSet::new(),
            ids: HashSet::new(),
            selected: Vec::with_capacity(limit.min(candidates.len())),
        }
    }

    fn is_full(&self) -> bool {
        self.selected.len() >= self.limit
    }

    fn take(&mut self, idx: usize) -> bool {
        if self.is_full() || self.taken.contains(&idx) {
            return false;
        }
        let item: &'a ContentItem = self.candidates[idx].item;
        let id = item.id.as_str();
        if !id.is_empty() && !self.ids.insert(id) {
            return false;
        }
        self.taken.insert(idx);
        self.selected.push(idx);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn candidate(item: &ContentItem, score: f64, signals: Signals) -> Candidate<'_> {
        Candidate {
            item,
            signals,
            score,
        }
    }

    #[test]
    fn targets_floor_each_share() {
        let targets = bucket_targets(10, &PersonalizationBalance::default());
        assert_eq!(targets, [3, 2, 3, 2]);
        let targets = bucket_targets(3, &PersonalizationBalance::default());
        assert_eq!(targets, [0, 0, 0, 0]);
        let zero = PersonalizationBalance {
            history: 0.0,
            searches: 0.0,
            general: 0.0,
            discovery: 0.0,
        };
        assert_eq!(bucket_targets(10, &zero), [0, 0, 0, 0]);
    }

    #[test]
    fn bucket_thresholds() {
        let s = |p: f64, g: f64, f: f64| Signals {
            personalization: p,
            general_appeal: g,
            freshness: f,
            ..Signals::default()
        };
        assert!(Bucket::History.qualifies(&s(101.0, 0.0, 0.0)));
        assert!(!Bucket::History.qualifies(&s(100.0, 0.0, 0.0)));
        assert!(Bucket::Searches.qualifies(&s(100.0, 0.0, 0.0)));
        assert!(!Bucket::Searches.qualifies(&s(50.0, 0.0, 0.0)));
        assert!(Bucket::General.qualifies(&s(0.0, 101.0, 0.0)));
        assert!(!Bucket::Discovery.qualifies(&s(0.0, 0.0, 300.0)));
    }

    #[test]
    fn quota_pulls_in_low_scored_personal_item() {
        let items: Vec<ContentItem> = (0..5).map(|i| ContentItem::new(format!("i{i}"))).collect();
        let mut candidates: Vec<Candidate> = items[..4]
            .iter()
            .map(|item| candidate(item, 100.0, Signals::default()))
            .collect();
        candidates.push(candidate(
            &items[4],
            1.0,
            Signals {
                personalization: 150.0,
                ..Signals::default()
            },
        ));
        let balance = PersonalizationBalance {
            history: 0.5,
            searches: 0.0,
            general: 0.0,
            discovery: 0.5,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let picked = select(&candidates, 2, &balance, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&4));
    }

    #[test]
    fn returns_exactly_limit_without_duplicates() {
        let items: Vec<ContentItem> = (0..10)
            .map(|i| ContentItem::new(format!("id-{}", i % 7)))
            .collect();
        let candidates: Vec<Candidate> = items
            .iter()
            .enumerate()
            .map(|(i, item)| candidate(item, i as f64, Signals::default()))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select(&candidates, 5, &PersonalizationBalance::default(), &mut rng);
        assert_eq!(picked.len(), 5);
        let ids: HashSet<&str> = picked.iter().map(|&i| items[i].id.as_str()).collect();
        assert_eq!(ids.len(), 5);

        let picked = select(&candidates, 50, &PersonalizationBalance::default(), &mut rng);
        assert_eq!(picked.len(), 7);
    }

    #[test]
    fn selection_is_top_scored_when_no_bucket_qualifies() {
        let items: Vec<ContentItem> = (0..6).map(|i| ContentItem::new(format!("i{i}"))).collect();
        let candidates: Vec<Candidate> = items
            .iter()
            .enumerate()
            .map(|(i, item)| candidate(item, i as f64, Signals::default()))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut picked = select(&candidates, 3, &PersonalizationBalance::default(), &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec![3, 4, 5]);
    }

    #[test]
    fn empty_candidates_or_zero_limit() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(select(&[], 10, &PersonalizationBalance::default(), &mut rng).is_empty());
        let item = ContentItem::new("a");
        let candidates = vec![candidate(&item, 1.0, Signals::default())];
        assert!(select(&candidates, 0, &PersonalizationBalance::default(), &mut rng).is_empty());
    }
}
