//! Popularity score used by search and filter ranking.

use crate::content::ContentItem;

pub const VIEW_WEIGHT: f64 = 0.4;
pub const COMMENT_MULTIPLIER: f64 = 40.0;
pub const COMMENT_WEIGHT: f64 = 0.4;
pub const LIKE_MULTIPLIER: f64 = 10.0;
pub const LIKE_WEIGHT: f64 = 0.2;

/// `views × 0.4 + comments × 40 × 0.4 + likes × 10 × 0.2`.
///
/// Always `>= 0` and non-decreasing in each counter.
pub fn score(item: &ContentItem) -> f64 {
    item.views() * VIEW_WEIGHT
        + item.comment_count() * COMMENT_MULTIPLIER * COMMENT_WEIGHT
        + item.like_count() * LIKE_MULTIPLIER * LIKE_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_each_counter() {
        assert_eq!(score(&ContentItem::new("v").with_counts(100, 0, 0)), 40.0);
        assert_eq!(score(&ContentItem::new("c").with_counts(0, 1, 0)), 16.0);
        assert_eq!(score(&ContentItem::new("l").with_counts(0, 0, 1)), 2.0);
        assert_eq!(score(&ContentItem::new("all").with_counts(10, 2, 3)), 42.0);
    }

    #[test]
    fn missing_counters_score_zero() {
        assert_eq!(score(&ContentItem::default()), 0.0);
    }

    #[test]
    fn monotone_in_each_counter() {
        let base = (5u64, 5u64, 5u64);
        let s0 = score(&ContentItem::new("b").with_counts(base.0, base.1, base.2));
        for bumped in [(6, 5, 5), (5, 6, 5), (5, 5, 6)] {
            let s1 = score(&ContentItem::new("b").with_counts(bumped.0, bumped.1, bumped.2));
            assert!(s1 >= s0);
            assert!(s1 >= 0.0);
        }
    }

    #[test]
    fn sequence_counters_use_length() {
        let item: ContentItem =
            serde_json::from_str(r#"{"comments": [1, 2], "likes": [1, 2, 3, 4]}"#).unwrap();
        assert_eq!(score(&item), 2.0 * 16.0 + 4.0 * 2.0);
    }
}
