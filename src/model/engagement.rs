use serde::{Deserialize, Serialize};

use crate::ranking::EngagementCounters;

/// Per-match engagement block as it is persisted.
///
/// Older records use `reviewCount` / `watchCount` instead of `reviews` /
/// `views`; both spellings are accepted and [`EngagementCounters`] folds
/// them into one shape. Mutators always write the canonical fields back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch_count: Option<u32>,
}

impl Engagement {
    pub fn counters(&self) -> EngagementCounters {
        EngagementCounters::from(self)
    }

    /// Fold a new star rating into the running average.
    pub fn record_rating(&mut self, stars: u8) {
        let mut counters = self.counters();
        counters.rating_average = fold_in(&counters, stars);
        counters.ratings = counters.ratings.saturating_add(1);
        self.store(counters);
    }

    /// Replace a previously counted rating without changing the totals.
    pub fn change_rating(&mut self, old: u8, new: u8) {
        let mut counters = self.counters();
        let signals = counters.signals();
        counters.rating_average = if signals == 0 {
            f64::from(new)
        } else {
            counters.rating_average + (f64::from(new) - f64::from(old)) / f64::from(signals)
        };
        self.store(counters);
    }

    pub fn record_review(&mut self, stars: u8) {
        let mut counters = self.counters();
        counters.rating_average = fold_in(&counters, stars);
        counters.reviews = counters.reviews.saturating_add(1);
        self.store(counters);
    }

    pub fn remove_review(&mut self, stars: u8) {
        let mut counters = self.counters();
        let signals = counters.signals();
        counters.rating_average = if signals <= 1 {
            0.0
        } else {
            (counters.rating_average * f64::from(signals) - f64::from(stars))
                / f64::from(signals - 1)
        };
        counters.reviews = counters.reviews.saturating_sub(1);
        self.store(counters);
    }

    pub fn record_view(&mut self) {
        let mut counters = self.counters();
        counters.views = counters.views.saturating_add(1);
        self.store(counters);
    }

    fn store(&mut self, counters: EngagementCounters) {
        *self = Self {
            rating_average: Some(counters.rating_average.clamp(0.0, 5.0)),
            ratings: Some(counters.ratings),
            reviews: Some(counters.reviews),
            review_count: None,
            views: Some(counters.views),
            watch_count: None,
        };
    }
}

fn fold_in(counters: &EngagementCounters, stars: u8) -> f64 {
    let signals = f64::from(counters.signals());
    (counters.rating_average * signals + f64::from(stars)) / (signals + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_record_rating_updates_average() {
        let mut engagement = Engagement::default();
        engagement.record_rating(4);
        engagement.record_rating(2);

        let counters = engagement.counters();
        assert_eq!(counters.ratings, 2);
        assert!(approx(counters.rating_average, 3.0));
    }

    #[test]
    fn test_change_rating_keeps_count() {
        let mut engagement = Engagement::default();
        engagement.record_rating(2);
        engagement.record_rating(4);
        engagement.change_rating(2, 5);

        let counters = engagement.counters();
        assert_eq!(counters.ratings, 2);
        assert!(approx(counters.rating_average, 4.5));
    }

    #[test]
    fn test_review_add_and_remove() {
        let mut engagement = Engagement {
            rating_average: Some(4.0),
            ratings: Some(1),
            ..Default::default()
        };
        engagement.record_review(2);
        assert!(approx(engagement.counters().rating_average, 3.0));
        assert_eq!(engagement.counters().reviews, 1);

        engagement.remove_review(2);
        assert!(approx(engagement.counters().rating_average, 4.0));
        assert_eq!(engagement.counters().reviews, 0);
    }

    #[test]
    fn test_counters_saturate() {
        let mut engagement = Engagement {
            rating_average: Some(4.0),
            ratings: Some(u32::MAX),
            reviews: Some(u32::MAX),
            views: Some(u32::MAX),
            ..Default::default()
        };
        engagement.record_rating(4);
        engagement.record_review(4);
        engagement.record_view();

        let counters = engagement.counters();
        assert_eq!(counters.ratings, u32::MAX);
        assert_eq!(counters.reviews, u32::MAX);
        assert_eq!(counters.views, u32::MAX);
        assert!(approx(counters.rating_average, 4.0));
    }

    #[test]
    fn test_mutators_write_canonical_fields() {
        let mut engagement = Engagement {
            review_count: Some(3),
            watch_count: Some(10),
            ..Default::default()
        };
        engagement.record_view();

        assert_eq!(engagement.reviews, Some(3));
        assert_eq!(engagement.views, Some(11));
        assert_eq!(engagement.review_count, None);
        assert_eq!(engagement.watch_count, None);
    }
}
