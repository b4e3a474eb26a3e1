//! Trending and top-rated selection for discovery surfaces.
//!
//! Both selectors are pure: they never touch storage, never reorder the
//! input, and given the same `now` and the same matches always return the
//! same sequence. Ties keep input order.

use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::model::{Engagement, Match};

/// How many matches the sidebar shows by default.
pub const DEFAULT_LIMIT: usize = 3;

const RECENCY_MAX: f64 = 100.0;
const RECENCY_DECAY_PER_DAY: f64 = 0.1;
const RECENCY_WEIGHT: f64 = 0.7;
const ENGAGEMENT_WEIGHT: f64 = 0.3;

const VIEW_WEIGHT: f64 = 1.0;
const RATING_WEIGHT: f64 = 5.0;
const REVIEW_WEIGHT: f64 = 10.0;

const RATING_SCALE: f64 = 20.0;
const FULL_CONFIDENCE_SIGNALS: f64 = 10.0;
const CONTENT_BONUS_PER_REVIEW: f64 = 0.02;
const CONTENT_BONUS_MAX: f64 = 0.2;

/// Engagement counters in one canonical shape, absent values as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngagementCounters {
    pub rating_average: f64,
    pub ratings: u32,
    pub reviews: u32,
    pub views: u32,
}

impl EngagementCounters {
    pub fn of(m: &Match) -> Self {
        m.engagement.as_ref().map(Self::from).unwrap_or_default()
    }

    /// Ratings plus reviews.
    pub fn signals(&self) -> u32 {
        self.ratings.saturating_add(self.reviews)
    }
}

impl From<&Engagement> for EngagementCounters {
    fn from(engagement: &Engagement) -> Self {
        Self {
            rating_average: engagement
                .rating_average
                .filter(|avg| avg.is_finite())
                .unwrap_or_default()
                .clamp(0.0, 5.0),
            ratings: engagement.ratings.unwrap_or_default(),
            reviews: engagement
                .reviews
                .or(engagement.review_count)
                .unwrap_or_default(),
            views: engagement
                .views
                .or(engagement.watch_count)
                .unwrap_or_default(),
        }
    }
}

/// Whole days between kickoff and `now`, never negative. `None` when the
/// match date cannot be parsed.
pub fn days_since(m: &Match, now: DateTime<Utc>) -> Option<i64> {
    m.kickoff()
        .map(|kickoff| (now - kickoff).num_days().max(0))
}

/// 100 on match day, decaying exponentially. Undated matches get 0.
pub fn recency_score(m: &Match, now: DateTime<Utc>) -> f64 {
    days_since(m, now)
        .map(|days| RECENCY_MAX * (-RECENCY_DECAY_PER_DAY * days as f64).exp())
        .unwrap_or(0.0)
}

pub fn engagement_score(counters: &EngagementCounters) -> f64 {
    f64::from(counters.views) * VIEW_WEIGHT
        + f64::from(counters.ratings) * RATING_WEIGHT
        + f64::from(counters.reviews) * REVIEW_WEIGHT
}

/// Recency-dominant blend of freshness and activity.
pub fn trending_score(m: &Match, now: DateTime<Utc>) -> f64 {
    let counters = EngagementCounters::of(m);
    recency_score(m, now) * RECENCY_WEIGHT + engagement_score(&counters) * ENGAGEMENT_WEIGHT
}

/// Average rating on a 0..100 scale, damped until ten signals have come in,
/// plus a small bonus for written reviews.
pub fn quality_score(m: &Match) -> f64 {
    let counters = EngagementCounters::of(m);
    let rating_score = counters.rating_average * RATING_SCALE;
    let volume_factor = (f64::from(counters.signals()) / FULL_CONFIDENCE_SIGNALS).min(1.0);
    let content_factor =
        (f64::from(counters.reviews) * CONTENT_BONUS_PER_REVIEW).min(CONTENT_BONUS_MAX);
    rating_score * volume_factor + content_factor * 100.0
}

/// The `limit` most trending matches, best first.
pub fn trending(matches: &[Match], now: DateTime<Utc>, limit: usize) -> Vec<&Match> {
    rank_by(matches, limit, |m| trending_score(m, now))
}

/// The `limit` best-rated matches, best first.
pub fn top_rated(matches: &[Match], limit: usize) -> Vec<&Match> {
    rank_by(matches, limit, quality_score)
}

fn rank_by<F>(matches: &[Match], limit: usize, score: F) -> Vec<&Match>
where
    F: Fn(&Match) -> f64,
{
    // sorted_by is a stable sort, so equal scores keep their input order.
    matches
        .iter()
        .map(|m| (score(m), m))
        .sorted_by(|(a, _), (b, _)| b.total_cmp(a))
        .take(limit)
        .map(|(_, m)| m)
        .collect()
}
