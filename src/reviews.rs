//! Written reviews, one per user and match.
//!
//! Reviews live twice: in the flat `reviews` slot every reader sees, and in
//! the author's `user_reviews` index keyed by match id, which is what
//! enforces the one-review-per-match rule.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::{MatchdayError, Result};
use crate::keys::SlotKey;
use crate::model::{Match, Review, User};
use crate::store::Store;

type ReviewIndex = BTreeMap<u32, Review>;

pub(crate) fn validate_stars(stars: u8) -> Result<()> {
    if !(1..=5).contains(&stars) {
        return Err(MatchdayError::InvalidRating(stars));
    }
    Ok(())
}

fn validate_comment(comment: &str) -> Result<()> {
    if comment.trim().is_empty() {
        return Err(MatchdayError::MissingField("comment"));
    }
    Ok(())
}

pub(crate) fn load_matches(store: &Store) -> Vec<Match> {
    store.read(SlotKey::Matches, crate::seed::matches())
}

/// Run `f` against one match and persist the catalog if it succeeds.
pub(crate) fn with_match<T, F>(store: &Store, match_id: u32, f: F) -> Result<T>
where
    F: FnOnce(&mut Match) -> Result<T>,
{
    let mut matches = load_matches(store);
    let target = matches
        .iter_mut()
        .find(|m| m.id == match_id)
        .ok_or(MatchdayError::MatchNotFound(match_id))?;
    let out = f(target)?;
    store.write(SlotKey::Matches, &matches);
    Ok(out)
}

fn load_index(store: &Store, user_id: &str) -> ReviewIndex {
    store.read(SlotKey::UserReviews.scoped(user_id), ReviewIndex::new())
}

fn save_index(store: &Store, user_id: &str, index: &ReviewIndex) {
    store.write(SlotKey::UserReviews.scoped(user_id), index);
}

fn load_reviews(store: &Store) -> Vec<Review> {
    store.read(SlotKey::Reviews, Vec::new())
}

#[instrument(skip(store, user, comment, now), fields(user_id = %user.id))]
pub(crate) fn submit_review(
    store: &Store,
    user: &User,
    match_id: u32,
    rating: u8,
    comment: &str,
    now: DateTime<Utc>,
) -> Result<Review> {
    validate_stars(rating)?;
    validate_comment(comment)?;

    let mut index = load_index(store, &user.id);
    if index.contains_key(&match_id) {
        return Err(MatchdayError::DuplicateReview { match_id });
    }

    let review = Review::new(match_id, &user.id, user.author_name(), comment, rating, now);
    with_match(store, match_id, |m| {
        m.engagement_mut().record_review(rating);
        Ok(())
    })?;

    index.insert(match_id, review.clone());
    save_index(store, &user.id, &index);
    store.update(SlotKey::Reviews, Vec::new(), |mut reviews: Vec<Review>| {
        reviews.push(review.clone());
        reviews
    });

    debug!(review_id = %review.id, "review submitted");
    Ok(review)
}

#[instrument(skip(store, user, comment), fields(user_id = %user.id))]
pub(crate) fn edit_review(
    store: &Store,
    user: &User,
    review_id: &str,
    rating: u8,
    comment: &str,
) -> Result<Review> {
    validate_stars(rating)?;
    validate_comment(comment)?;

    let mut reviews = load_reviews(store);
    let review = reviews
        .iter_mut()
        .find(|r| r.id == review_id && r.user_id == user.id)
        .ok_or_else(|| MatchdayError::ReviewNotFound(review_id.to_owned()))?;

    let previous = review.rating;
    // A match deleted since the review was written has no counters to fix.
    match with_match(store, review.match_id, |m| {
        m.engagement_mut().change_rating(previous, rating);
        Ok(())
    }) {
        Ok(()) | Err(MatchdayError::MatchNotFound(_)) => {}
        Err(err) => return Err(err),
    }

    review.rating = rating;
    review.comment = comment.trim().to_owned();
    let review = review.clone();
    store.write(SlotKey::Reviews, &reviews);

    let mut index = load_index(store, &user.id);
    index.insert(review.match_id, review.clone());
    save_index(store, &user.id, &index);

    Ok(review)
}

#[instrument(skip(store, user), fields(user_id = %user.id))]
pub(crate) fn delete_review(store: &Store, user: &User, review_id: &str) -> Result<Review> {
    let mut reviews = load_reviews(store);
    let position = reviews
        .iter()
        .position(|r| r.id == review_id && r.user_id == user.id)
        .ok_or_else(|| MatchdayError::ReviewNotFound(review_id.to_owned()))?;
    let review = reviews.remove(position);

    match with_match(store, review.match_id, |m| {
        m.engagement_mut().remove_review(review.rating);
        Ok(())
    }) {
        Ok(()) | Err(MatchdayError::MatchNotFound(_)) => {}
        Err(err) => return Err(err),
    }

    store.write(SlotKey::Reviews, &reviews);
    let mut index = load_index(store, &user.id);
    index.remove(&review.match_id);
    save_index(store, &user.id, &index);

    debug!(review_id, "review deleted");
    Ok(review)
}

/// Reaction to someone's review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reaction {
    Like,
    Dislike,
}

pub(crate) fn react(store: &Store, review_id: &str, reaction: Reaction) -> Result<Review> {
    let mut reviews = load_reviews(store);
    let review = reviews
        .iter_mut()
        .find(|r| r.id == review_id)
        .ok_or_else(|| MatchdayError::ReviewNotFound(review_id.to_owned()))?;
    match reaction {
        Reaction::Like => review.likes += 1,
        Reaction::Dislike => review.dislikes += 1,
    }
    let review = review.clone();
    store.write(SlotKey::Reviews, &reviews);

    // Keep the author's own copy in step.
    let mut index = load_index(store, &review.user_id);
    if let Some(entry) = index.get_mut(&review.match_id) {
        *entry = review.clone();
        save_index(store, &review.user_id, &index);
    }
    Ok(review)
}

/// Reviews of one match, newest first.
pub(crate) fn reviews_for_match(store: &Store, match_id: u32) -> Vec<Review> {
    load_reviews(store)
        .into_iter()
        .filter(|r| r.match_id == match_id)
        .sorted_by(|a, b| b.created_at.cmp(&a.created_at))
        .collect()
}

/// The user's reviews by match id.
pub(crate) fn user_reviews(store: &Store, user: &User) -> BTreeMap<u32, Review> {
    load_index(store, &user.id)
}
